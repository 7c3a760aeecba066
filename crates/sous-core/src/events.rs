//! Event Bus
//!
//! An explicit publish/subscribe service. Whoever owns a bus hands it to the
//! components that publish; consumers hold on to their [`Subscription`] and
//! give it back when they go away.

use serde::{Deserialize, Serialize};

/// Handle identifying one subscriber on a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl Subscription {
    /// Get the raw handle value
    pub fn id(&self) -> u64 {
        self.0
    }
}

type Listener<E> = Box<dyn FnMut(&E)>;

/// Single-threaded publish/subscribe channel for events of type `E`
pub struct EventBus<E> {
    listeners: Vec<(Subscription, Listener<E>)>,
    next_id: u64,
    published: u64,
}

impl<E> EventBus<E> {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
            published: 0,
        }
    }

    /// Register a listener; it receives every event published from now on
    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    /// Remove a listener. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener in subscription order
    pub fn publish(&mut self, event: &E) {
        self.published += 1;
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of events published so far
    pub fn published_count(&self) -> u64 {
        self.published
    }

    /// Drop every subscriber
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.listeners.len())
            .field("published", &self.published)
            .finish()
    }
}

/// Severity of a player-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
    Achievement,
}

/// Short-lived player notification (toast)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: Option<String>,
    /// How long the presentation layer should keep it visible, in seconds
    pub duration: f64,
}

impl Notice {
    /// Create a notice with the default display time for its level
    pub fn new(level: NoticeLevel, title: impl Into<String>) -> Self {
        let duration = match level {
            NoticeLevel::Achievement => 5.0,
            NoticeLevel::Error => 4.0,
            _ => 3.0,
        };
        Self {
            level,
            title: title.into(),
            message: None,
            duration,
        }
    }

    /// Attach a body line
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
