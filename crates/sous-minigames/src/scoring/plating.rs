//! Plating score
//!
//! A static composition score evaluated once, when the plate is submitted or
//! time runs out. Positions are in plate space with the plate centre at the
//! origin.

use serde::{Deserialize, Serialize};
use sous_core::DVec2;

use super::{ScoreBreakdown, ScoreComponent};

/// Main food item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Food {
    Steak,
    Chicken,
    Fish,
    Vegetable,
    Potato,
    Rice,
}

/// Garnish item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Garnish {
    Basil,
    Parsley,
    Lemon,
    Microgreens,
    Flower,
}

/// Anything that can be placed on the plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlateItem {
    Food(Food),
    Garnish(Garnish),
}

/// Composition role of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlateRole {
    Protein,
    Side,
    Garnish,
}

impl PlateItem {
    /// Every item in palette order
    pub const PALETTE: [PlateItem; 11] = [
        PlateItem::Food(Food::Steak),
        PlateItem::Food(Food::Chicken),
        PlateItem::Food(Food::Fish),
        PlateItem::Food(Food::Vegetable),
        PlateItem::Food(Food::Potato),
        PlateItem::Food(Food::Rice),
        PlateItem::Garnish(Garnish::Basil),
        PlateItem::Garnish(Garnish::Parsley),
        PlateItem::Garnish(Garnish::Lemon),
        PlateItem::Garnish(Garnish::Microgreens),
        PlateItem::Garnish(Garnish::Flower),
    ];

    pub fn role(&self) -> PlateRole {
        match self {
            PlateItem::Food(Food::Steak | Food::Chicken | Food::Fish) => PlateRole::Protein,
            PlateItem::Food(_) => PlateRole::Side,
            PlateItem::Garnish(_) => PlateRole::Garnish,
        }
    }

    /// Display colour as 0xRRGGBB
    pub fn color(&self) -> u32 {
        match self {
            PlateItem::Food(Food::Steak) => 0x8b4513,
            PlateItem::Food(Food::Chicken) => 0xdaa520,
            PlateItem::Food(Food::Fish) => 0xffa07a,
            PlateItem::Food(Food::Vegetable) => 0x228b22,
            PlateItem::Food(Food::Potato) => 0xf4a460,
            PlateItem::Food(Food::Rice) => 0xfffaf0,
            PlateItem::Garnish(Garnish::Basil) => 0x228b22,
            PlateItem::Garnish(Garnish::Parsley) => 0x32cd32,
            PlateItem::Garnish(Garnish::Lemon) => 0xfff44f,
            PlateItem::Garnish(Garnish::Microgreens) => 0x90ee90,
            PlateItem::Garnish(Garnish::Flower) => 0xff69b4,
        }
    }
}

/// An item placed on the plate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub item: PlateItem,
    pub position: DVec2,
}

impl PlacedItem {
    pub fn new(item: PlateItem, x: f64, z: f64) -> Self {
        Self {
            item,
            position: DVec2::new(x, z),
        }
    }
}

/// Item counts that earn the full count bonus
pub const IDEAL_ITEM_RANGE: std::ops::RangeInclusive<usize> = 3..=7;
/// Sauce points needed before the sauce counts
pub const MIN_SAUCE_POINTS: usize = 3;
/// Items closer than this on both axes are treated as stacked
pub const LAYERING_DISTANCE: f64 = 0.03;

const COUNT_IDEAL: f64 = 15.0;
const COUNT_ANY: f64 = 8.0;
const PROTEIN: f64 = 15.0;
const SIDE: f64 = 10.0;
const GARNISH: f64 = 10.0;
const SAUCE: f64 = 10.0;
const BALANCE: f64 = 15.0;
const VARIETY: f64 = 15.0;
const VARIETY_PER_COLOR: f64 = 3.0;
const LAYERING: f64 = 10.0;

fn has_role(items: &[PlacedItem], role: PlateRole) -> bool {
    items.iter().any(|p| p.item.role() == role)
}

/// Distance of the item centroid from the plate centre. An empty plate's
/// centroid is the centre itself.
pub fn centroid_distance(items: &[PlacedItem]) -> f64 {
    let sum: DVec2 = items.iter().map(|p| p.position).sum();
    (sum / items.len().max(1) as f64).length()
}

/// Whether any two items sit on top of each other
pub fn has_layering(items: &[PlacedItem]) -> bool {
    items.iter().enumerate().any(|(i, a)| {
        items[i + 1..].iter().any(|b| {
            let d = (a.position - b.position).abs();
            d.x < LAYERING_DISTANCE && d.y < LAYERING_DISTANCE
        })
    })
}

fn distinct_colors(items: &[PlacedItem]) -> usize {
    let mut colors: Vec<u32> = items.iter().map(|p| p.item.color()).collect();
    colors.sort_unstable();
    colors.dedup();
    colors.len()
}

/// Composition score for a plate
pub fn score_plating(items: &[PlacedItem], sauce_points: usize) -> ScoreBreakdown {
    let count = if IDEAL_ITEM_RANGE.contains(&items.len()) {
        COUNT_IDEAL
    } else if !items.is_empty() {
        COUNT_ANY
    } else {
        0.0
    };
    let flag = |present: bool, points: f64| if present { points } else { 0.0 };
    let balance = (BALANCE - centroid_distance(items) * 100.0).max(0.0).round();

    ScoreBreakdown::from_components([
        ScoreComponent::bonus("item_count", count, COUNT_IDEAL),
        ScoreComponent::bonus("protein", flag(has_role(items, PlateRole::Protein), PROTEIN), PROTEIN),
        ScoreComponent::bonus("side", flag(has_role(items, PlateRole::Side), SIDE), SIDE),
        ScoreComponent::bonus("garnish", flag(has_role(items, PlateRole::Garnish), GARNISH), GARNISH),
        ScoreComponent::bonus("sauce", flag(sauce_points > MIN_SAUCE_POINTS, SAUCE), SAUCE),
        ScoreComponent::bonus("balance", balance, BALANCE),
        ScoreComponent::bonus("variety", distinct_colors(items) as f64 * VARIETY_PER_COLOR, VARIETY),
        ScoreComponent::bonus("layering", flag(has_layering(items), LAYERING), LAYERING),
    ])
}
