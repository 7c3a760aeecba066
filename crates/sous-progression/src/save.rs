//! Save data
//!
//! Versioned JSON save files. Older versions are brought forward through a
//! migration table before validation; anything unreadable falls back to the
//! backup file and then to a fresh save.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::achievements::{Achievement, default_achievements};
use crate::profile::Progression;
use crate::{SaveError, SaveResult};

/// Version written by this build
pub const CURRENT_VERSION: u32 = 2;
/// Primary save file name
pub const SAVE_FILE: &str = "save.json";
/// Backup save file name
pub const BACKUP_FILE: &str = "save.backup.json";

/// Seconds since the Unix epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Day number for a Unix timestamp, used for streaks
pub fn epoch_day(unix_secs: u64) -> i64 {
    (unix_secs / 86_400) as i64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicsQuality {
    Low,
    Medium,
    #[default]
    High,
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub sound_enabled: bool,
    pub music_enabled: bool,
    /// 0 to 1
    pub sound_volume: f64,
    /// 0 to 1
    pub music_volume: f64,
    pub show_tutorials: bool,
    pub camera_speed: f64,
    pub graphics_quality: GraphicsQuality,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            sound_volume: 0.7,
            music_volume: 0.5,
            show_tutorials: true,
            camera_speed: 1.0,
            graphics_quality: GraphicsQuality::High,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> SaveResult<()> {
        for (name, volume) in [("sound_volume", self.sound_volume), ("music_volume", self.music_volume)] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(SaveError::Invalid(format!("{name} {volume} is outside 0..1")));
            }
        }
        if !(self.camera_speed > 0.0 && self.camera_speed.is_finite()) {
            return Err(SaveError::Invalid(format!(
                "camera_speed must be positive, got {}",
                self.camera_speed
            )));
        }
        Ok(())
    }
}

/// Lifetime play statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_recipes_completed: u32,
    pub total_mini_games_played: u32,
    /// Seconds of simulated cooking
    pub total_play_time: f64,
    /// Mean recipe percentage over all completions
    pub average_score: f64,
    pub perfect_recipes: u32,
    pub perfect_mini_games: u32,
}

impl Statistics {
    /// Count a finished recipe; `percentage` is the 0-100 rating basis
    pub fn record_recipe(&mut self, percentage: f64, stars: u8, time: f64) {
        let n = self.total_recipes_completed as f64;
        self.average_score = (self.average_score * n + percentage) / (n + 1.0);
        self.total_recipes_completed += 1;
        self.total_play_time += time.max(0.0);
        if stars >= 3 {
            self.perfect_recipes += 1;
        }
    }

    pub fn record_mini_game(&mut self, score: u32) {
        self.total_mini_games_played += 1;
        if score >= 100 {
            self.perfect_mini_games += 1;
        }
    }
}

/// Who the save belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    /// Unix seconds
    pub created_at: u64,
    /// Unix seconds
    pub last_played: u64,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        let now = unix_now();
        Self {
            name: "Chef".to_string(),
            created_at: now,
            last_played: now,
        }
    }
}

/// Everything persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub player: PlayerInfo,
    pub progression: Progression,
    pub achievements: Vec<Achievement>,
    pub settings: GameSettings,
    pub statistics: Statistics,
    /// Unix seconds of the last write
    pub saved_at: u64,
}

impl Default for SaveData {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            player: PlayerInfo::default(),
            progression: Progression::default(),
            achievements: default_achievements(),
            settings: GameSettings::default(),
            statistics: Statistics::default(),
            saved_at: unix_now(),
        }
    }
}

type Migration = fn(Value) -> SaveResult<Value>;

/// Upgrades keyed by the version they start from
const MIGRATIONS: &[(u32, Migration)] = &[(1, migrate_v1)];

impl SaveData {
    /// Parse, migrate and validate a save
    pub fn from_json(json: &str) -> SaveResult<Self> {
        let mut value: Value = serde_json::from_str(json)?;
        let mut version = read_version(&value)?;
        if version > CURRENT_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: version,
                current: CURRENT_VERSION,
            });
        }
        while version < CURRENT_VERSION {
            let (_, migrate) = MIGRATIONS
                .iter()
                .find(|(from, _)| *from == version)
                .ok_or(SaveError::NoMigration(version))?;
            value = migrate(value)?;
            let next = read_version(&value)?;
            if next <= version {
                return Err(SaveError::NoMigration(version));
            }
            log::info!("Migrated save from v{version} to v{next}");
            version = next;
        }

        let data: SaveData = serde_json::from_value(value)?;
        data.validate()?;
        Ok(data)
    }

    pub fn to_json(&self) -> SaveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SaveResult<()> {
        if self.version != CURRENT_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: self.version,
                current: CURRENT_VERSION,
            });
        }
        if self.player.name.trim().is_empty() {
            return Err(SaveError::Invalid("player name is empty".into()));
        }
        self.progression
            .validate()
            .map_err(|e| SaveError::Invalid(e.to_string()))?;
        self.settings.validate()
    }
}

fn read_version(value: &Value) -> SaveResult<u32> {
    value
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(SaveError::MissingVersion)
}

mod v1 {
    use serde::Deserialize;

    use crate::achievements::Achievement;
    use crate::save::{GameSettings, Statistics};

    #[derive(Deserialize)]
    pub struct Profile {
        pub name: String,
        pub level: u32,
        pub experience: u64,
        #[serde(default)]
        pub created_at: u64,
        #[serde(default)]
        pub last_played: u64,
    }

    #[derive(Deserialize)]
    pub struct RecipeProgress {
        pub recipe_id: String,
        #[serde(default)]
        pub best_score: u32,
        #[serde(default)]
        pub best_stars: u8,
        #[serde(default)]
        pub times_completed: u32,
    }

    #[derive(Deserialize)]
    pub struct Save {
        pub profile: Profile,
        #[serde(default)]
        pub recipe_progress: Vec<RecipeProgress>,
        #[serde(default)]
        pub achievements: Vec<Achievement>,
        #[serde(default)]
        pub settings: GameSettings,
        #[serde(default)]
        pub statistics: Statistics,
        #[serde(default)]
        pub saved_at: u64,
    }
}

/// v1 kept a bare level/experience profile and a recipe progress list, and
/// had no coins or streaks
fn migrate_v1(value: Value) -> SaveResult<Value> {
    use crate::profile::{MAX_LEVEL, MILESTONES, RecipeStats, total_xp_to_level};

    let old: v1::Save = serde_json::from_value(value)?;
    let level = old.profile.level.clamp(1, MAX_LEVEL);

    let mut progression = Progression {
        level,
        current_xp: old.profile.experience,
        total_xp: total_xp_to_level(level) + old.profile.experience,
        ..Progression::default()
    };
    for milestone in MILESTONES.iter().filter(|m| m.level <= level) {
        for id in milestone.recipes {
            progression.unlock_recipe(id);
        }
    }
    for entry in old.recipe_progress.into_iter().filter(|p| p.times_completed > 0) {
        progression.unlock_recipe(&entry.recipe_id);
        progression.recipes.insert(
            entry.recipe_id,
            RecipeStats {
                times_cooked: entry.times_completed,
                best_score: entry.best_score,
                best_stars: entry.best_stars.min(3),
                best_time: None,
            },
        );
    }

    let achievements = if old.achievements.is_empty() {
        default_achievements()
    } else {
        old.achievements
    };

    let data = SaveData {
        version: 2,
        player: PlayerInfo {
            name: old.profile.name,
            created_at: old.profile.created_at,
            last_played: old.profile.last_played,
        },
        progression,
        achievements,
        settings: old.settings,
        statistics: old.statistics,
        saved_at: old.saved_at,
    };
    Ok(serde_json::to_value(data)?)
}

/// Save files in one directory: a primary and a backup copy
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn primary_path(&self) -> PathBuf {
        self.dir.join(SAVE_FILE)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.dir.join(BACKUP_FILE)
    }

    /// Read one save file
    pub fn read(path: &Path) -> SaveResult<SaveData> {
        let json = fs::read_to_string(path)?;
        SaveData::from_json(&json)
    }

    /// Load the primary save, falling back to the backup and then to a fresh save
    pub fn load(&self) -> SaveData {
        let primary = self.primary_path();
        match Self::read(&primary) {
            Ok(data) => {
                log::debug!("Loaded save from {}", primary.display());
                data
            }
            Err(SaveError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No save found, creating a new profile");
                SaveData::default()
            }
            Err(e) => {
                log::warn!("Invalid save data ({e}), attempting backup recovery");
                match Self::read(&self.backup_path()) {
                    Ok(data) => {
                        log::info!("Recovered save from backup");
                        data
                    }
                    Err(e) => {
                        log::warn!("Backup also unusable ({e}), creating a new profile");
                        SaveData::default()
                    }
                }
            }
        }
    }

    /// Write the save to both files, stamping `saved_at`
    pub fn save(&self, data: &mut SaveData) -> SaveResult<()> {
        data.saved_at = unix_now();
        let json = data.to_json()?;
        fs::create_dir_all(&self.dir)?;
        for path in [self.primary_path(), self.backup_path()] {
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, &json)?;
            fs::rename(&tmp, &path)?;
        }
        log::info!("Game saved to {}", self.dir.display());
        Ok(())
    }

    /// Delete both save files
    pub fn clear(&self) -> SaveResult<()> {
        for path in [self.primary_path(), self.backup_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        log::info!("All save data cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sous_core::{ProgressionSink, XpSource};

    const V1_SAVE: &str = r#"{
        "version": 1,
        "profile": { "name": "Robin", "level": 3, "experience": 40, "created_at": 1000, "last_played": 2000 },
        "recipe_progress": [
            { "recipe_id": "pancakes", "best_score": 270, "best_stars": 3, "times_completed": 4 },
            { "recipe_id": "omelette", "best_score": 0, "best_stars": 0, "times_completed": 0 }
        ],
        "achievements": [],
        "settings": { "sound_volume": 0.2 },
        "statistics": { "total_recipes_completed": 4 },
        "saved_at": 3000
    }"#;

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());

        let mut data = SaveData::default();
        data.progression.add_xp(300, XpSource::Other("test".into()));
        data.settings.music_enabled = false;
        store.save(&mut data).unwrap();

        assert!(store.primary_path().exists());
        assert!(store.backup_path().exists());
        assert_eq!(store.load(), data);
    }

    #[test]
    fn test_missing_save_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("nested"));
        let data = store.load();
        assert_eq!(data.version, CURRENT_VERSION);
        assert_eq!(data.progression, Progression::default());
        assert_eq!(data.achievements.len(), 5);
    }

    #[test]
    fn test_corrupt_primary_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());

        let mut data = SaveData::default();
        data.player.name = "Sam".into();
        store.save(&mut data).unwrap();
        fs::write(store.primary_path(), "{ truncated").unwrap();

        assert_eq!(store.load().player.name, "Sam");

        fs::write(store.backup_path(), r#"{ "version": 2 }"#).unwrap();
        assert_eq!(store.load().player.name, "Chef");
    }

    #[test]
    fn test_future_version_is_rejected() {
        let mut value = serde_json::to_value(SaveData::default()).unwrap();
        value["version"] = 9.into();
        let err = SaveData::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, SaveError::UnsupportedVersion { found: 9, current: 2 }));

        assert!(matches!(
            SaveData::from_json(r#"{ "player": {} }"#),
            Err(SaveError::MissingVersion)
        ));
        assert!(matches!(
            SaveData::from_json(r#"{ "version": 0 }"#),
            Err(SaveError::NoMigration(0))
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut data = SaveData::default();
        data.settings.sound_volume = 3.0;
        assert!(SaveData::from_json(&data.to_json().unwrap()).is_err());

        let mut data = SaveData::default();
        data.progression.level = 0;
        assert!(matches!(
            SaveData::from_json(&data.to_json().unwrap()),
            Err(SaveError::Invalid(_))
        ));
    }

    #[test]
    fn test_migrate_v1() {
        let data = SaveData::from_json(V1_SAVE).unwrap();
        assert_eq!(data.version, CURRENT_VERSION);
        assert_eq!(data.player.name, "Robin");
        assert_eq!(data.player.created_at, 1000);

        let p = &data.progression;
        assert_eq!(p.level, 3);
        assert_eq!(p.current_xp, 40);
        assert_eq!(p.total_xp, 250 + 541 + 40);
        assert_eq!(p.coins, 100);
        assert!(p.is_unlocked("tomato_soup"));
        assert!(p.is_unlocked("omelette"));
        assert!(!p.is_unlocked("tiramisu"));
        assert_eq!(p.stats("pancakes").map(|s| s.times_cooked), Some(4));
        assert!(p.stats("omelette").is_none());

        assert_eq!(data.achievements.len(), 5);
        assert_eq!(data.settings.sound_volume, 0.2);
        assert_eq!(data.settings.music_volume, 0.5);
        assert_eq!(data.statistics.total_recipes_completed, 4);
    }

    #[test]
    fn test_migrated_v1_in_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        fs::write(store.primary_path(), V1_SAVE).unwrap();
        assert_eq!(store.load().player.name, "Robin");
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        store.save(&mut SaveData::default()).unwrap();
        store.clear().unwrap();
        assert!(!store.primary_path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_statistics() {
        let mut stats = Statistics::default();
        stats.record_recipe(80.0, 2, 60.0);
        stats.record_recipe(100.0, 3, 40.0);
        stats.record_mini_game(100);
        stats.record_mini_game(64);
        assert_eq!(stats.average_score, 90.0);
        assert_eq!(stats.perfect_recipes, 1);
        assert_eq!(stats.perfect_mini_games, 1);
        assert_eq!(stats.total_play_time, 100.0);
    }
}
