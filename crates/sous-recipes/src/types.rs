//! Recipe vocabulary
//!
//! Closed sets of categories, cuisines, actions and tags used by recipe data.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::RecipeError;

/// Declares a closed string enum with its wire names, `ALL`, `Display` and `FromStr`
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            /// Every value in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Name as written in recipe data
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RecipeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| RecipeError::UnknownName {
                        kind: stringify!($name),
                        name: wanted.to_string(),
                    })
            }
        }
    };
}

named_enum! {
    /// Meal slot a recipe belongs to
    pub enum RecipeCategory {
        Breakfast => "breakfast",
        Lunch => "lunch",
        Dinner => "dinner",
        Dessert => "dessert",
        Snack => "snack",
    }
}

named_enum! {
    pub enum Cuisine {
        American => "american",
        Italian => "italian",
        Asian => "asian",
        Mexican => "mexican",
        Mediterranean => "mediterranean",
        French => "french",
        Japanese => "japanese",
        Indian => "indian",
        Chinese => "chinese",
        Thai => "thai",
    }
}

named_enum! {
    /// Pantry group of an ingredient
    pub enum IngredientCategory {
        Protein => "protein",
        Vegetable => "vegetable",
        Fruit => "fruit",
        Dairy => "dairy",
        Grain => "grain",
        Spice => "spice",
        Sauce => "sauce",
        Fat => "fat",
        Sweetener => "sweetener",
        Other => "other",
    }
}

named_enum! {
    /// What the cook does during a step
    pub enum CookingAction {
        Prep => "prep",
        Cook => "cook",
        Combine => "combine",
        Plate => "plate",
        Bake => "bake",
        Fry => "fry",
        Boil => "boil",
        Simmer => "simmer",
        Chop => "chop",
        Mix => "mix",
        Measure => "measure",
    }
}

named_enum! {
    /// Camera framing authored on a step
    pub enum CameraAngle {
        Overhead => "overhead",
        Closeup => "closeup",
        Side => "side",
        Dynamic => "dynamic",
        Wide => "wide",
    }
}

/// Lowest recipe difficulty
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest recipe difficulty
pub const MAX_DIFFICULTY: u8 = 5;

/// Recipe difficulty, 1 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const EASIEST: Self = Self(MIN_DIFFICULTY);
    pub const HARDEST: Self = Self(MAX_DIFFICULTY);

    pub fn new(value: u8) -> Result<Self, RecipeError> {
        Self::try_from(value)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Coarse three-way tier used by the simplified recipe listing
    pub fn tier(&self) -> DifficultyTier {
        match self.0 {
            0..=2 => DifficultyTier::Easy,
            3 => DifficultyTier::Medium,
            _ => DifficultyTier::Hard,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = RecipeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RecipeError::InvalidDifficulty(value))
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

named_enum! {
    /// Easy / medium / hard
    pub enum DifficultyTier {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

/// Per-serving nutrition facts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    /// kcal
    pub calories: u32,
    /// Grams
    pub protein: f64,
    /// Grams
    pub carbs: f64,
    /// Grams
    pub fat: f64,
    /// Grams
    pub fiber: f64,
    /// Milligrams
    pub sodium: f64,
    /// Grams
    pub sugar: f64,
}

/// Gives a bitflags set a name table and list-of-names serde
macro_rules! tag_set {
    ($name:ident, $what:literal, [$($flag:ident => $tag:literal),+ $(,)?]) => {
        impl $name {
            /// Each single flag with its name in recipe data
            pub const NAMES: &'static [($name, &'static str)] = &[$(($name::$flag, $tag)),+];

            /// Look up a single flag by name
            pub fn from_tag(name: &str) -> Option<Self> {
                let name = name.trim();
                Self::NAMES
                    .iter()
                    .find(|(_, n)| n.eq_ignore_ascii_case(name))
                    .map(|(flag, _)| *flag)
            }

            /// Names of the flags that are set, in table order
            pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
                Self::NAMES
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, n)| *n)
            }
        }

        impl FromStr for $name {
            type Err = RecipeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_tag(s).ok_or_else(|| RecipeError::UnknownName {
                    kind: $what,
                    name: s.trim().to_string(),
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_seq(self.names())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let names = Vec::<String>::deserialize(deserializer)?;
                names
                    .iter()
                    .map(|n| {
                        Self::from_tag(n)
                            .ok_or_else(|| de::Error::custom(format!("unknown {} '{}'", $what, n)))
                    })
                    .collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for (i, n) in self.names().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(n)?;
                }
                Ok(())
            }
        }
    };
}

bitflags! {
    /// Dietary labels
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HealthTags: u16 {
        const HIGH_PROTEIN = 1 << 0;
        const LOW_CARB = 1 << 1;
        const VEGETARIAN = 1 << 2;
        const VEGAN = 1 << 3;
        const GLUTEN_FREE = 1 << 4;
        const DAIRY_FREE = 1 << 5;
        const KETO = 1 << 6;
        const PALEO = 1 << 7;
        const LOW_SODIUM = 1 << 8;
        const LOW_SUGAR = 1 << 9;
    }
}

tag_set!(HealthTags, "health tag", [
    HIGH_PROTEIN => "high-protein",
    LOW_CARB => "low-carb",
    VEGETARIAN => "vegetarian",
    VEGAN => "vegan",
    GLUTEN_FREE => "gluten-free",
    DAIRY_FREE => "dairy-free",
    KETO => "keto",
    PALEO => "paleo",
    LOW_SODIUM => "low-sodium",
    LOW_SUGAR => "low-sugar",
]);

bitflags! {
    /// Allergens present in a recipe
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Allergens: u16 {
        const GLUTEN = 1 << 0;
        const DAIRY = 1 << 1;
        const EGGS = 1 << 2;
        const NUTS = 1 << 3;
        const PEANUTS = 1 << 4;
        const SOY = 1 << 5;
        const SHELLFISH = 1 << 6;
        const FISH = 1 << 7;
        const SESAME = 1 << 8;
    }
}

tag_set!(Allergens, "allergen", [
    GLUTEN => "gluten",
    DAIRY => "dairy",
    EGGS => "eggs",
    NUTS => "nuts",
    PEANUTS => "peanuts",
    SOY => "soy",
    SHELLFISH => "shellfish",
    FISH => "fish",
    SESAME => "sesame",
]);
