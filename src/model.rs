use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One dish entry from the recipe feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Stable identifier, unique within a list (`uuid` on the wire)
    #[serde(rename = "uuid")]
    pub id: String,
    pub name: String,
    pub cuisine: String,
    #[serde(default)]
    pub photo_url_small: Option<String>,
    #[serde(default)]
    pub photo_url_large: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
}

impl Recipe {
    pub fn has_source_website(&self) -> bool {
        self.source_url.is_some()
    }

    pub fn has_youtube_video(&self) -> bool {
        self.youtube_url.is_some()
    }
}

/// The recipe feed as received, order preserved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeList {
    pub recipes: Vec<Recipe>,
}

impl RecipeList {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipe> {
        self.recipes.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    pub fn into_recipes(self) -> Vec<Recipe> {
        self.recipes
    }

    /// Distinct cuisines in the order they first appear.
    pub fn cuisines(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.recipes
            .iter()
            .map(|recipe| recipe.cuisine.as_str())
            .filter(|cuisine| seen.insert(*cuisine))
            .collect()
    }

    /// Returns the first id that occurs more than once, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.recipes
            .iter()
            .map(|recipe| recipe.id.as_str())
            .find(|id| !seen.insert(*id))
    }
}

impl<'a> IntoIterator for &'a RecipeList {
    type Item = &'a Recipe;
    type IntoIter = std::slice::Iter<'a, Recipe>;

    fn into_iter(self) -> Self::IntoIter {
        self.recipes.iter()
    }
}

/// Cuisines offered as filter choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cuisine {
    American,
    British,
    Canadian,
    Croatian,
    French,
    Greek,
    Italian,
    Malaysian,
    Russian,
    Tunisian,
}

impl Cuisine {
    pub const ALL: [Cuisine; 10] = [
        Cuisine::American,
        Cuisine::British,
        Cuisine::Canadian,
        Cuisine::Croatian,
        Cuisine::French,
        Cuisine::Greek,
        Cuisine::Italian,
        Cuisine::Malaysian,
        Cuisine::Russian,
        Cuisine::Tunisian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cuisine::American => "American",
            Cuisine::British => "British",
            Cuisine::Canadian => "Canadian",
            Cuisine::Croatian => "Croatian",
            Cuisine::French => "French",
            Cuisine::Greek => "Greek",
            Cuisine::Italian => "Italian",
            Cuisine::Malaysian => "Malaysian",
            Cuisine::Russian => "Russian",
            Cuisine::Tunisian => "Tunisian",
        }
    }
}

impl fmt::Display for Cuisine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that matches no catalogue cuisine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown cuisine: {0}")]
pub struct UnknownCuisine(pub String);

impl FromStr for Cuisine {
    type Err = UnknownCuisine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cuisine::ALL
            .iter()
            .copied()
            .find(|cuisine| cuisine.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCuisine(s.to_string()))
    }
}
