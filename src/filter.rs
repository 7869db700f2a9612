use std::collections::BTreeSet;

use crate::model::{Cuisine, Recipe};

/// Optional-media requirements a user can switch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdditionalMaterial {
    HideWithoutWebsite,
    HideWithoutVideo,
}

impl AdditionalMaterial {
    pub const ALL: [AdditionalMaterial; 2] = [
        AdditionalMaterial::HideWithoutWebsite,
        AdditionalMaterial::HideWithoutVideo,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            AdditionalMaterial::HideWithoutWebsite => "Hide without website",
            AdditionalMaterial::HideWithoutVideo => "Hide without video",
        }
    }
}

/// User-selected inclusion criteria. The default restricts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Selected cuisine names; empty means any cuisine
    pub cuisines: BTreeSet<String>,
    pub require_website: bool,
    pub require_video: bool,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisines.insert(cuisine.into());
        self
    }

    pub fn require_website(mut self, required: bool) -> Self {
        self.require_website = required;
        self
    }

    pub fn require_video(mut self, required: bool) -> Self {
        self.require_video = required;
        self
    }

    /// True when no condition is active.
    pub fn is_empty(&self) -> bool {
        self.cuisines.is_empty() && !self.require_website && !self.require_video
    }

    /// Add the cuisine if absent, remove it if present.
    pub fn toggle_cuisine(&mut self, cuisine: Cuisine) {
        let name = cuisine.as_str();
        if !self.cuisines.remove(name) {
            self.cuisines.insert(name.to_string());
        }
    }

    pub fn has_material(&self, material: AdditionalMaterial) -> bool {
        match material {
            AdditionalMaterial::HideWithoutWebsite => self.require_website,
            AdditionalMaterial::HideWithoutVideo => self.require_video,
        }
    }

    pub fn toggle_material(&mut self, material: AdditionalMaterial) {
        match material {
            AdditionalMaterial::HideWithoutWebsite => self.require_website = !self.require_website,
            AdditionalMaterial::HideWithoutVideo => self.require_video = !self.require_video,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        matches(recipe, self)
    }

    /// Derive the visible view without touching the source list.
    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        recipes.iter().filter(|recipe| self.matches(recipe)).collect()
    }
}

/// Returns whether `recipe` passes every active condition in `config`.
pub fn matches(recipe: &Recipe, config: &FilterConfig) -> bool {
    if !config.cuisines.is_empty() && !config.cuisines.contains(&recipe.cuisine) {
        return false;
    }
    if config.require_video && !recipe.has_youtube_video() {
        return false;
    }
    if config.require_website && !recipe.has_source_website() {
        return false;
    }
    true
}
