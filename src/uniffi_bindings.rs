//! UniFFI bindings for fetch-recipes
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! It wraps the async Rust API with synchronous functions that manage their own tokio runtime.

use std::fmt;
use std::time::Duration;

use crate::{FetchError, FilterConfig, Recipe, RecipeClient, SortOrder};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe structure
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipe {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub photo_url_small: Option<String>,
    pub photo_url_large: Option<String>,
    pub source_url: Option<String>,
    pub youtube_url: Option<String>,
}

impl From<Recipe> for FfiRecipe {
    fn from(recipe: Recipe) -> Self {
        FfiRecipe {
            id: recipe.id,
            name: recipe.name,
            cuisine: recipe.cuisine,
            photo_url_small: recipe.photo_url_small,
            photo_url_large: recipe.photo_url_large,
            source_url: recipe.source_url,
            youtube_url: recipe.youtube_url,
        }
    }
}

impl From<FfiRecipe> for Recipe {
    fn from(ffi: FfiRecipe) -> Self {
        Recipe {
            id: ffi.id,
            name: ffi.name,
            cuisine: ffi.cuisine,
            photo_url_small: ffi.photo_url_small,
            photo_url_large: ffi.photo_url_large,
            source_url: ffi.source_url,
            youtube_url: ffi.youtube_url,
        }
    }
}

/// FFI-compatible filter (sets aren't directly supported in UniFFI)
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiFilterConfig {
    pub cuisines: Vec<String>,
    pub require_website: bool,
    pub require_video: bool,
}

impl From<FfiFilterConfig> for FilterConfig {
    fn from(ffi: FfiFilterConfig) -> Self {
        FilterConfig {
            cuisines: ffi.cuisines.into_iter().collect(),
            require_website: ffi.require_website,
            require_video: ffi.require_video,
        }
    }
}

/// FFI-compatible sort direction
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiSortOrder {
    Ascending,
    Descending,
}

impl From<FfiSortOrder> for SortOrder {
    fn from(order: FfiSortOrder) -> Self {
        match order {
            FfiSortOrder::Ascending => SortOrder::Ascending,
            FfiSortOrder::Descending => SortOrder::Descending,
        }
    }
}

/// FFI-compatible error type. `code` is the support code shown to users.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiFetchError {
    InvalidUrl { code: u8, message: String },
    InvalidResponse { code: u8, message: String },
    Decoding { code: u8, message: String },
    Unknown { code: u8, message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiFetchError::InvalidUrl { code, message } => {
                write!(f, "Invalid URL ({}): {}", code, message)
            }
            FfiFetchError::InvalidResponse { code, message } => {
                write!(f, "Invalid response ({}): {}", code, message)
            }
            FfiFetchError::Decoding { code, message } => {
                write!(f, "Decoding error ({}): {}", code, message)
            }
            FfiFetchError::Unknown { code, message } => {
                write!(f, "Unknown error ({}): {}", code, message)
            }
            FfiFetchError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiFetchError {}

impl From<FetchError> for FfiFetchError {
    fn from(err: FetchError) -> Self {
        let code = err.code();
        let message = err.user_message();
        match err {
            FetchError::InvalidUrl(_) => FfiFetchError::InvalidUrl { code, message },
            FetchError::InvalidResponse(_) => FfiFetchError::InvalidResponse { code, message },
            FetchError::Decoding { .. } => FfiFetchError::Decoding { code, message },
            FetchError::Unknown(_) => FfiFetchError::Unknown { code, message },
        }
    }
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiFetchError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiFetchError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

/// FFI-compatible fetch settings. Unset fields fall back to the defaults.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiFetchConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

impl FfiFetchConfig {
    fn client(self) -> Result<RecipeClient, FetchError> {
        let mut builder = RecipeClient::builder();
        if let Some(endpoint) = self.endpoint {
            builder = builder.endpoint(endpoint);
        }
        if let Some(timeout_secs) = self.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        builder.build()
    }
}

/// Fetch the recipe list
///
/// # Arguments
/// * `config` - Optional endpoint, timeout and user agent (defaults if not specified)
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn fetch_recipes(config: Option<FfiFetchConfig>) -> Result<Vec<FfiRecipe>, FfiFetchError> {
    let client = config.unwrap_or_default().client()?;
    let rt = create_runtime()?;
    rt.block_on(async {
        let list = client.fetch_recipes().await?;
        Ok(list.into_recipes().into_iter().map(FfiRecipe::from).collect())
    })
}

/// Keep the recipes passing `filter`, in order
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn filter_recipes(recipes: Vec<FfiRecipe>, filter: FfiFilterConfig) -> Vec<FfiRecipe> {
    let filter = FilterConfig::from(filter);
    recipes
        .into_iter()
        .filter(|ffi| filter.matches(&Recipe::from(ffi.clone())))
        .collect()
}

/// Toggle-sort by name (descending when the first name starts with "A")
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn sort_recipes(recipes: Vec<FfiRecipe>) -> Vec<FfiRecipe> {
    let mut recipes: Vec<Recipe> = recipes.into_iter().map(Recipe::from).collect();
    crate::sort::sort(&mut recipes);
    recipes.into_iter().map(FfiRecipe::from).collect()
}

/// Sort by name in an explicit direction
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn sort_recipes_by(recipes: Vec<FfiRecipe>, order: FfiSortOrder) -> Vec<FfiRecipe> {
    let mut recipes: Vec<Recipe> = recipes.into_iter().map(Recipe::from).collect();
    crate::sort::sort_by_order(&mut recipes, order.into());
    recipes.into_iter().map(FfiRecipe::from).collect()
}

/// Alert text for a support code, as shown for a failed fetch
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn error_code_message(code: u8) -> String {
    crate::error::support_message(code)
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
