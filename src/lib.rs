//! Headless core for browsing a remote recipe feed.
//!
//! Fetch the list with [`RecipeClient`], narrow it with [`FilterConfig`],
//! order it with [`sort()`], and load photos lazily through
//! [`ImageLoader`]. [`RecipeStore`] ties these together into the state a
//! front-end renders from.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod images;
pub mod model;
pub mod sort;
pub mod store;
pub mod transport;

pub mod uniffi_bindings;

pub use builder::RecipeClientBuilder;
pub use client::{decode_recipes, RecipeClient};
pub use crate::config::{load_config, AppConfig, ConfigError, DEFAULT_ENDPOINT};
pub use error::{support_message, DecodingErrorKind, FetchError, ImageError};
pub use filter::{matches, AdditionalMaterial, FilterConfig};
pub use images::{decode_image, ImageLoader, ImageSize, ImageState, LoadedImage};
pub use model::{Cuisine, Recipe, RecipeList, UnknownCuisine};
pub use sort::{sort, sort_by_order, SortOrder};
pub use store::RecipeStore;
pub use transport::{HttpTransport, ReqwestTransport, TransportError};

/// Fetch the recipe list from the default endpoint with default settings.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let list = fetch_recipes::fetch_recipes().await?;
/// println!("{} recipes", list.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_recipes() -> Result<RecipeList, FetchError> {
    RecipeClient::builder().build()?.fetch_recipes().await
}

/// Fetch the recipe list from `endpoint`.
pub async fn fetch_recipes_from(endpoint: &str) -> Result<RecipeList, FetchError> {
    RecipeClient::builder()
        .endpoint(endpoint)
        .build()?
        .fetch_recipes()
        .await
}
