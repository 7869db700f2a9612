use std::time::Duration;

pub use config::ConfigError;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://d3jbb8n5wk0qxi.cloudfront.net/recipes.json";

/// Runtime settings for the recipe client and image loader
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// URL of the recipe list
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds, applied to list and image requests
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// User agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Upper bound on image downloads in flight at once
    #[serde(default = "default_max_concurrent_image_loads")]
    pub max_concurrent_image_loads: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
            user_agent: None,
            max_concurrent_image_loads: default_max_concurrent_image_loads(),
        }
    }
}

// Default value functions
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_concurrent_image_loads() -> usize {
    6
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with FETCH_RECIPES__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: FETCH_RECIPES__ENDPOINT
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from `config.toml` (optional) and `FETCH_RECIPES__*`
/// environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("FETCH_RECIPES")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
