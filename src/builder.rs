use std::sync::Arc;
use std::time::Duration;

use crate::client::RecipeClient;
use crate::config::{AppConfig, DEFAULT_ENDPOINT};
use crate::error::FetchError;
use crate::transport::{HttpTransport, ReqwestTransport};

/// Builder for configuring a [`RecipeClient`]
#[derive(Default)]
pub struct RecipeClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl RecipeClientBuilder {
    /// Start from loaded application settings
    ///
    /// # Example
    /// ```
    /// use fetch_recipes::{AppConfig, RecipeClient};
    ///
    /// let builder = RecipeClient::builder().config(&AppConfig::default());
    /// ```
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.endpoint = Some(config.endpoint.clone());
        self.timeout = Some(config.timeout_duration());
        self.user_agent = config.user_agent.clone();
        self
    }

    /// Set the URL of the recipe list
    ///
    /// The URL is validated when the list is fetched, so a bad endpoint
    /// surfaces as `FetchError::InvalidUrl` from `fetch_recipes`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set a timeout for HTTP requests
    ///
    /// # Example
    /// ```
    /// use fetch_recipes::RecipeClient;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeClient::builder()
    ///     .timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a custom transport instead of the default reqwest client.
    /// Timeout and user agent are ignored in that case.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns `FetchError::Unknown` if the HTTP client cannot be created
    pub fn build(self) -> Result<RecipeClient, FetchError> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(self.timeout, self.user_agent.as_deref())
                    .map_err(|e| FetchError::Unknown(e.to_string()))?,
            ),
        };

        Ok(RecipeClient::new(endpoint, transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let client = RecipeClient::builder().build().unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_config_sets_endpoint() {
        let config = AppConfig {
            endpoint: "http://localhost:9999/recipes.json".to_string(),
            ..AppConfig::default()
        };
        let client = RecipeClient::builder().config(&config).build().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/recipes.json");
    }

    #[test]
    fn test_explicit_endpoint_wins_over_config() {
        let client = RecipeClient::builder()
            .config(&AppConfig::default())
            .endpoint("http://localhost/other.json")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://localhost/other.json");
    }

    #[tokio::test]
    async fn test_invalid_endpoint_fails_on_fetch() {
        let client = RecipeClient::builder()
            .endpoint("not a url")
            .build()
            .unwrap();
        let err = client.fetch_recipes().await.unwrap_err();
        assert_eq!(err, FetchError::InvalidUrl("not a url".to_string()));
        assert_eq!(err.code(), 1);
    }
}
