use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::builder::RecipeClientBuilder;
use crate::error::{DecodingErrorKind, FetchError};
use crate::model::RecipeList;
use crate::transport::{parse_url, HttpTransport};

/// Fetches and decodes the recipe list from a fixed endpoint
#[derive(Clone)]
pub struct RecipeClient {
    endpoint: String,
    transport: Arc<dyn HttpTransport>,
}

impl RecipeClient {
    /// Creates a new builder for the recipe client
    ///
    /// # Example
    /// ```
    /// use fetch_recipes::RecipeClient;
    ///
    /// let builder = RecipeClient::builder()
    ///     .endpoint("https://example.com/recipes.json");
    /// ```
    pub fn builder() -> RecipeClientBuilder {
        RecipeClientBuilder::default()
    }

    pub(crate) fn new(endpoint: String, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The transport this client issues requests through. Image loaders
    /// built from the same client share its connection pool.
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    /// Fetch the full recipe list.
    ///
    /// Makes exactly one request; the caller decides whether to retry.
    ///
    /// # Errors
    /// - `FetchError::InvalidUrl` if the endpoint is not an http(s) URL
    /// - `FetchError::InvalidResponse` on connection failure or error status
    /// - `FetchError::Decoding` if the body does not match the recipe schema
    pub async fn fetch_recipes(&self) -> Result<RecipeList, FetchError> {
        let url = parse_url(&self.endpoint)?;
        let body = self.transport.get(&url).await.map_err(|e| {
            warn!("Fetching recipes from {} failed: {}", url, e);
            FetchError::from(e)
        })?;

        let list = decode_recipes(&body)?;
        info!("Fetched {} recipes from {}", list.len(), url);
        Ok(list)
    }
}

impl std::fmt::Debug for RecipeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Decode a recipe list body, enforcing unique ids.
///
/// The body and every entry of `recipes` must be JSON objects; serde would
/// otherwise accept arrays positionally.
pub fn decode_recipes(body: &[u8]) -> Result<RecipeList, FetchError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        debug!("Recipe payload is not JSON: {}", e);
        FetchError::from(e)
    })?;
    check_shape(&value)?;

    let list: RecipeList = serde_json::from_value(value).map_err(|e| {
        debug!("Recipe payload rejected: {}", e);
        FetchError::from(e)
    })?;

    if let Some(id) = list.duplicate_id() {
        return Err(FetchError::decoding(
            DecodingErrorKind::DataCorrupted,
            format!("duplicate recipe id `{}`", id),
        ));
    }

    Ok(list)
}

fn check_shape(value: &Value) -> Result<(), FetchError> {
    let Some(body) = value.as_object() else {
        return Err(FetchError::decoding(
            DecodingErrorKind::TypeMismatch,
            format!("expected a JSON object, found {}", json_type(value)),
        ));
    };

    if let Some(Value::Array(recipes)) = body.get("recipes") {
        if let Some((index, entry)) = recipes.iter().enumerate().find(|(_, e)| !e.is_object()) {
            return Err(FetchError::decoding(
                DecodingErrorKind::TypeMismatch,
                format!(
                    "recipes[{}]: expected a JSON object, found {}",
                    index,
                    json_type(entry)
                ),
            ));
        }
    }

    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
