use std::fmt;

use serde_json::error::Category;
use thiserror::Error;

use crate::transport::TransportError;

/// Why a recipe payload could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingErrorKind {
    /// A required field was present but `null`
    ValueNotFound,
    /// The body is not valid JSON, is truncated, or breaks a list invariant
    DataCorrupted,
    /// A field had the wrong JSON type
    TypeMismatch,
    /// A required field was missing
    KeyNotFound,
}

impl fmt::Display for DecodingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodingErrorKind::ValueNotFound => "value not found",
            DecodingErrorKind::DataCorrupted => "data corrupted",
            DecodingErrorKind::TypeMismatch => "type mismatch",
            DecodingErrorKind::KeyNotFound => "key not found",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while fetching the recipe list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The configured endpoint is not a usable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request failed or the server answered with an error status
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The body arrived but did not match the recipe schema
    #[error("Decoding error ({kind}): {message}")]
    Decoding {
        kind: DecodingErrorKind,
        message: String,
    },

    /// Anything else
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl FetchError {
    pub(crate) fn decoding(kind: DecodingErrorKind, message: impl Into<String>) -> Self {
        FetchError::Decoding {
            kind,
            message: message.into(),
        }
    }

    /// Stable numeric code shown to users for support triage.
    pub fn code(&self) -> u8 {
        match self {
            FetchError::InvalidUrl(_) => 1,
            FetchError::InvalidResponse(_) => 2,
            FetchError::Decoding { kind, .. } => match kind {
                DecodingErrorKind::ValueNotFound => 3,
                DecodingErrorKind::DataCorrupted => 4,
                DecodingErrorKind::TypeMismatch => 5,
                DecodingErrorKind::KeyNotFound => 6,
            },
            FetchError::Unknown(_) => 7,
        }
    }

    /// Message suitable for an error alert, including the support code.
    pub fn user_message(&self) -> String {
        support_message(self.code())
    }

    pub fn is_decoding(&self) -> bool {
        matches!(self, FetchError::Decoding { .. })
    }
}

/// Alert text for a support code. Codes outside 1-6 read as unknown (7).
pub fn support_message(code: u8) -> String {
    let (title, code) = match code {
        1 => ("Invalid URL", 1),
        2 => ("Invalid Response", 2),
        3..=6 => ("Decoding Error", code),
        _ => ("Unknown Error", 7),
    };
    format!(
        "{}, please contact our support with error code {}",
        title, code
    )
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        let kind = match err.classify() {
            Category::Syntax | Category::Eof => DecodingErrorKind::DataCorrupted,
            Category::Data => classify_data_error(&message),
            Category::Io => return FetchError::Unknown(message),
        };
        FetchError::Decoding { kind, message }
    }
}

// serde_json reports schema violations as free-form text, so the category
// has to be recovered from the message prefix.
fn classify_data_error(message: &str) -> DecodingErrorKind {
    if message.starts_with("missing field") {
        DecodingErrorKind::KeyNotFound
    } else if message.starts_with("invalid type: null") {
        DecodingErrorKind::ValueNotFound
    } else if message.starts_with("invalid type") {
        DecodingErrorKind::TypeMismatch
    } else {
        DecodingErrorKind::DataCorrupted
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidUrl(url) => FetchError::InvalidUrl(url),
            other => FetchError::InvalidResponse(other.to_string()),
        }
    }
}

/// Errors from loading a single recipe image
#[derive(Error, Debug)]
pub enum ImageError {
    /// The image bytes could not be fetched
    #[error("Failed to fetch image: {0}")]
    Transport(#[from] TransportError),

    /// The bytes were fetched but are not a supported image
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The blocking decode task did not complete
    #[error("Decode task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The loader's concurrency limiter was closed
    #[error("Image loader is shut down")]
    Closed(#[from] tokio::sync::AcquireError),
}
