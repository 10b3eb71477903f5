// Error types shared by the catalog, resolver, metadata and download layers

use thiserror::Error;

/// Boxed cause carried by transfer failures, so any transport can report them.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CcdlError {
    /// The catalog document does not have the expected shape.
    #[error("Malformed catalog: {0}")]
    Parse(String),

    #[error("Dependency {product_code} (base version {base_version}) has no matching build")]
    UnresolvedDependency {
        product_code: String,
        base_version: String,
    },

    #[error("Unusable package metadata for build '{build_guid}': {reason}")]
    Metadata { build_guid: String, reason: String },

    #[error("Transfer of {url} failed: {source}")]
    Transfer {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Incomplete transfer of {url}: expected {expected} bytes, got {actual}")]
    IncompleteTransfer {
        url: String,
        expected: u64,
        actual: u64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not write session report: {0}")]
    ReportWrite(#[from] toml::ser::Error),

    #[error("Could not read session report: {0}")]
    ReportRead(#[from] toml::de::Error),
}

impl CcdlError {
    pub fn parse(message: impl Into<String>) -> Self {
        CcdlError::Parse(message.into())
    }

    pub fn metadata(build_guid: &str, reason: impl Into<String>) -> Self {
        CcdlError::Metadata {
            build_guid: build_guid.to_string(),
            reason: reason.into(),
        }
    }

    pub fn transfer(url: &str, source: impl Into<BoxError>) -> Self {
        CcdlError::Transfer {
            url: url.to_string(),
            source: source.into(),
        }
    }

    /// Whether re-running the same pipeline may succeed without any input change.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CcdlError::Transfer { .. }
                | CcdlError::IncompleteTransfer { .. }
                | CcdlError::Http(_)
                | CcdlError::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, CcdlError>;
