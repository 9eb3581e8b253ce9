//! Error types for the FAOSTAT export pipeline.
//!
//! Errors are layered the same way the pipeline is:
//!
//! - [`ConfigError`] - Invalid client configuration
//! - [`RequestError`] - HTTP wrapper failures (status classification, transport, payload)
//! - [`CatalogError`] - Code list retrieval and label resolution
//! - [`DataFetchError`] - Dataset retrieval, tagged with the domain code
//! - [`OutputError`] - Filename templating and CSV writing
//! - [`ExportError`] - Top-level orchestration errors
//!
//! Conversions are provided via `From` so `?` works across layers.
//! [`ErrorKind`] collapses the whole hierarchy into one closed enumeration.

use std::fmt;
use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors raised while building a client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Option name outside the accepted set.
    #[error("Unknown client option '{option}' (expected one of: {expected})")]
    UnknownOption { option: String, expected: String },

    /// Option value that cannot be used.
    #[error("Invalid value '{value}' for option '{option}': {message}")]
    InvalidValue {
        option: String,
        value: String,
        message: String,
    },

    /// Base URL that does not parse or cannot carry path segments.
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Language code not served by FAOSTAT.
    #[error("Unsupported language '{0}' (expected en, fr or es)")]
    UnsupportedLanguage(String),

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors from the HTTP wrapper.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The service answered with its empty-index sentinel.
    #[error("{resource} not found on the FAOSTAT server")]
    ResourceNotFound { resource: String },

    /// Gateway timeout (524) or client-side timeout.
    #[error("Request timed out: {0}")]
    RequestTimeout(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport failure before a status was received.
    #[error("Network error: {0}")]
    Network(String),

    /// Body is not the expected `{"data": [...]}` envelope.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Endpoint URL could not be built from the configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Catalog Errors
// =============================================================================

/// Errors from code list retrieval and label resolution.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Code list request failed.
    #[error("Code list request failed: {0}")]
    Request(#[from] RequestError),

    /// None of the requested labels exist in the code list.
    #[error("No items in domain '{domain}' match the requested labels: {}", .labels.join(", "))]
    NoMatch { domain: String, labels: Vec<String> },

    /// Code list has neither a `label` nor a `description` column.
    #[error("Code list has no '{0}' column")]
    MissingColumn(String),

    /// A matching entry carries a code that is not an integer.
    #[error("Invalid item code {0}")]
    InvalidCode(String),
}

// =============================================================================
// Data Fetch Errors
// =============================================================================

/// Failure while fetching a dataset, tagged with the domain code.
///
/// The underlying [`RequestError`] stays reachable through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("Failed to fetch data for domain '{domain}': {source}")]
pub struct DataFetchError {
    pub domain: String,
    pub source: RequestError,
}

impl DataFetchError {
    pub fn new(domain: impl Into<String>, source: RequestError) -> Self {
        Self {
            domain: domain.into(),
            source,
        }
    }
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while naming or writing the exported file.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Filesystem error.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Template references a placeholder we cannot fill.
    #[error("Unknown placeholder '{{{0}}}' in filename template")]
    UnknownPlaceholder(String),

    /// Temporary file could not be moved into place.
    #[error("Failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

// =============================================================================
// Export Errors (top-level)
// =============================================================================

/// Top-level export errors.
///
/// This is the error type returned by [`crate::export::export_dataset`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// Client configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Label resolution error.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Dataset fetch error.
    #[error(transparent)]
    DataFetch(#[from] DataFetchError),

    /// Output error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Request is unusable before any network call.
    #[error("Invalid export request: {0}")]
    InvalidRequest(String),
}

// =============================================================================
// Error Kinds
// =============================================================================

/// Closed classification of every failure the pipeline can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Http,
    ResourceNotFound,
    RequestTimeout,
    NoMatch,
    DataFetch,
    Network,
    InvalidResponse,
    Output,
    InvalidRequest,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Http => "http",
            ErrorKind::ResourceNotFound => "resource-not-found",
            ErrorKind::RequestTimeout => "request-timeout",
            ErrorKind::NoMatch => "no-match",
            ErrorKind::DataFetch => "data-fetch",
            ErrorKind::Network => "network",
            ErrorKind::InvalidResponse => "invalid-response",
            ErrorKind::Output => "output",
            ErrorKind::InvalidRequest => "invalid-request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            RequestError::RequestTimeout(_) => ErrorKind::RequestTimeout,
            RequestError::Http { .. } => ErrorKind::Http,
            RequestError::Network(_) => ErrorKind::Network,
            RequestError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            RequestError::Config(_) => ErrorKind::Configuration,
        }
    }
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Request(e) => e.kind(),
            CatalogError::NoMatch { .. } => ErrorKind::NoMatch,
            CatalogError::MissingColumn(_) | CatalogError::InvalidCode(_) => {
                ErrorKind::InvalidResponse
            }
        }
    }
}

impl ExportError {
    /// Classify this error.
    ///
    /// Dataset failures report [`ErrorKind::DataFetch`] whatever their cause;
    /// use [`ExportError::root_kind`] to see through the wrapper.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::Config(_) => ErrorKind::Configuration,
            ExportError::Catalog(e) => e.kind(),
            ExportError::DataFetch(_) => ErrorKind::DataFetch,
            ExportError::Output(_) => ErrorKind::Output,
            ExportError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Classification of the innermost request failure, if any.
    pub fn root_kind(&self) -> ErrorKind {
        match self {
            ExportError::DataFetch(e) => e.source.kind(),
            other => other.kind(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for HTTP wrapper operations.
pub type RequestResult<T> = Result<T, RequestError>;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_conversion_chain() {
        // RequestError -> CatalogError -> ExportError
        let request_err = RequestError::ResourceNotFound {
            resource: "XX".into(),
        };
        let catalog_err: CatalogError = request_err.into();
        let export_err: ExportError = catalog_err.into();
        assert!(export_err.to_string().contains("XX"));
        assert_eq!(export_err.kind(), ErrorKind::ResourceNotFound);
    }

    #[test]
    fn test_data_fetch_preserves_source() {
        let err = DataFetchError::new("PP", RequestError::RequestTimeout("HTTP 524".into()));
        assert!(err.to_string().contains("'PP'"));
        let source = err.source().expect("source should be preserved");
        assert!(source.to_string().contains("timed out"));

        let export_err = ExportError::from(err);
        assert_eq!(export_err.kind(), ErrorKind::DataFetch);
        assert_eq!(export_err.root_kind(), ErrorKind::RequestTimeout);
    }

    #[test]
    fn test_no_match_lists_labels() {
        let err = CatalogError::NoMatch {
            domain: "QCL".into(),
            labels: vec!["Raw milk of yak".into(), "Cheese of moose".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("QCL"));
        assert!(msg.contains("Raw milk of yak, Cheese of moose"));
        assert_eq!(err.kind(), ErrorKind::NoMatch);
    }

    #[test]
    fn test_unknown_placeholder_format() {
        let err = OutputError::UnknownPlaceholder("grains".into());
        assert_eq!(
            err.to_string(),
            "Unknown placeholder '{grains}' in filename template"
        );
    }
}
