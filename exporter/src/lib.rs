//! # FAOSTAT export - agricultural statistics to CSV
//!
//! Resolves human-readable item labels against FAOSTAT code lists, fetches
//! production or price datasets for those items and years, and writes them as
//! CSV files.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Labels    │────▶│  Code list  │────▶│ Data fetch  │────▶│  CSV file   │
//! │  + years    │     │ (resolver)  │     │ (normalize) │     │ (templated) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use faostat::{export_dataset, ClientConfig, ExportRequest, FaostatClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = FaostatClient::new(ClientConfig::default()).unwrap();
//!     let request = ExportRequest::production().with_years(vec![2022, 2023]);
//!     let outcome = export_dataset(&client, &request).await.unwrap();
//!     println!("Wrote {} rows to {}", outcome.table.len(), outcome.path.display());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types and [`ErrorKind`]
//! - [`config`] - Immutable client configuration
//! - [`logs`] - Progress logging
//! - [`client`] - HTTP wrapper and response classification
//! - [`records`] - Record normalization into tables
//! - [`catalog`] - Code lists and label resolution
//! - [`fetcher`] - Dataset queries
//! - [`output`] - Filename templates and CSV writing
//! - [`export`] - End-to-end export driver and presets

// Core modules
pub mod error;
pub mod config;
pub mod logs;

// Remote service
pub mod client;
pub mod catalog;
pub mod fetcher;

// Data shaping
pub mod records;

// Output
pub mod output;

// Orchestration
pub mod export;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CatalogError,
    ConfigError,
    DataFetchError,
    ErrorKind,
    ExportError,
    OutputError,
    RequestError,
};

// =============================================================================
// Re-exports - Configuration & client
// =============================================================================

pub use config::{ClientConfig, Language, CLIENT_OPTIONS, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use client::{check_status, extract_data, FaostatClient, RawResponse, EMPTY_INDEX_SENTINEL};

// =============================================================================
// Re-exports - Records
// =============================================================================

pub use records::{normalize, Record, Table};

// =============================================================================
// Re-exports - Catalog & fetcher
// =============================================================================

pub use catalog::{get_code_list, resolve_labels, CodeList, CodeListEntry};
pub use fetcher::{build_query, get_data, probe, DisplayOptions, FilterValue, Filters, Limit};

// =============================================================================
// Re-exports - Output & export
// =============================================================================

pub use output::{render_filename, write_csv, write_csv_to, FilenameContext};
pub use export::{export_dataset, ExportOutcome, ExportRequest};
