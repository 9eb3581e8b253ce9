//! Export driver: labels in, CSV file out.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Code list   │───▶│   (Probe)    │───▶│  Data fetch  │───▶│  CSV writer  │
//! │ labels→codes │    │ 1 item/year  │    │ items×years  │    │ tmp + rename │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Each step runs once, in order; the first failure aborts the export and no
//! file is written.
//!
//! # Example
//!
//! ```rust,ignore
//! use faostat::{export_dataset, ClientConfig, ExportRequest, FaostatClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FaostatClient::new(ClientConfig::default())?;
//!     let outcome = export_dataset(&client, &ExportRequest::prices()).await?;
//!     println!("{}", outcome.path.display());
//!     Ok(())
//! }
//! ```

pub mod presets;

use std::collections::HashSet;
use std::path::PathBuf;

use crate::catalog::{CodeList, ITEMS_CATEGORY};
use crate::client::FaostatClient;
use crate::error::{ExportError, ExportResult};
use crate::fetcher::{get_data, probe, DisplayOptions, Filters};
use crate::logs::{log_info, log_success};
use crate::output::{
    render_filename, write_csv, FilenameContext, COMPACT_TIMESTAMP_FORMAT, TIMESTAMP_FORMAT,
};
use crate::records::Table;

use presets::{
    year_range, PRICES_DOMAIN, PRICES_TEMPLATE, PRICE_ITEMS, PRICE_YEARS, PRODUCTION_DOMAIN,
    PRODUCTION_ITEMS, PRODUCTION_TEMPLATE, PRODUCTION_YEARS,
};

/// Everything needed for one export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Domain code, e.g. `QCL`
    pub domain: String,
    /// Code list the labels belong to
    pub category: String,
    /// Item labels to resolve
    pub labels: Vec<String>,
    pub years: Vec<i32>,
    /// See [`crate::output::filename`] for placeholders
    pub filename_template: String,
    /// chrono format for `{timestamp}`
    pub timestamp_format: String,
    pub output_dir: PathBuf,
    pub display: DisplayOptions,
    /// Run a single-row request before the full fetch
    pub probe: bool,
}

impl ExportRequest {
    pub fn new<L, S>(domain: impl Into<String>, labels: L, years: Vec<i32>) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into(),
            category: ITEMS_CATEGORY.to_string(),
            labels: labels.into_iter().map(Into::into).collect(),
            years,
            filename_template: "faostat_{dataset}_{describe}_{timestamp}.csv".to_string(),
            timestamp_format: TIMESTAMP_FORMAT.to_string(),
            output_dir: PathBuf::from("."),
            display: DisplayOptions::default(),
            probe: false,
        }
    }

    /// Milk and dairy production volumes, 2014–2023.
    pub fn production() -> Self {
        Self::new(
            PRODUCTION_DOMAIN,
            PRODUCTION_ITEMS.iter().copied(),
            year_range(PRODUCTION_YEARS),
        )
        .with_template(PRODUCTION_TEMPLATE)
        .with_display(DisplayOptions::default().with_notes(true).with_null_values(true))
    }

    /// Raw milk producer prices, 2015–2024, probed before fetching.
    pub fn prices() -> Self {
        Self::new(PRICES_DOMAIN, PRICE_ITEMS.iter().copied(), year_range(PRICE_YEARS))
            .with_template(PRICES_TEMPLATE)
            .with_timestamp_format(COMPACT_TIMESTAMP_FORMAT)
            .with_probe(true)
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_labels<L, S>(mut self, labels: L) -> Self
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_years(mut self, years: Vec<i32>) -> Self {
        self.years = years;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = template.into();
        self
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    /// Distinct labels asked for; this is the item count in file names,
    /// whether or not every label resolved.
    pub fn item_count(&self) -> usize {
        self.labels.iter().collect::<HashSet<_>>().len()
    }

    fn validate(&self) -> ExportResult<()> {
        if self.domain.trim().is_empty() {
            return Err(ExportError::InvalidRequest("domain code is empty".into()));
        }
        if self.labels.is_empty() {
            return Err(ExportError::InvalidRequest("no item labels given".into()));
        }
        if self.years.is_empty() {
            return Err(ExportError::InvalidRequest("no years given".into()));
        }
        Ok(())
    }
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Path of the written CSV
    pub path: PathBuf,
    /// Item codes the labels resolved to
    pub codes: Vec<i64>,
    pub table: Table,
}

/// Resolve, fetch, and write one dataset.
///
/// # Errors
/// - [`ExportError::InvalidRequest`] before any request is made
/// - [`crate::error::CatalogError::NoMatch`] if no label resolves
/// - [`crate::error::DataFetchError`] if the probe or the fetch fails
/// - [`crate::error::OutputError`] for template or write failures
pub async fn export_dataset(
    client: &FaostatClient,
    request: &ExportRequest,
) -> ExportResult<ExportOutcome> {
    request.validate()?;

    // Step 1: labels → codes
    let catalog = CodeList::fetch(client, &request.category, &request.domain).await?;
    let codes = catalog.resolve_labels(request.labels.as_slice())?;

    // Step 2: optional availability check
    if request.probe {
        probe(client, &request.domain, codes[0], request.years[0]).await?;
    }

    // Step 3: full fetch
    let filters = Filters::new()
        .with("item", codes.clone())
        .with("year", request.years.clone());
    let table = get_data(client, &request.domain, &filters, &request.display).await?;

    // Step 4: name and write
    let context = FilenameContext::now(&request.domain, request.item_count(), request.years.len())
        .with_timestamp_format(request.timestamp_format.as_str());
    let filename = render_filename(&request.filename_template, &context)?;
    let path = request.output_dir.join(filename);

    log_info(format!("💾 Writing {} rows to {}", table.len(), path.display()));
    let path = write_csv(&table, &path)?;
    log_success(format!("Saved output to {}", path.display()));

    Ok(ExportOutcome { path, codes, table })
}
