//! Dataset retrieval.
//!
//! Builds the `/data/{domain}` query from a [`Filters`] set and
//! [`DisplayOptions`], then normalizes the returned rows.
//!
//! ```text
//! item=882,951&year=2020,2021&show_codes=true&show_flags=true
//!     &show_notes=false&null_values=false&limit=-1&output_type=objects
//! ```

use std::fmt;

use crate::client::FaostatClient;
use crate::error::{DataFetchError, RequestResult};
use crate::logs::{log_info, log_success};
use crate::records::{normalize, Table};

/// Flattened row-per-observation output. The only representation we parse.
pub const OUTPUT_TYPE: &str = "objects";

/// A filter value: one scalar or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FilterValue {
    /// Wire form; lists are comma-joined.
    pub fn to_query_value(&self) -> String {
        match self {
            FilterValue::Scalar(v) => v.clone(),
            FilterValue::List(values) => values.join(","),
        }
    }

    /// Number of values carried
    pub fn len(&self) -> usize {
        match self {
            FilterValue::Scalar(_) => 1,
            FilterValue::List(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Scalar(value.to_string())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Scalar(value.to_string())
    }
}

impl<T: ToString> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for FilterValue {
    fn from(values: &[T]) -> Self {
        FilterValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Ordered filter set (`item`, `year`, `area`, `element`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    entries: Vec<(String, FilterValue)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter; an existing key keeps its position and gets the new value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Row cap for a data request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    /// Sent as `-1`
    #[default]
    Unlimited,
    Rows(u64),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Unlimited => f.write_str("-1"),
            Limit::Rows(n) => write!(f, "{}", n),
        }
    }
}

/// Display flags of a data request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_codes: bool,
    pub show_flags: bool,
    pub show_notes: bool,
    pub null_values: bool,
    pub limit: Limit,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_codes: true,
            show_flags: true,
            show_notes: false,
            null_values: false,
            limit: Limit::Unlimited,
        }
    }
}

impl DisplayOptions {
    pub fn with_notes(mut self, show_notes: bool) -> Self {
        self.show_notes = show_notes;
        self
    }

    pub fn with_null_values(mut self, null_values: bool) -> Self {
        self.null_values = null_values;
        self
    }

    pub fn with_limit(mut self, limit: Limit) -> Self {
        self.limit = limit;
        self
    }
}

/// Query parameters, filters first, then display flags.
pub fn build_query(filters: &Filters, options: &DisplayOptions) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = filters
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_query_value()))
        .collect();

    params.extend([
        ("show_codes".to_string(), options.show_codes.to_string()),
        ("show_flags".to_string(), options.show_flags.to_string()),
        ("show_notes".to_string(), options.show_notes.to_string()),
        ("null_values".to_string(), options.null_values.to_string()),
        ("limit".to_string(), options.limit.to_string()),
        ("output_type".to_string(), OUTPUT_TYPE.to_string()),
    ]);

    params
}

/// Fetch the flattened data table of a domain.
///
/// # Errors
/// Any request failure, wrapped in [`DataFetchError`] with the domain code.
pub async fn get_data(
    client: &FaostatClient,
    domain: &str,
    filters: &Filters,
    options: &DisplayOptions,
) -> Result<Table, DataFetchError> {
    describe_filters(domain, filters);

    let table = fetch_table(client, domain, filters, options)
        .await
        .map_err(|e| DataFetchError::new(domain, e))?;

    log_success(format!(
        "{} rows × {} columns from {}",
        table.len(),
        table.columns().len(),
        domain
    ));
    Ok(table)
}

/// One item, one year, one row: checks a domain serves data before a full fetch.
pub async fn probe(
    client: &FaostatClient,
    domain: &str,
    item: i64,
    year: i32,
) -> Result<Table, DataFetchError> {
    log_info(format!("🔎 Probing {} with item {}, year {}...", domain, item, year));

    let filters = Filters::new().with("item", item).with("year", year);
    let options = DisplayOptions::default().with_limit(Limit::Rows(1));

    let table = fetch_table(client, domain, &filters, &options)
        .await
        .map_err(|e| DataFetchError::new(domain, e))?;

    log_success(format!("Probe succeeded for item {}, year {}", item, year));
    Ok(table)
}

async fn fetch_table(
    client: &FaostatClient,
    domain: &str,
    filters: &Filters,
    options: &DisplayOptions,
) -> RequestResult<Table> {
    let url = client.data_url(domain)?;
    let params = build_query(filters, options);
    let records = client.fetch_records(url, &params).await?;
    Ok(normalize(records, &[] as &[&str]))
}

fn describe_filters(domain: &str, filters: &Filters) {
    let summary: Vec<String> = filters
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v.to_query_value()))
        .collect();
    log_info(format!("📦 Retrieving {} for {}", domain, summary.join("; ")));
}
