//! Filename templates.
//!
//! | Placeholder   | Value                                  |
//! |---------------|----------------------------------------|
//! | `{dataset}`   | domain code, e.g. `QCL`                |
//! | `{describe}`  | `{n_items}items_{n_years}years`        |
//! | `{n_items}`   | number of distinct item labels asked   |
//! | `{n_years}`   | number of years requested              |
//! | `{timestamp}` | local time, `2024-05-01T134502`        |
//!
//! The timestamp layout can be swapped per context, e.g. for
//! [`COMPACT_TIMESTAMP_FORMAT`] (`20240501T134502`).
//!
//! Timestamps carry no colons so the name is valid on every filesystem.

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{OutputError, OutputResult};

/// Colon-free ISO-like timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// Same, without date separators.
pub const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Placeholders understood by [`render_filename`].
pub const PLACEHOLDERS: &[&str] = &["dataset", "describe", "n_items", "n_years", "timestamp"];

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Values substituted into a template.
#[derive(Debug, Clone)]
pub struct FilenameContext {
    pub dataset: String,
    pub item_count: usize,
    pub year_count: usize,
    pub timestamp: DateTime<Local>,
    /// chrono format string for `{timestamp}`
    pub timestamp_format: String,
}

impl FilenameContext {
    /// Context stamped with the current local time.
    pub fn now(dataset: impl Into<String>, item_count: usize, year_count: usize) -> Self {
        Self {
            dataset: dataset.into(),
            item_count,
            year_count,
            timestamp: Local::now(),
            timestamp_format: TIMESTAMP_FORMAT.to_string(),
        }
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "dataset" => Some(self.dataset.clone()),
            "describe" => Some(describe(self.item_count, self.year_count)),
            "n_items" => Some(self.item_count.to_string()),
            "n_years" => Some(self.year_count.to_string()),
            "timestamp" => Some(self.timestamp.format(&self.timestamp_format).to_string()),
            _ => None,
        }
    }
}

/// `3items_5years`
pub fn describe(item_count: usize, year_count: usize) -> String {
    format!("{}items_{}years", item_count, year_count)
}

/// Substitute every placeholder in `template`.
///
/// # Errors
/// [`OutputError::UnknownPlaceholder`] for any name outside [`PLACEHOLDERS`].
pub fn render_filename(template: &str, context: &FilenameContext) -> OutputResult<String> {
    if let Some(unknown) = PLACEHOLDER_RE
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .find(|name| !PLACEHOLDERS.contains(&name.as_str()))
    {
        return Err(OutputError::UnknownPlaceholder(unknown));
    }

    let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &Captures| {
        context.lookup(&caps[1]).unwrap_or_default()
    });
    Ok(rendered.into_owned())
}
