//! Code lists and label resolution.
//!
//! FAOSTAT filters take numeric codes (`item=882`), while people think in
//! labels ("Raw milk of cattle"). A [`CodeList`] holds the full catalog of one
//! classification (`items`, `area`, `year`, ...) for a domain and resolves
//! labels against it.
//!
//! Resolution is a filter over the catalog, not a lookup: codes come back in
//! catalog order, whatever the order of the requested labels.

use serde_json::Value;
use std::collections::HashSet;

use crate::client::FaostatClient;
use crate::error::{CatalogError, CatalogResult, RequestResult};
use crate::logs::{log_info, log_success, log_warning};
use crate::records::{normalize, Table};

/// Code column in every code list.
pub const CODE_COLUMN: &str = "code";

/// Label columns, in order of preference.
pub const LABEL_COLUMNS: [&str; 2] = ["label", "description"];

/// Item classification, the one used for label resolution.
pub const ITEMS_CATEGORY: &str = "items";

/// One classification entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeListEntry {
    pub code: i64,
    pub label: String,
}

/// The full code list of one classification within a domain.
#[derive(Debug, Clone)]
pub struct CodeList {
    domain: String,
    category: String,
    table: Table,
}

impl CodeList {
    /// Fetch a code list (one GET).
    pub async fn fetch(
        client: &FaostatClient,
        category: &str,
        domain: &str,
    ) -> CatalogResult<Self> {
        let table = get_code_list(client, category, domain).await?;
        Ok(Self::from_table(domain, category, table))
    }

    /// Wrap an already normalized table.
    pub fn from_table(domain: impl Into<String>, category: impl Into<String>, table: Table) -> Self {
        Self {
            domain: domain.into(),
            category: category.into(),
            table,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Name of the column holding display labels.
    pub fn label_column(&self) -> CatalogResult<&'static str> {
        label_column(&self.table)
    }

    /// Typed view of every entry.
    pub fn entries(&self) -> CatalogResult<Vec<CodeListEntry>> {
        let label_col = self.label_column()?;
        (0..self.table.len())
            .map(|row| {
                Ok(CodeListEntry {
                    code: parse_code(self.table.value(row, CODE_COLUMN))?,
                    label: display_label(self.table.value(row, label_col)),
                })
            })
            .collect()
    }

    /// Resolve labels to codes. See [`resolve_labels`].
    pub fn resolve_labels<S: AsRef<str>>(&self, wanted: &[S]) -> CatalogResult<Vec<i64>> {
        resolve_labels(&self.table, wanted).map_err(|e| match e {
            CatalogError::NoMatch { labels, .. } => CatalogError::NoMatch {
                domain: self.domain.clone(),
                labels,
            },
            other => other,
        })
    }
}

/// Fetch and normalize a code list.
///
/// Columns start with `code` and the label column (`label`, or `description`
/// when no record carries `label`).
pub async fn get_code_list(
    client: &FaostatClient,
    category: &str,
    domain: &str,
) -> RequestResult<Table> {
    log_info(format!("📖 Fetching '{}' code list for domain {}...", category, domain));

    let url = client.codes_url(category, domain)?;
    let records = client.fetch_records(url, &[]).await?;

    let label = if records.iter().any(|r| r.contains_key(LABEL_COLUMNS[0])) {
        LABEL_COLUMNS[0]
    } else {
        LABEL_COLUMNS[1]
    };

    let table = normalize(records, &[CODE_COLUMN, label]);
    log_success(format!("{} entries in code list", table.len()));
    Ok(table)
}

/// Codes of the entries whose label is one of `wanted`.
///
/// Codes follow catalog order and are deduplicated. Labels that match nothing
/// are reported as a warning.
///
/// # Errors
/// [`CatalogError::NoMatch`] when nothing matches (the domain is left empty;
/// [`CodeList::resolve_labels`] fills it in).
pub fn resolve_labels<S: AsRef<str>>(table: &Table, wanted: &[S]) -> CatalogResult<Vec<i64>> {
    let label_col = label_column(table)?;
    let wanted_set: HashSet<&str> = wanted.iter().map(|s| s.as_ref()).collect();

    let mut codes = Vec::new();
    let mut seen_codes = HashSet::new();
    let mut matched_labels: HashSet<String> = HashSet::new();

    for row in 0..table.len() {
        let label = display_label(table.value(row, label_col));
        if !wanted_set.contains(label.as_str()) {
            continue;
        }
        let code = parse_code(table.value(row, CODE_COLUMN))?;
        if seen_codes.insert(code) {
            codes.push(code);
        }
        matched_labels.insert(label);
    }

    if codes.is_empty() {
        return Err(CatalogError::NoMatch {
            domain: String::new(),
            labels: wanted.iter().map(|s| s.as_ref().to_string()).collect(),
        });
    }

    let unmatched: Vec<&str> = wanted
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !matched_labels.contains(*s))
        .collect();
    if !unmatched.is_empty() {
        log_warning(format!(
            "{} of {} labels not found: {}",
            unmatched.len(),
            wanted_set.len(),
            unmatched.join(", ")
        ));
    }

    log_success(format!("Resolved {} item codes", codes.len()));
    Ok(codes)
}

/// `label` if present, else `description`.
pub fn label_column(table: &Table) -> CatalogResult<&'static str> {
    let has_values = |name: &str| {
        table
            .column_values(name)
            .is_some_and(|mut values| values.any(|v| !v.is_null()))
    };

    LABEL_COLUMNS
        .iter()
        .copied()
        .find(|name| has_values(*name))
        .or_else(|| LABEL_COLUMNS.iter().copied().find(|name| table.has_column(*name)))
        .ok_or_else(|| CatalogError::MissingColumn(LABEL_COLUMNS.join(" or ")))
}

fn display_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn parse_code(value: Option<&Value>) -> CatalogResult<i64> {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| CatalogError::InvalidCode(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| CatalogError::InvalidCode(format!("'{}'", s))),
        Some(other) => Err(CatalogError::InvalidCode(other.to_string())),
        None => Err(CatalogError::MissingColumn(CODE_COLUMN.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{drain, subscribe, Level};
    use crate::records::Record;
    use serde_json::json;

    fn table(values: Vec<Value>, preferred: &[&str]) -> Table {
        let records: Vec<Record> = values
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        normalize(records, preferred)
    }

    fn milk_catalog() -> Table {
        table(
            vec![
                json!({"code": "882", "label": "Raw milk of cattle"}),
                json!({"code": "951", "label": "Raw milk of buffalo"}),
                json!({"code": 1020, "label": "Raw milk of goats"}),
                json!({"code": "15", "label": "Wheat"}),
            ],
            &["code", "label"],
        )
    }

    #[test]
    fn test_resolve_all_matches() {
        let codes = resolve_labels(
            &milk_catalog(),
            &["Raw milk of goats", "Raw milk of cattle"],
        )
        .unwrap();
        // catalog order, not request order
        assert_eq!(codes, vec![882, 1020]);
    }

    #[test]
    fn test_resolve_zero_matches_fails() {
        let err = resolve_labels(&milk_catalog(), &["Raw milk of yak"]).unwrap_err();
        match err {
            CatalogError::NoMatch { labels, .. } => assert_eq!(labels, vec!["Raw milk of yak"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_partial_match_warns() {
        let mut rx = subscribe();
        let codes = resolve_labels(&milk_catalog(), &["Wheat", "Barley"]).unwrap();
        assert_eq!(codes, vec![15]);

        let warned = drain(&mut rx)
            .into_iter()
            .any(|e| e.level == Level::Warning && e.message.contains("Barley"));
        assert!(warned);
    }

    #[test]
    fn test_resolve_deduplicates_codes() {
        let catalog = table(
            vec![
                json!({"code": "882", "label": "Raw milk of cattle"}),
                json!({"code": "882", "label": "Raw milk of cattle"}),
            ],
            &["code", "label"],
        );
        let codes = resolve_labels(&catalog, &["Raw milk of cattle"]).unwrap();
        assert_eq!(codes, vec![882]);
    }

    #[test]
    fn test_description_fallback() {
        let catalog = table(
            vec![json!({"code": "2", "description": "Afghanistan"})],
            &["code", "description"],
        );
        assert_eq!(label_column(&catalog).unwrap(), "description");
        assert_eq!(resolve_labels(&catalog, &["Afghanistan"]).unwrap(), vec![2]);
    }

    #[test]
    fn test_description_used_when_label_column_empty() {
        // normalize keeps a preferred "label" column even if no row has it
        let catalog = table(
            vec![json!({"code": "2", "description": "Afghanistan"})],
            &["code", "label"],
        );
        assert_eq!(label_column(&catalog).unwrap(), "description");
    }

    #[test]
    fn test_missing_label_column() {
        let catalog = table(vec![json!({"code": "2"})], &["code"]);
        assert!(matches!(
            resolve_labels(&catalog, &["Afghanistan"]),
            Err(CatalogError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_invalid_code() {
        let catalog = table(
            vec![json!({"code": "F1232", "label": "Cereals, primary"})],
            &["code", "label"],
        );
        assert!(matches!(
            resolve_labels(&catalog, &["Cereals, primary"]),
            Err(CatalogError::InvalidCode(_))
        ));
    }

    #[test]
    fn test_code_list_entries_and_domain() {
        let list = CodeList::from_table("QCL", ITEMS_CATEGORY, milk_catalog());
        let entries = list.entries().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[0],
            CodeListEntry { code: 882, label: "Raw milk of cattle".into() }
        );

        match list.resolve_labels(&["Rice"]).unwrap_err() {
            CatalogError::NoMatch { domain, .. } => assert_eq!(domain, "QCL"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
