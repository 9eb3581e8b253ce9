//! Record normalization.
//!
//! FAOSTAT returns lists of JSON objects whose key sets vary from row to row
//! (flags and notes only appear when set, some domains add unit columns, ...).
//! [`normalize`] reconciles them into a [`Table`] where every row has every
//! column.
//!
//! # Column order
//!
//! ```text
//! preferred = [a]
//! records   = {b:1, a:2}, {c:3}
//!
//!   a    | b    | c
//!   -----+------+-----
//!   2    | 1    | null
//!   null | null | 3
//! ```
//!
//! Preferred columns come first, in the given order, even when no row has
//! them. Remaining keys follow in first-seen order.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// One observation as returned by the API.
pub type Record = Map<String, Value>;

/// Records coerced into a fixed column set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at `row` for column `name`.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All cells of one column, top to bottom.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[col]))
    }

    /// Rebuild each row as a record (missing keys come back as `null`).
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.rows.iter().map(|row| {
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
    }
}

/// Normalize heterogeneous records into a [`Table`].
///
/// Pure: touches neither network nor filesystem.
pub fn normalize<S: AsRef<str>>(records: Vec<Record>, preferred: &[S]) -> Table {
    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut add_column = |name: &str, columns: &mut Vec<String>| {
        if !index.contains_key(name) {
            index.insert(name.to_string(), columns.len());
            columns.push(name.to_string());
        }
    };

    for name in preferred {
        add_column(name.as_ref(), &mut columns);
    }
    for record in &records {
        for key in record.keys() {
            add_column(key, &mut columns);
        }
    }

    let rows = records
        .into_iter()
        .map(|record| {
            let mut row = vec![Value::Null; columns.len()];
            for (key, value) in record {
                if let Some(&col) = index.get(&key) {
                    row[col] = value;
                }
            }
            row
        })
        .collect();

    Table { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                other => panic!("not an object: {other}"),
            })
            .collect()
    }

    #[test]
    fn test_preferred_then_first_seen() {
        let input = records(vec![json!({"b": 1, "a": 2}), json!({"c": 3})]);
        let table = normalize(input, &["a"]);

        assert_eq!(table.columns(), &["a", "b", "c"]);
        assert_eq!(table.rows()[0], vec![json!(2), json!(1), Value::Null]);
        assert_eq!(table.rows()[1], vec![Value::Null, Value::Null, json!(3)]);
    }

    #[test]
    fn test_every_row_has_every_column() {
        let input = records(vec![
            json!({"Area": "France", "Year": 2020, "Value": 1.5}),
            json!({"Area": "Chad", "Flag": "E"}),
            json!({"Note": "provisional", "Year": 2021}),
        ]);
        let table = normalize(input, &[] as &[&str]);

        assert_eq!(table.columns(), &["Area", "Year", "Value", "Flag", "Note"]);
        for row in table.rows() {
            assert_eq!(row.len(), table.columns().len());
        }
    }

    #[test]
    fn test_no_value_lost() {
        let original = records(vec![
            json!({"code": "882", "label": "Raw milk of cattle"}),
            json!({"code": "951", "label": "Raw milk of buffalo", "aggregate_type": "0"}),
        ]);
        let table = normalize(original.clone(), &["code", "label"]);

        for (rebuilt, source) in table.records().zip(&original) {
            for (key, value) in source {
                assert_eq!(rebuilt.get(key), Some(value));
            }
        }
    }

    #[test]
    fn test_preferred_column_kept_when_absent() {
        let input = records(vec![json!({"code": 1, "description": "Wheat"})]);
        let table = normalize(input, &["code", "label"]);

        assert_eq!(table.columns(), &["code", "label", "description"]);
        assert_eq!(table.value(0, "label"), Some(&Value::Null));
    }

    #[test]
    fn test_duplicate_preferred_ignored() {
        let input = records(vec![json!({"x": 1})]);
        let table = normalize(input, &["x", "x"]);
        assert_eq!(table.columns(), &["x"]);
    }

    #[test]
    fn test_empty_input() {
        let table = normalize(Vec::new(), &["code"]);
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["code"]);
    }

    #[test]
    fn test_column_values() {
        let input = records(vec![json!({"Year": 2020}), json!({"Year": 2021})]);
        let table = normalize(input, &[] as &[&str]);
        let years: Vec<_> = table.column_values("Year").unwrap().cloned().collect();
        assert_eq!(years, vec![json!(2020), json!(2021)]);
        assert!(table.column_values("Month").is_none());
    }
}
