//! Required-column validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use thiserror::Error;

use super::{normalize_column_name, Table};

/// Similarity above which a present column is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Which input a schema check ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    MissingItems,
    Inventory,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::MissingItems => write!(f, "missing-items"),
            TableKind::Inventory => write!(f, "inventory"),
        }
    }
}

/// A present column that looks like a misspelling of a required one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSuggestion {
    pub missing: String,
    pub found: String,
}

/// One or more required columns are absent from an input table.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{table} table is missing required column(s): {}{}", .missing.join(", "), describe_suggestions(.suggestions))]
pub struct SchemaError {
    pub table: TableKind,
    pub missing: Vec<String>,
    pub suggestions: Vec<ColumnSuggestion>,
}

fn describe_suggestions(suggestions: &[ColumnSuggestion]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let hints: Vec<String> = suggestions
        .iter()
        .map(|s| format!("'{}' for '{}'", s.found, s.missing))
        .collect();
    format!(" (did you mean {}?)", hints.join(", "))
}

/// Check that every required column exists in the table.
///
/// All absent columns are reported together.
pub fn require_columns(table: &Table, kind: TableKind, required: &[&str]) -> Result<(), SchemaError> {
    let missing: Vec<String> = required
        .iter()
        .map(|c| normalize_column_name(c))
        .filter(|c| !table.has_column(c))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let suggestions = missing
        .iter()
        .filter_map(|m| closest_column(table, m).map(|found| ColumnSuggestion {
            missing: m.clone(),
            found,
        }))
        .collect();

    Err(SchemaError {
        table: kind,
        missing,
        suggestions,
    })
}

fn closest_column(table: &Table, wanted: &str) -> Option<String> {
    table
        .columns()
        .iter()
        .map(|c| (c, jaro_winkler(wanted, c)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(c, _)| c.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_present() {
        let table = Table::new(["CUR", " codart "]);
        assert!(require_columns(&table, TableKind::MissingItems, &["cur", "codart"]).is_ok());
    }

    #[test]
    fn test_reports_every_missing_column() {
        let table = Table::new(["cur"]);
        let err = require_columns(
            &table,
            TableKind::MissingItems,
            &["cur", "codart", "faltante", "embalaje"],
        )
        .unwrap_err();

        assert_eq!(err.table, TableKind::MissingItems);
        assert_eq!(err.missing, vec!["codart", "faltante", "embalaje"]);
        assert!(err.to_string().contains("codart, faltante, embalaje"));
    }

    #[test]
    fn test_suggests_close_spelling() {
        let table = Table::new(["cur", "codart", "faltantes", "embalaje"]);
        let err = require_columns(
            &table,
            TableKind::MissingItems,
            &["cur", "codart", "faltante", "embalaje"],
        )
        .unwrap_err();

        assert_eq!(
            err.suggestions,
            vec![ColumnSuggestion {
                missing: "faltante".into(),
                found: "faltantes".into(),
            }]
        );
        assert!(err.to_string().contains("did you mean 'faltantes' for 'faltante'"));
    }

    #[test]
    fn test_no_suggestion_for_unrelated_columns() {
        let table = Table::new(["xyz"]);
        let err = require_columns(&table, TableKind::Inventory, &["bodega"]).unwrap_err();
        assert!(err.suggestions.is_empty());
        assert_eq!(
            err.to_string(),
            "inventory table is missing required column(s): bodega"
        );
    }
}
