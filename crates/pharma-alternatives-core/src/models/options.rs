//! Per-run options for the allocation resolver.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::normalize_column_name;

/// Option errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
    #[error("Unknown extra column: '{0}' (allowed: presentacionart, numlote, fechavencelote)")]
    UnknownExtraColumn(String),

    #[error("Invalid options JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for OptionsError {
    fn from(e: serde_json::Error) -> Self {
        OptionsError::Json(e.to_string())
    }
}

/// Optional inventory columns that may be carried into the allocation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraColumn {
    /// Presentation / pack description
    PresentacionArt,
    /// Batch number
    NumLote,
    /// Batch expiry date
    FechaVenceLote,
}

impl ExtraColumn {
    pub const ALL: [ExtraColumn; 3] = [
        ExtraColumn::PresentacionArt,
        ExtraColumn::NumLote,
        ExtraColumn::FechaVenceLote,
    ];

    /// Column name in the inventory feed and the output table.
    pub fn column_name(&self) -> &'static str {
        match self {
            ExtraColumn::PresentacionArt => "presentacionart",
            ExtraColumn::NumLote => "numlote",
            ExtraColumn::FechaVenceLote => "fechavencelote",
        }
    }
}

impl fmt::Display for ExtraColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for ExtraColumn {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = normalize_column_name(s);
        ExtraColumn::ALL
            .into_iter()
            .find(|c| c.column_name() == name)
            .ok_or_else(|| OptionsError::UnknownExtraColumn(s.to_string()))
    }
}

/// Options for one allocation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Warehouses to draw substitutes from. Empty means every warehouse.
    pub warehouses: BTreeSet<String>,
    /// Optional passthrough columns, in output order.
    pub extra_columns: Vec<ExtraColumn>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from the raw selections made in the UI.
    pub fn from_selection<W, E>(warehouses: &[W], extra_columns: &[E]) -> Result<Self, OptionsError>
    where
        W: AsRef<str>,
        E: AsRef<str>,
    {
        let mut options = Self::new();
        for warehouse in warehouses {
            options = options.with_warehouse(warehouse.as_ref());
        }
        for column in extra_columns {
            options = options.with_extra_column(column.as_ref().parse()?);
        }
        Ok(options)
    }

    /// Load options from JSON, e.g. `{"warehouses": ["B01"], "extra_columns": ["numlote"]}`.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let mut options: ResolveOptions = serde_json::from_str(json)?;
        options.warehouses = options
            .warehouses
            .iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        let mut seen = BTreeSet::new();
        options.extra_columns.retain(|c| seen.insert(*c));
        Ok(options)
    }

    pub fn with_warehouse(mut self, warehouse: &str) -> Self {
        let warehouse = warehouse.trim();
        if !warehouse.is_empty() {
            self.warehouses.insert(warehouse.to_string());
        }
        self
    }

    /// Add an extra column; repeated columns are kept once.
    pub fn with_extra_column(mut self, column: ExtraColumn) -> Self {
        if !self.extra_columns.contains(&column) {
            self.extra_columns.push(column);
        }
        self
    }

    /// Whether a warehouse passes the filter.
    pub fn accepts_warehouse(&self, warehouse: Option<&str>) -> bool {
        if self.warehouses.is_empty() {
            return true;
        }
        warehouse.is_some_and(|w| self.warehouses.contains(w))
    }
}
