//! Allocation output: one chosen substitute per missing article.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::{Cell, Table};

use super::ExtraColumn;

/// Fixed output columns of an allocation run, in order.
///
/// Columns whose source is absent from the inputs are left out of the table.
pub const ALLOCATION_COLUMNS: [&str; 11] = [
    "cur",
    "codart",
    "faltante",
    "embalaje",
    "codart_alternativa",
    "opcion_alternativa",
    "embalaje_alternativa",
    "cantidad_necesaria",
    "unidadespresentacionlote",
    "bodega",
    "carta",
];

/// How well the chosen substitute covers the shortage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Stock on the batch is at least the shortage
    Full,
    /// No batch had enough; this one has the most stock
    Partial,
}

/// The substitute chosen for one missing article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationResult {
    pub cur: String,
    pub codart: String,
    pub faltante: Option<f64>,
    pub embalaje: Option<f64>,
    pub codart_alternativa: String,
    pub opcion_alternativa: i64,
    pub embalaje_alternativa: Option<f64>,
    /// Substitute packages needed; `None` when it cannot be computed
    pub cantidad_necesaria: Option<i64>,
    pub unidadespresentacionlote: f64,
    pub bodega: Option<String>,
    pub carta: Cell,
    pub extras: BTreeMap<ExtraColumn, Cell>,
    pub coverage: Coverage,
}

impl AllocationResult {
    /// Value under an output column name.
    pub fn cell(&self, column: &str) -> Cell {
        match column {
            "cur" => Cell::Text(self.cur.clone()),
            "codart" => Cell::Text(self.codart.clone()),
            "faltante" => self.faltante.into(),
            "embalaje" => self.embalaje.into(),
            "codart_alternativa" => Cell::Text(self.codart_alternativa.clone()),
            "opcion_alternativa" => Cell::Int(self.opcion_alternativa),
            "embalaje_alternativa" => self.embalaje_alternativa.into(),
            "cantidad_necesaria" => self.cantidad_necesaria.into(),
            "unidadespresentacionlote" => Cell::Float(self.unidadespresentacionlote),
            "bodega" => self.bodega.clone().into(),
            "carta" => self.carta.clone(),
            other => other
                .parse::<ExtraColumn>()
                .ok()
                .and_then(|c| self.extras.get(&c).cloned())
                .unwrap_or_default(),
        }
    }
}

/// Non-fatal conditions noticed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ResolutionWarning {
    /// The run completed but produced no rows
    EmptyResult,
    /// Some missing articles had no usable substitute
    Unresolved { count: usize },
}

/// Result of an allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocations {
    /// Output columns present for this run
    pub columns: Vec<String>,
    /// One row per resolved missing article, ordered by `codart`: numeric
    /// codes by value ahead of text codes, text codes lexically
    pub rows: Vec<AllocationResult>,
    /// Missing articles for which no substitute survived filtering
    pub unresolved: Vec<String>,
}

impl Allocations {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Row for a missing article, if one was resolved.
    pub fn get(&self, codart: &str) -> Option<&AllocationResult> {
        self.rows.iter().find(|r| r.codart == codart)
    }

    /// Warnings to surface alongside the rows.
    pub fn warnings(&self) -> Vec<ResolutionWarning> {
        let mut warnings = Vec::new();
        if self.rows.is_empty() {
            warnings.push(ResolutionWarning::EmptyResult);
        }
        if !self.unresolved.is_empty() {
            warnings.push(ResolutionWarning::Unresolved {
                count: self.unresolved.len(),
            });
        }
        warnings
    }

    /// Project the rows onto the run's output columns.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(&self.columns);
        for row in &self.rows {
            table.push_row(self.columns.iter().map(|c| row.cell(c)).collect());
        }
        table
    }
}
