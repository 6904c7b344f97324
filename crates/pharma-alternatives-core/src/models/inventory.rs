//! Warehouse inventory feed.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::{require_columns, Cell, SchemaError, Table, TableKind};

use super::ExtraColumn;

/// Inventory columns the candidate lookup projects.
pub const INVENTORY_LOOKUP_COLUMNS: [&str; 8] = [
    "codart",
    "cur",
    "nomart",
    "cum",
    "carta",
    "opcion",
    "bodega",
    "unidadespresentacionlote",
];

/// Inventory columns the allocation run cannot work without.
pub const INVENTORY_ALLOCATION_COLUMNS: [&str; 3] = ["cur", "codart", "unidadespresentacionlote"];

/// One stocked batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryRecord {
    pub codart: String,
    pub cur: String,
    /// Display name
    pub nomart: Cell,
    /// Regulatory identifier, passed through
    pub cum: Cell,
    /// Classification identifier, passed through
    pub carta: Cell,
    /// Preference flag; nulls read as 0
    pub opcion: i64,
    /// Warehouse identifier
    pub bodega: Option<String>,
    /// Units available in this batch, as read
    pub unidadespresentacionlote: Cell,
    /// Units per package of this line
    pub embalaje: Option<f64>,
    pub presentacionart: Cell,
    pub numlote: Cell,
    pub fechavencelote: Cell,
}

impl InventoryRecord {
    /// Create a record with identifiers and stock; everything else null.
    pub fn new(cur: impl Into<String>, codart: impl Into<String>, stock: f64) -> Self {
        Self {
            codart: codart.into(),
            cur: cur.into(),
            nomart: Cell::Null,
            cum: Cell::Null,
            carta: Cell::Null,
            opcion: 0,
            bodega: None,
            unidadespresentacionlote: Cell::Float(stock),
            embalaje: None,
            presentacionart: Cell::Null,
            numlote: Cell::Null,
            fechavencelote: Cell::Null,
        }
    }

    pub fn with_bodega(mut self, bodega: impl Into<String>) -> Self {
        self.bodega = Some(bodega.into());
        self
    }

    pub fn with_embalaje(mut self, embalaje: f64) -> Self {
        self.embalaje = Some(embalaje);
        self
    }

    /// Available units as a number, if readable.
    pub fn stock(&self) -> Option<f64> {
        self.unidadespresentacionlote.as_f64()
    }

    /// Value of an optional passthrough column.
    pub fn extra(&self, column: ExtraColumn) -> &Cell {
        match column {
            ExtraColumn::PresentacionArt => &self.presentacionart,
            ExtraColumn::NumLote => &self.numlote,
            ExtraColumn::FechaVenceLote => &self.fechavencelote,
        }
    }
}

/// Parsed inventory plus the set of columns the feed actually carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    records: Vec<InventoryRecord>,
    columns: BTreeSet<String>,
}

impl Inventory {
    /// Build an inventory from records, treating every known column as present.
    pub fn from_records(records: Vec<InventoryRecord>) -> Self {
        let columns = INVENTORY_LOOKUP_COLUMNS
            .iter()
            .copied()
            .chain(["embalaje"])
            .chain(ExtraColumn::ALL.iter().map(|c| c.column_name()))
            .map(String::from)
            .collect();
        Self { records, columns }
    }

    /// Parse the inventory feed after checking `required` columns.
    ///
    /// Batches without a `cur` or `codart` are skipped.
    pub fn from_table(table: &Table, required: &[&str]) -> Result<Self, SchemaError> {
        require_columns(table, TableKind::Inventory, required)?;

        let mut records = Vec::with_capacity(table.len());
        for (line, row) in table.rows().enumerate() {
            let (Some(cur), Some(codart)) = (row.cell("cur").as_key(), row.cell("codart").as_key())
            else {
                debug!(line, "skipping inventory batch without cur/codart");
                continue;
            };
            records.push(InventoryRecord {
                codart,
                cur,
                nomart: row.cell("nomart"),
                cum: row.cell("cum"),
                carta: row.cell("carta"),
                opcion: row.cell("opcion").as_option_flag(),
                bodega: row.cell("bodega").as_key(),
                unidadespresentacionlote: row.cell("unidadespresentacionlote"),
                embalaje: row.cell("embalaje").as_f64(),
                presentacionart: row.cell("presentacionart"),
                numlote: row.cell("numlote"),
                fechavencelote: row.cell("fechavencelote"),
            });
        }

        Ok(Self {
            records,
            columns: table.columns().iter().cloned().collect(),
        })
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    /// Whether the feed carried a column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct warehouses in first-seen order, for building a filter.
    pub fn warehouses(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter_map(|r| r.bodega.as_deref())
            .filter(|b| seen.insert(*b))
            .map(String::from)
            .collect()
    }
}
