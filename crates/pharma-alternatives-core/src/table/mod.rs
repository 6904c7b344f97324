//! In-memory tabular data exchanged with the sheet readers and writers.
//!
//! Column names are normalized (trimmed, lowercased) once, when a [`Table`]
//! is built. Every lookup downstream uses the normalized lowercase names.

mod cell;
mod schema;

pub use cell::*;
pub use schema::*;

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::warn;

/// Normalize a column header: trim surrounding whitespace and lowercase.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A table of cells with named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    index: HashMap<String, usize>,
}

impl Table {
    /// Create an empty table, normalizing the column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns: Vec<String> = columns
            .into_iter()
            .map(|c| normalize_column_name(c.as_ref()))
            .collect();

        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.contains_key(name) {
                warn!(column = %name, position = i, "duplicate column after normalization; keeping the first");
                continue;
            }
            index.insert(name.clone(), i);
        }

        Self {
            columns,
            rows: Vec::new(),
            index,
        }
    }

    /// Build a table from a JSON array of objects.
    ///
    /// Columns are the union of all keys in first-seen order; absent keys
    /// become null cells.
    pub fn from_json_records(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<Map<String, Value>> = serde_json::from_str(json)?;

        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(&columns);
        for record in records {
            let row = columns
                .iter()
                .map(|c| match record.get(c) {
                    Some(value) => serde_json::from_value(value.clone()),
                    None => Ok(Cell::Null),
                })
                .collect::<Result<Vec<Cell>, _>>()?;
            table.push_row(row);
        }

        Ok(table)
    }

    /// Append a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    /// Builder-style [`Table::push_row`].
    pub fn with_row<I, C>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.push_row(row.into_iter().map(Into::into).collect());
        self
    }

    /// Normalized column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by (normalized) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize_column_name(name)).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |cells| RowRef { table: self, cells })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a JSON array of objects keyed by column name.
    pub fn to_json_records(&self) -> Value {
        let records = self
            .rows
            .iter()
            .map(|cells| {
                let mut map = Map::new();
                for (name, cell) in self.columns.iter().zip(cells) {
                    map.entry(name.clone())
                        .or_insert_with(|| serde_json::to_value(cell).unwrap_or(Value::Null));
                }
                Value::Object(map)
            })
            .collect();
        Value::Array(records)
    }
}

/// Borrowed view of a single row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    /// Cell under a column, `None` if the table has no such column.
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table
            .column_index(column)
            .and_then(|i| self.cells.get(i))
    }

    /// Cell under a column, null if the column is absent.
    pub fn cell(&self, column: &str) -> Cell {
        self.get(column).cloned().unwrap_or_default()
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}
