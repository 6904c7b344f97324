//! Shortage lines uploaded by the operator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::table::{require_columns, SchemaError, Table, TableKind};

/// Columns the candidate lookup needs from the shortage upload.
pub const MISSING_LOOKUP_COLUMNS: [&str; 2] = ["cur", "codart"];

/// Columns the allocation run needs from the shortage upload.
pub const MISSING_ALLOCATION_COLUMNS: [&str; 4] = ["cur", "codart", "faltante", "embalaje"];

/// One shortage line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissingItem {
    /// Clinical reference code shared by equivalent products
    pub cur: String,
    /// Article code of the missing product
    pub codart: String,
    /// Shortage quantity, in the missing item's packaging
    pub faltante: Option<f64>,
    /// Units per package of the missing item
    pub embalaje: Option<f64>,
}

impl MissingItem {
    /// Create a shortage line with identifiers only.
    pub fn new(cur: impl Into<String>, codart: impl Into<String>) -> Self {
        Self {
            cur: cur.into(),
            codart: codart.into(),
            faltante: None,
            embalaje: None,
        }
    }

    /// Attach the shortage quantity and packaging multiplier.
    pub fn with_shortage(mut self, faltante: f64, embalaje: f64) -> Self {
        self.faltante = Some(faltante);
        self.embalaje = Some(embalaje);
        self
    }

    /// Parse shortage lines from a table after checking `required` columns.
    ///
    /// Lines without a `cur` or `codart` cannot be matched and are skipped.
    pub fn from_table(table: &Table, required: &[&str]) -> Result<Vec<Self>, SchemaError> {
        require_columns(table, TableKind::MissingItems, required)?;

        let mut items = Vec::with_capacity(table.len());
        for (line, row) in table.rows().enumerate() {
            let (Some(cur), Some(codart)) = (row.cell("cur").as_key(), row.cell("codart").as_key())
            else {
                debug!(line, "skipping shortage line without cur/codart");
                continue;
            };
            items.push(MissingItem {
                cur,
                codart,
                faltante: row.cell("faltante").as_f64(),
                embalaje: row.cell("embalaje").as_f64(),
            });
        }

        Ok(items)
    }
}
