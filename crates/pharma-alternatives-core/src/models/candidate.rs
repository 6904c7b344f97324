//! Candidate lookup output.

use serde::{Deserialize, Serialize};

use crate::table::{Cell, Table};

use super::InventoryRecord;

/// Output columns of the candidate lookup, in order.
pub const CANDIDATE_COLUMNS: [&str; 8] = [
    "cur",
    "codart",
    "nomart",
    "cum",
    "carta",
    "opcion",
    "bodega",
    "unidadespresentacionlote",
];

/// An inventory batch of exactly the article a shortage line asked for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AlternativeCandidate {
    pub cur: String,
    pub codart: String,
    pub nomart: Cell,
    pub cum: Cell,
    pub carta: Cell,
    pub opcion: i64,
    pub bodega: Option<String>,
    pub unidadespresentacionlote: Cell,
}

impl From<&InventoryRecord> for AlternativeCandidate {
    fn from(record: &InventoryRecord) -> Self {
        Self {
            cur: record.cur.clone(),
            codart: record.codart.clone(),
            nomart: record.nomart.clone(),
            cum: record.cum.clone(),
            carta: record.carta.clone(),
            opcion: record.opcion,
            bodega: record.bodega.clone(),
            unidadespresentacionlote: record.unidadespresentacionlote.clone(),
        }
    }
}

impl AlternativeCandidate {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.cur.clone()),
            Cell::Text(self.codart.clone()),
            self.nomart.clone(),
            self.cum.clone(),
            self.carta.clone(),
            Cell::Int(self.opcion),
            self.bodega.clone().into(),
            self.unidadespresentacionlote.clone(),
        ]
    }
}

/// Render candidates as a table for display or export.
pub fn candidates_table(candidates: &[AlternativeCandidate]) -> Table {
    let mut table = Table::new(CANDIDATE_COLUMNS);
    for candidate in candidates {
        table.push_row(candidate.to_row());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_table() {
        let mut record = InventoryRecord::new("C1", "A1", 12.0).with_bodega("B01");
        record.opcion = 2;
        record.nomart = Cell::from("Ibuprofeno 400mg");

        let table = candidates_table(&[AlternativeCandidate::from(&record)]);

        assert_eq!(table.columns(), &CANDIDATE_COLUMNS);
        let row = table.rows().next().unwrap();
        assert_eq!(row.cell("cur"), Cell::from("C1"));
        assert_eq!(row.cell("opcion"), Cell::Int(2));
        assert_eq!(row.cell("bodega"), Cell::from("B01"));
        assert_eq!(row.cell("cum"), Cell::Null);
        assert_eq!(row.cell("unidadespresentacionlote"), Cell::Float(12.0));
    }
}
