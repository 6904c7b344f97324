//! Pharma Alternatives Core Library
//!
//! Matches pharmacy shortage lines against a warehouse inventory feed and
//! picks substitute products that can cover each shortage.
//!
//! # Architecture
//!
//! ```text
//!   Shortage upload            Inventory feed
//!         │                          │
//!         └──────────┬───────────────┘
//!                    ▼
//!          Table (columns normalized once)
//!                    │
//!          Schema validation (SchemaError)
//!                    │
//!        ┌───────────┴────────────┐
//!        ▼                        ▼
//!  Candidate lookup         Allocation run
//!  join (cur, codart)       join cur → warehouse/stock filter
//!  dedupe                   → per-article selection + quantity
//!        │                        │
//!        └───────────┬────────────┘
//!                    ▼
//!            CSV / JSON export
//! ```
//!
//! # Modules
//!
//! - [`table`]: Cells, tables, column normalization and schema checks
//! - [`models`]: Domain types (MissingItem, InventoryRecord, AllocationResult, etc.)
//! - [`resolver`]: Candidate lookup, allocation run and substitute selection
//! - [`export`]: CSV/JSON rendering and run reports

pub mod export;
pub mod models;
pub mod resolver;
pub mod table;

// Re-export commonly used types
pub use export::AllocationReport;
pub use models::{
    AllocationResult, Allocations, AlternativeCandidate, Coverage, ExtraColumn, Inventory,
    InventoryRecord, MissingItem, ResolutionWarning, ResolveOptions,
};
pub use resolver::{AlternativeResolver, ResolverError};
pub use table::{Cell, SchemaError, Table};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum AlternativesError {
    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<SchemaError> for AlternativesError {
    fn from(e: SchemaError) -> Self {
        AlternativesError::SchemaError(e.to_string())
    }
}

impl From<models::OptionsError> for AlternativesError {
    fn from(e: models::OptionsError) -> Self {
        AlternativesError::InvalidInput(e.to_string())
    }
}

impl From<ResolverError> for AlternativesError {
    fn from(e: ResolverError) -> Self {
        match e {
            ResolverError::Schema(e) => e.into(),
            ResolverError::Options(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for AlternativesError {
    fn from(e: serde_json::Error) -> Self {
        AlternativesError::SerializationError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Load the inventory feed from a JSON array of records.
#[uniffi::export]
pub fn open_inventory_json(json: String) -> Result<Arc<AlternativesEngine>, AlternativesError> {
    let inventory = Table::from_json_records(&json)?;
    Ok(Arc::new(AlternativesEngine { inventory }))
}

/// Optional columns that may be added to an allocation export.
#[uniffi::export]
pub fn allowed_extra_columns() -> Vec<String> {
    ExtraColumn::ALL
        .iter()
        .map(|c| c.column_name().to_string())
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Inventory snapshot shared across lookups. Immutable once loaded.
#[derive(uniffi::Object)]
pub struct AlternativesEngine {
    inventory: Table,
}

#[uniffi::export]
impl AlternativesEngine {
    /// Distinct warehouses, for the warehouse filter.
    pub fn warehouses(&self) -> Result<Vec<String>, AlternativesError> {
        Ok(AlternativeResolver::new(&self.inventory).warehouses()?)
    }

    /// Stocked batches of each requested article.
    pub fn find_candidates(&self, missing_json: String) -> Result<Vec<FfiCandidate>, AlternativesError> {
        let candidates = self.candidates(&missing_json)?;
        Ok(candidates.into_iter().map(Into::into).collect())
    }

    /// One substitute per missing article.
    pub fn resolve(
        &self,
        missing_json: String,
        warehouses: Vec<String>,
        extra_columns: Vec<String>,
    ) -> Result<FfiAllocationRun, AlternativesError> {
        let allocations = self.allocations(&missing_json, &warehouses, &extra_columns)?;
        let fingerprint = export::fingerprint(&allocations)?;
        Ok(FfiAllocationRun {
            rows: allocations.rows.into_iter().map(Into::into).collect(),
            unresolved: allocations.unresolved,
            fingerprint,
        })
    }

    /// Candidate lookup as CSV.
    pub fn export_candidates_csv(&self, missing_json: String) -> Result<String, AlternativesError> {
        let candidates = self.candidates(&missing_json)?;
        Ok(export::table_to_csv(&models::candidates_table(&candidates)))
    }

    /// Allocation run as CSV.
    pub fn export_allocations_csv(
        &self,
        missing_json: String,
        warehouses: Vec<String>,
        extra_columns: Vec<String>,
    ) -> Result<String, AlternativesError> {
        let allocations = self.allocations(&missing_json, &warehouses, &extra_columns)?;
        Ok(AllocationReport::from_allocations(&allocations)?.to_csv())
    }

    /// Allocation run as a JSON report with metadata.
    pub fn export_allocations_report(
        &self,
        missing_json: String,
        warehouses: Vec<String>,
        extra_columns: Vec<String>,
    ) -> Result<String, AlternativesError> {
        let allocations = self.allocations(&missing_json, &warehouses, &extra_columns)?;
        Ok(AllocationReport::from_allocations(&allocations)?.to_json()?)
    }
}

impl AlternativesEngine {
    fn candidates(&self, missing_json: &str) -> Result<Vec<AlternativeCandidate>, AlternativesError> {
        let missing = Table::from_json_records(missing_json)?;
        Ok(AlternativeResolver::new(&self.inventory).find_candidates(&missing)?)
    }

    fn allocations(
        &self,
        missing_json: &str,
        warehouses: &[String],
        extra_columns: &[String],
    ) -> Result<Allocations, AlternativesError> {
        let missing = Table::from_json_records(missing_json)?;
        Ok(AlternativeResolver::new(&self.inventory).resolve_selection(
            &missing,
            warehouses,
            extra_columns,
        )?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

fn cell_text(cell: &Cell) -> Option<String> {
    (!cell.is_null()).then(|| cell.to_string())
}

/// FFI-safe candidate row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCandidate {
    pub cur: String,
    pub codart: String,
    pub nomart: Option<String>,
    pub cum: Option<String>,
    pub carta: Option<String>,
    pub opcion: i64,
    pub bodega: Option<String>,
    pub unidadespresentacionlote: Option<String>,
}

impl From<AlternativeCandidate> for FfiCandidate {
    fn from(candidate: AlternativeCandidate) -> Self {
        Self {
            nomart: cell_text(&candidate.nomart),
            cum: cell_text(&candidate.cum),
            carta: cell_text(&candidate.carta),
            unidadespresentacionlote: cell_text(&candidate.unidadespresentacionlote),
            cur: candidate.cur,
            codart: candidate.codart,
            opcion: candidate.opcion,
            bodega: candidate.bodega,
        }
    }
}

/// FFI-safe allocation row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAllocation {
    pub cur: String,
    pub codart: String,
    pub faltante: Option<f64>,
    pub embalaje: Option<f64>,
    pub codart_alternativa: String,
    pub opcion_alternativa: i64,
    pub embalaje_alternativa: Option<f64>,
    pub cantidad_necesaria: Option<i64>,
    pub unidadespresentacionlote: f64,
    pub bodega: Option<String>,
    pub carta: Option<String>,
    pub extras: HashMap<String, String>,
    pub fully_covered: bool,
}

impl From<AllocationResult> for FfiAllocation {
    fn from(row: AllocationResult) -> Self {
        Self {
            carta: cell_text(&row.carta),
            extras: row
                .extras
                .iter()
                .filter_map(|(column, cell)| cell_text(cell).map(|v| (column.to_string(), v)))
                .collect(),
            fully_covered: row.coverage == Coverage::Full,
            cur: row.cur,
            codart: row.codart,
            faltante: row.faltante,
            embalaje: row.embalaje,
            codart_alternativa: row.codart_alternativa,
            opcion_alternativa: row.opcion_alternativa,
            embalaje_alternativa: row.embalaje_alternativa,
            cantidad_necesaria: row.cantidad_necesaria,
            unidadespresentacionlote: row.unidadespresentacionlote,
            bodega: row.bodega,
        }
    }
}

/// FFI-safe allocation run result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAllocationRun {
    pub rows: Vec<FfiAllocation>,
    pub unresolved: Vec<String>,
    pub fingerprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVENTORY: &str = r#"[
        {"CODART": "A2", "CUR": "C1", "NOMART": "Enalapril 20mg x10", "CUM": 55, "CARTA": "K",
         "OPCION": null, "BODEGA": "B01", "UNIDADESPRESENTACIONLOTE": 5, "EMBALAJE": 2},
        {"CODART": "A3", "CUR": "C1", "NOMART": "Enalapril 20mg x30", "CUM": 56, "CARTA": "K",
         "OPCION": 1, "BODEGA": "B02", "UNIDADESPRESENTACIONLOTE": 20, "EMBALAJE": 1,
         "NUMLOTE": "L-77"}
    ]"#;

    #[test]
    fn test_engine_resolve() {
        let engine = open_inventory_json(INVENTORY.into()).unwrap();
        let missing = r#"[{"cur": "C1", "codart": "A1", "faltante": 10, "embalaje": 1}]"#;

        let run = engine
            .resolve(missing.into(), vec![], vec!["numlote".into()])
            .unwrap();

        assert_eq!(run.rows.len(), 1);
        let row = &run.rows[0];
        assert_eq!(row.codart_alternativa, "A3");
        assert_eq!(row.cantidad_necesaria, Some(10));
        assert!(row.fully_covered);
        assert_eq!(row.extras.get("numlote").map(String::as_str), Some("L-77"));
        assert!(run.unresolved.is_empty());
    }

    #[test]
    fn test_engine_candidates_and_warehouses() {
        let engine = open_inventory_json(INVENTORY.into()).unwrap();
        assert_eq!(engine.warehouses().unwrap(), vec!["B01", "B02"]);

        let candidates = engine
            .find_candidates(r#"[{"cur": "C1", "codart": "A2"}]"#.into())
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].opcion, 0);
        assert_eq!(candidates[0].cum.as_deref(), Some("55"));
    }

    #[test]
    fn test_engine_errors() {
        assert!(matches!(
            open_inventory_json("not json".into()),
            Err(AlternativesError::SerializationError(_))
        ));

        let engine = open_inventory_json(INVENTORY.into()).unwrap();
        let err = engine
            .resolve(r#"[{"cur": "C1", "codart": "A1"}]"#.into(), vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, AlternativesError::SchemaError(_)));

        let err = engine
            .resolve(
                r#"[{"cur": "C1", "codart": "A1", "faltante": 1, "embalaje": 1}]"#.into(),
                vec![],
                vec!["precio".into()],
            )
            .unwrap_err();
        assert!(matches!(err, AlternativesError::InvalidInput(_)));
    }

    #[test]
    fn test_engine_exports() {
        let engine = open_inventory_json(INVENTORY.into()).unwrap();
        let missing = r#"[{"cur": "C1", "codart": "A1", "faltante": 10, "embalaje": 1}]"#;

        let csv = engine
            .export_allocations_csv(missing.into(), vec!["B01".into()], vec![])
            .unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("C1,A1,10,1,A2,"));

        let report = engine
            .export_allocations_report(missing.into(), vec![], vec![])
            .unwrap();
        assert!(report.contains("\"fingerprint\""));

        let candidates_csv = engine
            .export_candidates_csv(r#"[{"cur": "C1", "codart": "A3"}]"#.into())
            .unwrap();
        assert_eq!(candidates_csv.lines().count(), 2);
    }

    #[test]
    fn test_allowed_extra_columns() {
        assert_eq!(
            allowed_extra_columns(),
            vec!["presentacionart", "numlote", "fechavencelote"]
        );
    }
}
