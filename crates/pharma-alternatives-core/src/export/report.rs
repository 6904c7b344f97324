//! Allocation run report with a reproducible fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{AllocationResult, Allocations, ResolutionWarning};

use super::{table_to_csv, table_to_json};

/// Report for one allocation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// Output columns, in order
    pub columns: Vec<String>,
    /// Chosen substitutes
    pub rows: Vec<AllocationResult>,
}

/// Allocation report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Unique id of this run
    pub run_id: String,
    /// Generation timestamp
    pub generated_at: String,
    /// Number of rows
    pub row_count: usize,
    /// Missing articles with no usable substitute
    pub unresolved: Vec<String>,
    /// Non-fatal conditions
    pub warnings: Vec<ResolutionWarning>,
    /// SHA-256 of the result table; equal inputs give equal fingerprints
    pub fingerprint: String,
}

impl AllocationReport {
    /// Build a report from an allocation run.
    pub fn from_allocations(allocations: &Allocations) -> Result<Self, serde_json::Error> {
        Ok(Self {
            metadata: ReportMetadata {
                run_id: uuid::Uuid::new_v4().to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                row_count: allocations.len(),
                unresolved: allocations.unresolved.clone(),
                warnings: allocations.warnings(),
                fingerprint: fingerprint(allocations)?,
            },
            columns: allocations.columns.clone(),
            rows: allocations.rows.clone(),
        })
    }

    fn allocations(&self) -> Allocations {
        Allocations {
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            unresolved: self.metadata.unresolved.clone(),
        }
    }

    /// Export the whole report to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export the result table to CSV.
    pub fn to_csv(&self) -> String {
        table_to_csv(&self.allocations().to_table())
    }

    /// Export the result table to JSON records.
    pub fn table_json(&self) -> Result<String, serde_json::Error> {
        table_to_json(&self.allocations().to_table())
    }
}

/// Fingerprint of the projected result table.
pub fn fingerprint(allocations: &Allocations) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_vec(&allocations.to_table().to_json_records())?;
    Ok(hash_data(&payload))
}

/// SHA-256 hex digest.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Inventory, InventoryRecord, MissingItem, ResolveOptions};
    use crate::resolver::resolve;

    fn run() -> Allocations {
        let inventory = Inventory::from_records(vec![
            InventoryRecord::new("C1", "A2", 5.0).with_embalaje(2.0).with_bodega("B01"),
            InventoryRecord::new("C1", "A3", 20.0).with_embalaje(1.0).with_bodega("B02"),
        ]);
        let missing = vec![
            MissingItem::new("C1", "A1").with_shortage(10.0, 1.0),
            MissingItem::new("C9", "A9").with_shortage(1.0, 1.0),
        ];
        resolve(&missing, &inventory, &ResolveOptions::new())
    }

    #[test]
    fn test_report_metadata() {
        let report = AllocationReport::from_allocations(&run()).unwrap();

        assert_eq!(report.metadata.row_count, 1);
        assert_eq!(report.metadata.unresolved, vec!["A9"]);
        assert_eq!(
            report.metadata.warnings,
            vec![ResolutionWarning::Unresolved { count: 1 }]
        );
        assert_eq!(report.metadata.fingerprint.len(), 64);
        assert!(uuid::Uuid::parse_str(&report.metadata.run_id).is_ok());
    }

    #[test]
    fn test_fingerprint_is_reproducible() {
        let first = AllocationReport::from_allocations(&run()).unwrap();
        let second = AllocationReport::from_allocations(&run()).unwrap();

        assert_ne!(first.metadata.run_id, second.metadata.run_id);
        assert_eq!(first.metadata.fingerprint, second.metadata.fingerprint);
    }

    #[test]
    fn test_report_csv() {
        let report = AllocationReport::from_allocations(&run()).unwrap();
        let csv = report.to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("cur,codart,faltante,embalaje,codart_alternativa"));
        assert!(lines[1].starts_with("C1,A1,10,1,A3,"));
    }

    #[test]
    fn test_report_json_roundtrip() {
        let report = AllocationReport::from_allocations(&run()).unwrap();
        let json = report.to_json().unwrap();
        let parsed: AllocationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.rows, report.rows);
    }

    #[test]
    fn test_hash_data() {
        assert_eq!(
            hash_data(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
