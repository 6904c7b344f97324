//! Alternative resolution engine.
//!
//! Two pipelines over the same inventory feed:
//! - Candidate lookup: Shortages → (cur, codart) join → deduplicated batches
//! - Allocation: Shortages → cur join → warehouse/stock filter → per-article selection

mod allocation;
mod candidates;
mod selection;

pub use allocation::*;
pub use candidates::*;
pub use selection::*;

use crate::models::{
    AlternativeCandidate, Allocations, Inventory, MissingItem, OptionsError, ResolveOptions,
    INVENTORY_ALLOCATION_COLUMNS, INVENTORY_LOOKUP_COLUMNS, MISSING_ALLOCATION_COLUMNS,
    MISSING_LOOKUP_COLUMNS,
};
use crate::table::{SchemaError, Table};
use thiserror::Error;

/// Resolver errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolverError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid options: {0}")]
    Options(#[from] OptionsError),
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// Runs both pipelines against one inventory table.
///
/// Every call validates its inputs before any join work, so a schema
/// failure never leaves a partial result behind.
pub struct AlternativeResolver<'a> {
    inventory: &'a Table,
}

impl<'a> AlternativeResolver<'a> {
    /// Create a resolver over an inventory table.
    pub fn new(inventory: &'a Table) -> Self {
        Self { inventory }
    }

    /// Look up the stocked batches of each requested article.
    pub fn find_candidates(&self, missing: &Table) -> ResolverResult<Vec<AlternativeCandidate>> {
        let items = MissingItem::from_table(missing, &MISSING_LOOKUP_COLUMNS)?;
        let inventory = Inventory::from_table(self.inventory, &INVENTORY_LOOKUP_COLUMNS)?;
        Ok(find_candidates(&items, &inventory))
    }

    /// Choose one substitute per missing article.
    pub fn resolve(&self, missing: &Table, options: &ResolveOptions) -> ResolverResult<Allocations> {
        let items = MissingItem::from_table(missing, &MISSING_ALLOCATION_COLUMNS)?;

        let mut required = INVENTORY_ALLOCATION_COLUMNS.to_vec();
        if !options.warehouses.is_empty() {
            required.push("bodega");
        }
        let inventory = Inventory::from_table(self.inventory, &required)?;

        Ok(resolve(&items, &inventory, options))
    }

    /// [`AlternativeResolver::resolve`] with the raw warehouse and extra
    /// column selections made by the operator.
    pub fn resolve_selection<W, E>(
        &self,
        missing: &Table,
        warehouses: &[W],
        extra_columns: &[E],
    ) -> ResolverResult<Allocations>
    where
        W: AsRef<str>,
        E: AsRef<str>,
    {
        let options = ResolveOptions::from_selection(warehouses, extra_columns)?;
        self.resolve(missing, &options)
    }

    /// Distinct warehouses in the inventory, in first-seen order.
    pub fn warehouses(&self) -> ResolverResult<Vec<String>> {
        let inventory = Inventory::from_table(self.inventory, &["cur", "codart", "bodega"])?;
        Ok(inventory.warehouses())
    }
}
