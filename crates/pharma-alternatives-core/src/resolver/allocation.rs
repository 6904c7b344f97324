//! Allocation run: one substitute per missing article, with the quantity
//! needed to cover the shortage.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument, warn};

use crate::models::{
    AllocationResult, Allocations, Coverage, Inventory, InventoryRecord, MissingItem,
    ResolveOptions, ALLOCATION_COLUMNS,
};

use super::selection::{replacement_quantity, select_best, Stocked};

/// A shortage line joined with one usable inventory batch.
#[derive(Debug, Clone, Copy)]
struct Pairing<'a> {
    item: &'a MissingItem,
    record: &'a InventoryRecord,
    stock: f64,
}

impl Stocked for Pairing<'_> {
    fn stock(&self) -> f64 {
        self.stock
    }
}

/// Choose a substitute for every missing article.
///
/// Substitutes share the shortage's `cur` (any article), sit in one of the
/// selected warehouses and have positive stock. Articles with no surviving
/// substitute are listed in [`Allocations::unresolved`] instead of `rows`.
#[instrument(
    skip_all,
    fields(missing = missing.len(), inventory = inventory.len(), warehouses = options.warehouses.len())
)]
pub fn resolve(missing: &[MissingItem], inventory: &Inventory, options: &ResolveOptions) -> Allocations {
    let curs: HashSet<&str> = missing.iter().map(|m| m.cur.as_str()).collect();

    let mut by_cur: HashMap<&str, Vec<(&InventoryRecord, f64)>> = HashMap::new();
    let mut usable = 0usize;
    for record in inventory.records() {
        if !curs.contains(record.cur.as_str()) || !options.accepts_warehouse(record.bodega.as_deref()) {
            continue;
        }
        let Some(stock) = record.stock().filter(|s| *s > 0.0) else {
            continue;
        };
        by_cur.entry(record.cur.as_str()).or_default().push((record, stock));
        usable += 1;
    }
    debug!(usable, "filtered inventory to usable substitutes");

    // Group by missing article; pairings stay in join order for tie-breaking.
    let mut groups: HashMap<&str, Vec<Pairing<'_>>> = HashMap::new();
    for item in missing {
        let pairings = groups.entry(item.codart.as_str()).or_default();
        if let Some(batches) = by_cur.get(item.cur.as_str()) {
            pairings.extend(
                batches
                    .iter()
                    .map(|&(record, stock)| Pairing { item, record, stock }),
            );
        }
    }
    let mut groups: Vec<(&str, Vec<Pairing<'_>>)> = groups.into_iter().collect();
    groups.sort_by(|a, b| codart_order(a.0, b.0));

    let mut rows = Vec::with_capacity(groups.len());
    let mut unresolved = Vec::new();
    for (codart, pairings) in &groups {
        // The lowest-stock pairing fixes the shortage, earliest on ties.
        let shortage = pairings
            .iter()
            .min_by(|a, b| a.stock.total_cmp(&b.stock))
            .and_then(|p| p.item.faltante);
        match select_best(shortage, pairings.as_slice()) {
            Some((best, coverage)) => rows.push(allocation_row(best, coverage, inventory, options)),
            None => {
                debug!(codart, "no substitute survived filtering");
                unresolved.push(codart.to_string());
            }
        }
    }

    if rows.is_empty() {
        warn!(unresolved = unresolved.len(), "allocation run produced no rows");
    } else {
        info!(resolved = rows.len(), unresolved = unresolved.len(), "allocation run finished");
    }

    Allocations {
        columns: output_columns(inventory, options),
        rows,
        unresolved,
    }
}

fn allocation_row(
    best: &Pairing<'_>,
    coverage: Coverage,
    inventory: &Inventory,
    options: &ResolveOptions,
) -> AllocationResult {
    let (item, record) = (best.item, best.record);
    let extras = options
        .extra_columns
        .iter()
        .filter(|c| inventory.has_column(c.column_name()))
        .map(|c| (*c, record.extra(*c).clone()))
        .collect();

    AllocationResult {
        cur: item.cur.clone(),
        codart: item.codart.clone(),
        faltante: item.faltante,
        embalaje: item.embalaje,
        codart_alternativa: record.codart.clone(),
        opcion_alternativa: record.opcion,
        embalaje_alternativa: record.embalaje,
        cantidad_necesaria: replacement_quantity(item.faltante, item.embalaje, record.embalaje),
        unidadespresentacionlote: best.stock,
        bodega: record.bodega.clone(),
        carta: record.carta.clone(),
        extras,
        coverage,
    }
}

/// Article codes that read as numbers sort numerically and ahead of text
/// codes; text codes sort lexically.
fn codart_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Fixed columns whose source the inventory carried, then requested extras.
fn output_columns(inventory: &Inventory, options: &ResolveOptions) -> Vec<String> {
    let fixed = ALLOCATION_COLUMNS.iter().copied().filter(|column| match *column {
        "opcion_alternativa" => inventory.has_column("opcion"),
        "embalaje_alternativa" => inventory.has_column("embalaje"),
        "bodega" | "carta" => inventory.has_column(column),
        _ => true,
    });
    let extras = options
        .extra_columns
        .iter()
        .map(|c| c.column_name())
        .filter(|c| inventory.has_column(c));

    fixed.chain(extras).map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtraColumn;
    use crate::table::Cell;

    fn shortage(codart: &str, faltante: f64) -> MissingItem {
        MissingItem::new("C1", codart).with_shortage(faltante, 1.0)
    }

    #[test]
    fn test_matches_on_cur_only() {
        let inventory = Inventory::from_records(vec![
            InventoryRecord::new("C1", "A2", 50.0).with_embalaje(1.0),
            InventoryRecord::new("C2", "A1", 50.0).with_embalaje(1.0),
        ]);
        let allocations = resolve(&[shortage("A1", 10.0)], &inventory, &ResolveOptions::new());

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations.rows[0].codart_alternativa, "A2");
    }

    #[test]
    fn test_non_positive_stock_never_selected() {
        let inventory = Inventory::from_records(vec![
            InventoryRecord::new("C1", "A2", 0.0),
            InventoryRecord::new("C1", "A3", -5.0),
        ]);
        let allocations = resolve(&[shortage("A1", 1.0)], &inventory, &ResolveOptions::new());

        assert!(allocations.is_empty());
        assert_eq!(allocations.unresolved, vec!["A1"]);
    }

    #[test]
    fn test_unreadable_stock_skipped() {
        let mut record = InventoryRecord::new("C1", "A2", 0.0);
        record.unidadespresentacionlote = Cell::from("n/a");
        let inventory = Inventory::from_records(vec![record, InventoryRecord::new("C1", "A3", 2.0)]);

        let allocations = resolve(&[shortage("A1", 1.0)], &inventory, &ResolveOptions::new());
        assert_eq!(allocations.rows[0].codart_alternativa, "A3");
    }

    #[test]
    fn test_duplicate_article_lines_form_one_group() {
        let inventory = Inventory::from_records(vec![
            InventoryRecord::new("C1", "A2", 5.0),
            InventoryRecord::new("C1", "A3", 15.0),
        ]);
        let missing = vec![shortage("A1", 10.0), shortage("A1", 10.0)];
        let allocations = resolve(&missing, &inventory, &ResolveOptions::new());

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations.rows[0].codart_alternativa, "A3");
        assert_eq!(allocations.rows[0].coverage, Coverage::Full);
    }

    #[test]
    fn test_rows_ordered_by_codart() {
        let inventory = Inventory::from_records(vec![InventoryRecord::new("C1", "Z9", 5.0)]);
        let missing = vec![shortage("B2", 1.0), shortage("A1", 1.0), shortage("C3", 1.0)];
        let allocations = resolve(&missing, &inventory, &ResolveOptions::new());

        let order: Vec<&str> = allocations.rows.iter().map(|r| r.codart.as_str()).collect();
        assert_eq!(order, vec!["A1", "B2", "C3"]);
    }

    #[test]
    fn test_shortage_follows_lowest_stock_line() {
        let inventory = Inventory::from_records(vec![
            InventoryRecord::new("C1", "X", 5.0),
            InventoryRecord::new("C2", "Y", 3.0),
        ]);
        let missing = vec![
            MissingItem::new("C1", "A1").with_shortage(10.0, 1.0),
            MissingItem::new("C2", "A1").with_shortage(2.0, 1.0),
        ];
        let allocations = resolve(&missing, &inventory, &ResolveOptions::new());

        assert_eq!(allocations.len(), 1);
        let row = &allocations.rows[0];
        assert_eq!(row.codart_alternativa, "Y");
        assert_eq!(row.cur, "C2");
        assert_eq!(row.faltante, Some(2.0));
        assert_eq!(row.coverage, Coverage::Full);
    }

    #[test]
    fn test_numeric_codarts_ordered_by_value() {
        let inventory = Inventory::from_records(vec![InventoryRecord::new("C1", "Z9", 5.0)]);
        let missing = vec![shortage("10", 1.0), shortage("B2", 1.0), shortage("9", 1.0)];
        let allocations = resolve(&missing, &inventory, &ResolveOptions::new());

        let order: Vec<&str> = allocations.rows.iter().map(|r| r.codart.as_str()).collect();
        assert_eq!(order, vec!["9", "10", "B2"]);
    }

    #[test]
    fn test_output_columns_follow_inventory() {
        let table = crate::table::Table::new(["cur", "codart", "unidadespresentacionlote", "numlote"])
            .with_row([Cell::from("C1"), Cell::from("A2"), Cell::Int(5), Cell::from("L-1")]);
        let inventory = Inventory::from_table(&table, &crate::models::INVENTORY_ALLOCATION_COLUMNS).unwrap();
        let options = ResolveOptions::new()
            .with_extra_column(ExtraColumn::FechaVenceLote)
            .with_extra_column(ExtraColumn::NumLote);

        let allocations = resolve(&[shortage("A1", 1.0)], &inventory, &options);

        assert_eq!(
            allocations.columns,
            vec![
                "cur",
                "codart",
                "faltante",
                "embalaje",
                "codart_alternativa",
                "cantidad_necesaria",
                "unidadespresentacionlote",
                "numlote",
            ]
        );
        assert_eq!(allocations.rows[0].extras.get(&ExtraColumn::NumLote), Some(&Cell::from("L-1")));
        assert!(!allocations.rows[0].extras.contains_key(&ExtraColumn::FechaVenceLote));
    }
}
