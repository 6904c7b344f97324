//! Candidate lookup: every stocked batch of the exact article requested.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument, warn};

use crate::models::{AlternativeCandidate, Inventory, InventoryRecord, MissingItem};

/// Find inventory batches matching each shortage line on both `cur` and
/// `codart`.
///
/// Output follows shortage line order, then inventory order, with exact
/// duplicate rows removed. Lines without a match contribute nothing.
#[instrument(skip_all, fields(missing = missing.len(), inventory = inventory.len()))]
pub fn find_candidates(missing: &[MissingItem], inventory: &Inventory) -> Vec<AlternativeCandidate> {
    let curs: HashSet<&str> = missing.iter().map(|m| m.cur.as_str()).collect();

    // Batches sharing a clinical reference with some shortage, keyed by the
    // exact (cur, codart) pair.
    let mut by_article: HashMap<(&str, &str), Vec<&InventoryRecord>> = HashMap::new();
    for record in inventory.records() {
        if curs.contains(record.cur.as_str()) {
            by_article
                .entry((record.cur.as_str(), record.codart.as_str()))
                .or_default()
                .push(record);
        }
    }
    debug!(articles = by_article.len(), "indexed inventory by article");

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for item in missing {
        let Some(records) = by_article.get(&(item.cur.as_str(), item.codart.as_str())) else {
            continue;
        };
        for record in records {
            let candidate = AlternativeCandidate::from(*record);
            if seen.insert(candidate.clone()) {
                candidates.push(candidate);
            }
        }
    }

    if candidates.is_empty() {
        warn!("candidate lookup produced no rows");
    } else {
        info!(rows = candidates.len(), "candidate lookup finished");
    }

    candidates
}
