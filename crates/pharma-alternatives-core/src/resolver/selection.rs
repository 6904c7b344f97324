//! Explicit substitute ranking.
//!
//! Candidates arrive in join order (missing line order, then inventory
//! order). Ties on stock are always broken by that order, earliest first.

use std::cmp::Ordering;

use crate::models::Coverage;

/// A candidate that can be ranked by stock.
pub trait Stocked {
    fn stock(&self) -> f64;
}

/// Order for candidates that cover the shortage: least stock first.
fn covering_order(a: (usize, f64), b: (usize, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

/// Order for the best-effort fallback: most stock first.
fn fallback_order(a: (usize, f64), b: (usize, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Pick the substitute for one missing article.
///
/// Among candidates whose stock covers `shortage`, the one with the least
/// stock wins. If none covers it (or the shortage is unknown) the candidate
/// with the most stock wins. Returns `None` only for an empty slice.
pub fn select_best<T: Stocked>(shortage: Option<f64>, candidates: &[T]) -> Option<(&T, Coverage)> {
    let ranked = || candidates.iter().map(|c| c.stock()).enumerate();

    let covering = shortage.and_then(|needed| {
        ranked()
            .filter(|(_, stock)| *stock >= needed)
            .min_by(|a, b| covering_order(*a, *b))
    });

    if let Some((i, _)) = covering {
        return candidates.get(i).map(|c| (c, Coverage::Full));
    }

    ranked()
        .min_by(|a, b| fallback_order(*a, *b))
        .and_then(|(i, _)| candidates.get(i))
        .map(|c| (c, Coverage::Partial))
}

/// Substitute packages needed to cover a shortage.
///
/// `ceil(faltante * embalaje / embalaje_alternativa)`, or `None` when an
/// operand is missing or the substitute's multiplier is not positive.
pub fn replacement_quantity(
    faltante: Option<f64>,
    embalaje: Option<f64>,
    embalaje_alternativa: Option<f64>,
) -> Option<i64> {
    let (faltante, embalaje, alternativa) = (faltante?, embalaje?, embalaje_alternativa?);
    if !(alternativa > 0.0) {
        return None;
    }
    let quantity = (faltante * embalaje / alternativa).ceil();
    quantity.is_finite().then_some(quantity as i64)
}
