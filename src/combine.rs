use crate::engine::{CoveragePair, TransversalFamily};
use crate::error::Result;

/// How many disjoint partners [`combine`] reports per member of the first
/// family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CombineMode {
    /// Keep only the first disjoint partner found for each member.
    FirstMatch,
    /// Enumerate every disjoint pair.
    #[default]
    AllMatches,
}

/// Pairs up two independently computed transversal families under the
/// disjointness test: a pair is a joint solution iff its two column sets
/// share no element.
///
/// Quadratic in the family sizes, which is acceptable because minimal
/// families are typically small next to the matrix dimensions. Output order
/// follows the families' sorted order. Families over different column counts
/// fail with a size mismatch.
pub fn combine(
    first: &TransversalFamily,
    second: &TransversalFamily,
    mode: CombineMode,
) -> Result<Vec<CoveragePair>> {
    let mut pairs = Vec::new();
    for s1 in first {
        for s2 in second {
            if !s1.intersects(s2)? {
                pairs.push(CoveragePair {
                    first: s1.clone(),
                    second: s2.clone(),
                });
                if mode == CombineMode::FirstMatch {
                    break;
                }
            }
        }
    }
    log::debug!(
        "combined {}x{} transversals into {} coverage pairs",
        first.len(),
        second.len(),
        pairs.len()
    );
    Ok(pairs)
}
