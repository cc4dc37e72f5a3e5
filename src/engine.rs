use std::collections::BTreeSet;
use std::fmt;

use crate::bitmatrix::BitMatrix;
use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::partial::PartialMatrix;
use crate::support::SupportRegistry;

/// How a branch picks the row to expand on.
///
/// A performance heuristic only: every policy yields the same result set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PivotPolicy {
    /// Expand on the lowest-index row still to be hit.
    #[default]
    LowestIndex,
    /// Expand on the row with the fewest 1s among available columns, to keep
    /// the branching factor down.
    LightestRow,
}

/// Whether a search enumerates everything or unwinds at the first result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnumerationMode {
    #[default]
    All,
    /// Stop as soon as one transversal (or coverage pair) has been emitted;
    /// answers "does one exist" without paying for the full family.
    FirstOnly,
}

/// Explicit knobs for the search routines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchConfig {
    pub pivot: PivotPolicy,
    pub mode: EnumerationMode,
}

/// All minimal transversals of one matrix, deduplicated by bit pattern.
pub type TransversalFamily = BTreeSet<BitSet>;

/// A jointly minimal solution over a pair of matrices: one minimal
/// transversal per matrix, disjoint as column sets.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoveragePair {
    pub first: BitSet,
    pub second: BitSet,
}

impl fmt::Display for CoveragePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.first, self.second)
    }
}

/// The coverage pairs produced by a joint search, deduplicated.
pub type CoverageSet = BTreeSet<CoveragePair>;

/// Enumerates the minimal transversals of `matrix`: the column subsets that
/// hit every row and lose that property when any member is removed.
///
/// Depth-first: each branch picks a pivot row, tries every available column
/// with a 1 in it that survives the subsumption check, and recurses on a
/// reduced child view. Search runs to exhaustion (or to the first result
/// under [`EnumerationMode::FirstOnly`]); a matrix with an uncoverable row
/// yields an empty family.
pub fn dualize(matrix: &BitMatrix, config: SearchConfig) -> Result<TransversalFamily> {
    let view = PartialMatrix::new(matrix)?;
    let mut family = TransversalFamily::new();
    let _ = search_single(&view, &SupportRegistry::new(), config, &mut family)?;
    log::debug!(
        "dualization of a {}x{} matrix produced {} transversals",
        matrix.height(),
        matrix.width(),
        family.len()
    );
    Ok(family)
}

/// Jointly enumerates disjoint pairs of minimal transversals of `first` and
/// `second`, expanding one view at a time: whichever side's pivot row compares
/// lower (or, under [`PivotPolicy::LightestRow`], whichever pivot is heavier)
/// is branched this step, excluding columns the other side already selected.
///
/// Both matrices must have the same number of columns.
pub fn dualize_pair_alternating(
    first: &BitMatrix,
    second: &BitMatrix,
    config: SearchConfig,
) -> Result<CoverageSet> {
    check_widths(first, second)?;
    let l1 = PartialMatrix::new(first)?;
    let l2 = PartialMatrix::new(second)?;
    let mut pairs = CoverageSet::new();
    let _ = search_alternating(
        &l1,
        &l2,
        &SupportRegistry::new(),
        &SupportRegistry::new(),
        config,
        &mut pairs,
    )?;
    Ok(pairs)
}

/// Jointly enumerates disjoint pairs of minimal transversals of `first` and
/// `second`, advancing both views one level per step over the Cartesian
/// product of their pivot rows' columns. Falls back to one-sided branching
/// when a single view remains uncovered.
///
/// Produces the same set of pairs as [`dualize_pair_alternating`].
pub fn dualize_pair_simultaneous(
    first: &BitMatrix,
    second: &BitMatrix,
    config: SearchConfig,
) -> Result<CoverageSet> {
    check_widths(first, second)?;
    let l1 = PartialMatrix::new(first)?;
    let l2 = PartialMatrix::new(second)?;
    let mut pairs = CoverageSet::new();
    let _ = search_simultaneous(
        &l1,
        &l2,
        &SupportRegistry::new(),
        &SupportRegistry::new(),
        config,
        &mut pairs,
    )?;
    Ok(pairs)
}

fn check_widths(first: &BitMatrix, second: &BitMatrix) -> Result<()> {
    if first.width() != second.width() {
        return Err(Error::SizeMismatch {
            expected: first.width(),
            actual: second.width(),
        });
    }
    Ok(())
}

/// The pivot row of an uncovered view; its absence means the bookkeeping is
/// broken, not that the search is done.
fn pivot_row(view: &PartialMatrix<'_>, policy: PivotPolicy) -> Result<usize> {
    let row = match policy {
        PivotPolicy::LowestIndex => view.first_available_row(),
        PivotPolicy::LightestRow => view.lightest_row().map(|(row, _)| row),
    };
    row.ok_or_else(|| {
        debug_assert!(false, "uncovered view has no available rows");
        log::error!("uncovered view has no available rows");
        Error::InvariantViolation("uncovered view has no available rows")
    })
}

/// Returns true when the search should unwind (first result found under
/// `FirstOnly`), propagated unchanged through every frame.
fn search_single(
    view: &PartialMatrix<'_>,
    registry: &SupportRegistry,
    config: SearchConfig,
    out: &mut TransversalFamily,
) -> Result<bool> {
    if view.is_covered() {
        log::debug!("transversal {}", view.selected_cols());
        let _ = out.insert(view.selected_cols().clone());
        return Ok(config.mode == EnumerationMode::FirstOnly);
    }

    let pivot = pivot_row(view, config.pivot)?;
    for col in view.available_cols().iter_ones() {
        if !view.matrix().bit(pivot, col) {
            continue;
        }
        if !registry.check(view.matrix(), col)? {
            continue;
        }
        let child_registry = registry.update(view.matrix(), col)?;
        let child = view.select(col)?;
        if search_single(&child, &child_registry, config, out)? {
            return Ok(true);
        }
    }
    Ok(false)
}

type PairRecurse = fn(
    &PartialMatrix<'_>,
    &PartialMatrix<'_>,
    &SupportRegistry,
    &SupportRegistry,
    SearchConfig,
    &mut CoverageSet,
) -> Result<bool>;

fn emit_pair(
    l1: &PartialMatrix<'_>,
    l2: &PartialMatrix<'_>,
    config: SearchConfig,
    out: &mut CoverageSet,
) -> bool {
    let pair = CoveragePair {
        first: l1.selected_cols().clone(),
        second: l2.selected_cols().clone(),
    };
    log::debug!("coverage pair {}", pair);
    let _ = out.insert(pair);
    config.mode == EnumerationMode::FirstOnly
}

/// One-sided branch step shared by the joint strategies: expand `active` on
/// its pivot row, skipping columns the passive side already selected, and
/// recurse through `recurse` with the views back in (first, second) order.
fn expand_one(
    active: &PartialMatrix<'_>,
    passive: &PartialMatrix<'_>,
    active_registry: &SupportRegistry,
    passive_registry: &SupportRegistry,
    active_is_first: bool,
    config: SearchConfig,
    out: &mut CoverageSet,
    recurse: PairRecurse,
) -> Result<bool> {
    let pivot = pivot_row(active, config.pivot)?;
    for col in active.available_cols().iter_ones() {
        if !active.matrix().bit(pivot, col) || passive.selected_cols().test(col)? {
            continue;
        }
        if !active_registry.check(active.matrix(), col)? {
            continue;
        }
        let child_registry = active_registry.update(active.matrix(), col)?;
        let child = active.select(col)?;
        let stop = if active_is_first {
            recurse(&child, passive, &child_registry, passive_registry, config, out)?
        } else {
            recurse(passive, &child, passive_registry, &child_registry, config, out)?
        };
        if stop {
            return Ok(true);
        }
    }
    Ok(false)
}

fn search_alternating(
    l1: &PartialMatrix<'_>,
    l2: &PartialMatrix<'_>,
    r1: &SupportRegistry,
    r2: &SupportRegistry,
    config: SearchConfig,
    out: &mut CoverageSet,
) -> Result<bool> {
    let expand_first = match (l1.is_covered(), l2.is_covered()) {
        (true, true) => return Ok(emit_pair(l1, l2, config, out)),
        (true, false) => false,
        (false, true) => true,
        (false, false) => match config.pivot {
            // ties favor the first view in both regimes
            PivotPolicy::LowestIndex => pivot_row(l1, config.pivot)? <= pivot_row(l2, config.pivot)?,
            PivotPolicy::LightestRow => lightest_weight(l1)? >= lightest_weight(l2)?,
        },
    };

    if expand_first {
        expand_one(l1, l2, r1, r2, true, config, out, search_alternating)
    } else {
        expand_one(l2, l1, r2, r1, false, config, out, search_alternating)
    }
}

fn lightest_weight(view: &PartialMatrix<'_>) -> Result<usize> {
    match view.lightest_row() {
        Some((_, weight)) => Ok(weight),
        None => {
            debug_assert!(false, "uncovered view has no available rows");
            log::error!("uncovered view has no available rows");
            Err(Error::InvariantViolation("uncovered view has no available rows"))
        }
    }
}

fn search_simultaneous(
    l1: &PartialMatrix<'_>,
    l2: &PartialMatrix<'_>,
    r1: &SupportRegistry,
    r2: &SupportRegistry,
    config: SearchConfig,
    out: &mut CoverageSet,
) -> Result<bool> {
    match (l1.is_covered(), l2.is_covered()) {
        (true, true) => Ok(emit_pair(l1, l2, config, out)),
        (false, true) => expand_one(l1, l2, r1, r2, true, config, out, search_simultaneous),
        (true, false) => expand_one(l2, l1, r2, r1, false, config, out, search_simultaneous),
        (false, false) => {
            let p1 = pivot_row(l1, config.pivot)?;
            let p2 = pivot_row(l2, config.pivot)?;
            for col1 in l1.available_cols().iter_ones() {
                if !l1.matrix().bit(p1, col1) || l2.selected_cols().test(col1)? {
                    continue;
                }
                if !r1.check(l1.matrix(), col1)? {
                    continue;
                }
                let r1_child = r1.update(l1.matrix(), col1)?;
                let child1 = l1.select(col1)?;
                for col2 in l2.available_cols().iter_ones() {
                    if col2 == col1
                        || !l2.matrix().bit(p2, col2)
                        || l1.selected_cols().test(col2)?
                    {
                        continue;
                    }
                    if !r2.check(l2.matrix(), col2)? {
                        continue;
                    }
                    let r2_child = r2.update(l2.matrix(), col2)?;
                    let child2 = l2.select(col2)?;
                    if search_simultaneous(&child1, &child2, &r1_child, &r2_child, config, out)? {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::combine::{combine, CombineMode};
    use rand::{rngs::SmallRng, SeedableRng};

    fn matrix(text: &str, h: usize, w: usize) -> BitMatrix {
        BitMatrix::from_reader(text.as_bytes(), h, w).unwrap()
    }

    fn family_of(sets: &[&[usize]], width: usize) -> TransversalFamily {
        sets.iter()
            .map(|s| BitSet::from_indices(width, s.iter().copied()).unwrap())
            .collect()
    }

    /// Reference enumeration by exhaustive subset search; minimality is
    /// checked by dropping each member in turn.
    fn brute_force(matrix: &BitMatrix) -> TransversalFamily {
        let h = matrix.height();
        let w = matrix.width();
        assert!(w <= 16, "reference search is exponential in the width");

        let hits_all = |mask: u32| {
            (0..h).all(|i| (0..w).any(|j| mask & (1 << j) != 0 && matrix.bit(i, j)))
        };

        let mut family = TransversalFamily::new();
        for mask in 0..(1u32 << w) {
            if !hits_all(mask) {
                continue;
            }
            let minimal = (0..w)
                .filter(|&j| mask & (1 << j) != 0)
                .all(|j| !hits_all(mask & !(1 << j)));
            if minimal {
                let set = BitSet::from_indices(w, (0..w).filter(|&j| mask & (1 << j) != 0))
                    .unwrap();
                let _ = family.insert(set);
            }
        }
        family
    }

    #[test]
    fn identity_matrix_has_one_transversal() {
        let m = matrix("1 0 0\n0 1 0\n0 0 1\n", 3, 3);
        let family = dualize(&m, SearchConfig::default()).unwrap();
        assert_eq!(family, family_of(&[&[0, 1, 2]], 3));
    }

    #[test]
    fn two_overlapping_rows() {
        let m = matrix("1 1 0\n0 1 1\n", 2, 3);
        let family = dualize(&m, SearchConfig::default()).unwrap();
        assert_eq!(family, family_of(&[&[1], &[0, 2]], 3));
    }

    #[test]
    fn uncoverable_row_yields_empty_family() {
        let m = matrix("0 0 0\n1 1 0\n", 2, 3);
        let family = dualize(&m, SearchConfig::default()).unwrap();
        assert!(family.is_empty());
    }

    #[test]
    fn emitted_transversals_cover_and_are_minimal() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let m = BitMatrix::random(&mut rng, 5, 8, 0.4);
            let family = dualize(&m, SearchConfig::default()).unwrap();
            let hit_by = |t: &BitSet, i: usize| t.iter_ones().any(|j| m.bit(i, j));
            for t in &family {
                for i in 0..m.height() {
                    assert!(hit_by(t, i), "row {} of\n{}is not hit by {}", i, m, t);
                }
                // dropping any single member must leave some row unhit
                for dropped in t.iter_ones() {
                    let mut smaller = t.clone();
                    smaller.clear(dropped).unwrap();
                    assert!(
                        (0..m.height()).any(|i| !hit_by(&smaller, i)),
                        "{} is not minimal for\n{}",
                        t,
                        m
                    );
                }
            }
        }
    }

    #[test]
    fn agrees_with_reference_search() {
        let mut rng = SmallRng::seed_from_u64(1);
        for round in 0..30 {
            let (h, w) = if round % 2 == 0 { (4, 6) } else { (6, 5) };
            let m = BitMatrix::random(&mut rng, h, w, 0.45);
            let expected = brute_force(&m);
            for pivot in [PivotPolicy::LowestIndex, PivotPolicy::LightestRow] {
                let config = SearchConfig {
                    pivot,
                    mode: EnumerationMode::All,
                };
                let family = dualize(&m, config).unwrap();
                assert_eq!(family, expected, "pivot {:?} on\n{}", pivot, m);
            }
        }
    }

    #[test]
    fn first_only_stops_after_one() {
        let m = matrix("1 1\n", 1, 2);
        let config = SearchConfig {
            pivot: PivotPolicy::LowestIndex,
            mode: EnumerationMode::FirstOnly,
        };
        let family = dualize(&m, config).unwrap();
        assert_eq!(family, family_of(&[&[0]], 2));
    }

    #[test]
    fn pair_strategies_agree_with_combination() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..15 {
            let m1 = BitMatrix::random(&mut rng, 4, 6, 0.5);
            let m2 = BitMatrix::random(&mut rng, 3, 6, 0.5);
            for pivot in [PivotPolicy::LowestIndex, PivotPolicy::LightestRow] {
                let config = SearchConfig {
                    pivot,
                    mode: EnumerationMode::All,
                };
                let f1 = dualize(&m1, config).unwrap();
                let f2 = dualize(&m2, config).unwrap();
                let expected: CoverageSet = combine(&f1, &f2, CombineMode::AllMatches)
                    .unwrap()
                    .into_iter()
                    .collect();

                let d1 = dualize_pair_alternating(&m1, &m2, config).unwrap();
                let d2 = dualize_pair_simultaneous(&m1, &m2, config).unwrap();
                assert_eq!(d1, expected, "alternating, pivot {:?}\n{}\n{}", pivot, m1, m2);
                assert_eq!(d2, expected, "simultaneous, pivot {:?}\n{}\n{}", pivot, m1, m2);
            }
        }
    }

    #[test]
    fn disjoint_single_rows_pair_up() {
        let m1 = matrix("1 0\n", 1, 2);
        let m2 = matrix("0 1\n", 1, 2);
        let pairs = dualize_pair_alternating(&m1, &m2, SearchConfig::default()).unwrap();
        assert_eq!(pairs.len(), 1);
        let pair = pairs.iter().next().unwrap();
        assert_eq!(pair.first.iter_ones().collect::<Vec<_>>(), vec![0]);
        assert_eq!(pair.second.iter_ones().collect::<Vec<_>>(), vec![1]);
        assert_eq!(pair.to_string(), "{ 0 }  { 1 }");
    }

    #[test]
    fn shared_only_column_admits_no_pair() {
        let m = matrix("1\n", 1, 1);
        let pairs = dualize_pair_simultaneous(&m, &m, SearchConfig::default()).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn pair_first_only_stops_after_one() {
        let m1 = matrix("1 1 0 0\n", 1, 4);
        let m2 = matrix("0 0 1 1\n", 1, 4);
        let config = SearchConfig {
            pivot: PivotPolicy::LowestIndex,
            mode: EnumerationMode::FirstOnly,
        };
        assert_eq!(dualize_pair_alternating(&m1, &m2, config).unwrap().len(), 1);
        assert_eq!(dualize_pair_simultaneous(&m1, &m2, config).unwrap().len(), 1);
    }

    #[test]
    fn pair_width_mismatch() {
        let m1 = matrix("1 1\n", 1, 2);
        let m2 = matrix("1 1 1\n", 1, 3);
        assert!(matches!(
            dualize_pair_alternating(&m1, &m2, SearchConfig::default()),
            Err(Error::SizeMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(dualize_pair_simultaneous(&m1, &m2, SearchConfig::default()).is_err());
    }
}
