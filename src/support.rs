use rustc_hash::FxHashMap;

use crate::bitmatrix::BitMatrix;
use crate::bitset::BitSet;
use crate::error::Result;

/// Per-branch record of which rows each already-selected column is the sole
/// remaining cover for.
///
/// Selecting a column whose full column support swallows some earlier
/// selection's recorded rows would leave that earlier selection with nothing
/// it alone accounts for — the resulting transversal would have a removable
/// member. [`SupportRegistry::check`] rejects such candidates up front, which
/// is what makes every emitted transversal minimal by construction.
///
/// Row sets are taken over the full matrix height: the rows an earlier column
/// claimed are precisely the ones no longer available, so the subset test is
/// only meaningful against the unrestricted column.
///
/// Registries follow the same value semantics as the live views: `update`
/// returns the child branch's registry and leaves the caller's untouched.
/// Entries stay pairwise disjoint — a row belongs to the first column that
/// claimed it.
#[derive(Clone, Debug, Default)]
pub struct SupportRegistry {
    entries: FxHashMap<usize, BitSet>,
}

impl SupportRegistry {
    pub fn new() -> Self {
        SupportRegistry::default()
    }

    /// Returns false if selecting `col` would strip some earlier selection of
    /// every row it uniquely covers.
    pub fn check(&self, matrix: &BitMatrix, col: usize) -> Result<bool> {
        let one_rows = matrix.rows_with_bit(col)?;
        for rows in self.entries.values() {
            if rows.is_subset(&one_rows)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Registers an accepted `col` and returns the registry for the child
    /// branch: existing entries lose the rows `col` also covers, and `col` is
    /// recorded with whatever rows remain unclaimed.
    pub fn update(&self, matrix: &BitMatrix, col: usize) -> Result<SupportRegistry> {
        let mut one_rows = matrix.rows_with_bit(col)?;
        let mut child = self.clone();
        for rows in child.entries.values_mut() {
            let before = rows.clone();
            rows.subtract(&one_rows)?;
            one_rows.subtract(&before)?;
        }
        let _ = child.entries.insert(col, one_rows);
        Ok(child)
    }

    /// The rows recorded as uniquely covered by `col`, if it was selected.
    pub fn support_of(&self, col: usize) -> Option<&BitSet> {
        self.entries.get(&col)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn matrix(text: &str, h: usize, w: usize) -> BitMatrix {
        BitMatrix::from_reader(text.as_bytes(), h, w).unwrap()
    }

    #[test]
    fn check_rejects_swallowed_support() {
        // column 1 hits both rows; column 0 hits only row 0
        let m = matrix("1 1 0\n0 1 1\n", 2, 3);
        let root = SupportRegistry::new();
        assert!(root.check(&m, 0).unwrap());

        let after0 = root.update(&m, 0).unwrap();
        // column 1 re-covers everything column 0 stands for
        assert!(!after0.check(&m, 1).unwrap());
        // column 2 leaves column 0's support alone
        assert!(after0.check(&m, 2).unwrap());
    }

    #[test]
    fn update_claims_rows_first_come_first_served() {
        let m = matrix("1 1\n0 1\n1 0\n", 3, 2);
        let root = SupportRegistry::new();

        let after0 = root.update(&m, 0).unwrap();
        assert_eq!(
            after0.support_of(0).unwrap().iter_ones().collect::<Vec<_>>(),
            vec![0, 2]
        );

        let after01 = after0.update(&m, 1).unwrap();
        // row 0 is re-covered by column 1, so it stops counting for either
        // side; column 0 keeps row 2, column 1 keeps row 1
        assert_eq!(
            after01.support_of(0).unwrap().iter_ones().collect::<Vec<_>>(),
            vec![2]
        );
        assert_eq!(
            after01.support_of(1).unwrap().iter_ones().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn update_leaves_parent_untouched() {
        let m = matrix("1 1\n1 1\n", 2, 2);
        let root = SupportRegistry::new();
        let child = root.update(&m, 0).unwrap();
        assert!(root.is_empty());
        assert_eq!(child.len(), 1);

        let grandchild = child.update(&m, 1).unwrap();
        // in the child, column 0 still claims both rows
        assert_eq!(child.support_of(0).unwrap().count_ones(), 2);
        // in the grandchild, column 1 arrived too late to claim anything
        assert_eq!(grandchild.support_of(1).unwrap().count_ones(), 0);
    }

    #[test]
    fn out_of_bounds_column() {
        let m = matrix("1\n", 1, 1);
        let reg = SupportRegistry::new();
        assert!(reg.check(&m, 1).is_err());
        assert!(reg.update(&m, 1).is_err());
    }
}
