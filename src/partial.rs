use crate::bitmatrix::BitMatrix;
use crate::bitset::{BitBlock, BitSet, BLOCKSIZE, MSB_ON};
use crate::error::{Error, Result};

/// A live projection of a [`BitMatrix`] during search: the rows still to be
/// hit, the columns still free to hit them, and the columns already chosen
/// for the partial transversal under construction.
///
/// The matrix itself is shared immutably; cloning a view copies only the
/// three index sets and the logical counters, which is what gives recursive
/// branches their value semantics — a child never observes a sibling's or
/// parent's bookkeeping.
///
/// `cur_height`/`cur_width` are the logical remaining dimensions and are the
/// termination signal rather than the raw set populations: deleting the last
/// row to be hit forces `cur_width` to 0, and deleting a column while
/// `cur_width` is already 0 forces `cur_height` to 0. A view with
/// `cur_height == 0` is covered — its selected columns hit every row.
#[derive(Clone, Debug)]
pub struct PartialMatrix<'a> {
    matrix: &'a BitMatrix,
    available_rows: BitSet,
    available_cols: BitSet,
    selected_cols: BitSet,
    cur_height: usize,
    cur_width: usize,
}

impl<'a> PartialMatrix<'a> {
    /// Creates a view over the whole matrix and applies both reduction rules
    /// once, as every branch step does.
    pub fn new(matrix: &'a BitMatrix) -> Result<Self> {
        let mut view = PartialMatrix {
            matrix,
            available_rows: BitSet::full(matrix.height()),
            available_cols: BitSet::full(matrix.width()),
            selected_cols: BitSet::new(matrix.width()),
            cur_height: matrix.height(),
            cur_width: matrix.width(),
        };
        view.reduce()?;
        Ok(view)
    }

    #[inline]
    pub fn matrix(&self) -> &'a BitMatrix {
        self.matrix
    }

    #[inline]
    pub fn available_rows(&self) -> &BitSet {
        &self.available_rows
    }

    #[inline]
    pub fn available_cols(&self) -> &BitSet {
        &self.available_cols
    }

    #[inline]
    pub fn selected_cols(&self) -> &BitSet {
        &self.selected_cols
    }

    #[inline]
    pub fn cur_height(&self) -> usize {
        self.cur_height
    }

    #[inline]
    pub fn cur_width(&self) -> usize {
        self.cur_width
    }

    /// True once the selected columns hit every row of the matrix.
    #[inline]
    pub fn is_covered(&self) -> bool {
        self.cur_height == 0
    }

    /// Removes `col` from the available columns. With `selected` it is
    /// recorded as chosen for the partial transversal; reductions pass
    /// `false` to discard a column without choosing it.
    ///
    /// Deleting a column after the width already collapsed to 0 marks the
    /// view covered; this is the tail of every fully-covering branch step.
    pub fn delete_column(&mut self, col: usize, selected: bool) -> Result<()> {
        if col >= self.matrix.width() {
            return Err(Error::IndexOutOfBounds {
                index: col,
                size: self.matrix.width(),
            });
        }
        if self.cur_width == 0 {
            self.cur_height = 0;
        } else if self.available_cols.test(col)? {
            self.cur_width -= 1;
        }
        self.available_cols.clear(col)?;
        if selected {
            self.selected_cols.set(col)?;
        }
        Ok(())
    }

    /// Removes `row` from the rows still to be hit. Deleting the last such
    /// row collapses the width to 0: no remaining column matters once every
    /// row is accounted for.
    pub fn delete_row(&mut self, row: usize) -> Result<()> {
        if row >= self.matrix.height() {
            return Err(Error::IndexOutOfBounds {
                index: row,
                size: self.matrix.height(),
            });
        }
        if self.cur_height <= 1 {
            self.cur_width = 0;
        } else if self.available_rows.test(row)? {
            self.cur_height -= 1;
        }
        self.available_rows.clear(row)?;
        Ok(())
    }

    /// Applies the two structural reductions, in this order. Neither changes
    /// the set of minimal transversals of the live submatrix.
    pub fn reduce(&mut self) -> Result<()> {
        self.delete_zero_columns()?;
        self.delete_superset_rows()
    }

    /// A column with no 1 in any row still to be hit can never contribute to
    /// a cover; drop it (without selecting it).
    fn delete_zero_columns(&mut self) -> Result<()> {
        let mut disjunction: Vec<BitBlock> = vec![0; self.matrix.col_blocks()];
        for i in self.available_rows.iter_ones() {
            self.matrix.row(i).or_into(&mut disjunction);
        }

        let dead: Vec<usize> = self
            .available_cols
            .iter_ones()
            .filter(|&j| disjunction[j / BLOCKSIZE] & (MSB_ON >> (j % BLOCKSIZE)) == 0)
            .collect();
        for j in dead {
            log::trace!("zero column {} dropped", j);
            self.delete_column(j, false)?;
        }
        Ok(())
    }

    /// A row whose 1s, restricted to the available columns, are a superset of
    /// another available row's 1s is hit by any selection hitting the
    /// narrower row; drop the wider one. Equal rows: the lower-indexed one is
    /// visited first and dropped.
    fn delete_superset_rows(&mut self) -> Result<()> {
        let height = self.matrix.height();
        for i in 0..height {
            if !self.available_rows.test(i)? {
                continue;
            }
            for j in 0..height {
                if i == j || !self.available_rows.test(j)? {
                    continue;
                }
                if self
                    .matrix
                    .row(i)
                    .covers(self.matrix.row(j), self.available_cols.words())
                {
                    log::trace!("row {} dropped (covers row {})", i, j);
                    self.delete_row(i)?;
                    break;
                }
            }
        }
        Ok(())
    }

    /// The lowest-index row still to be hit.
    pub fn first_available_row(&self) -> Option<usize> {
        self.available_rows.first_one()
    }

    /// The row still to be hit with the fewest 1s among available columns,
    /// with its weight. Ties go to the lower index.
    pub fn lightest_row(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for i in self.available_rows.iter_ones() {
            let weight = self
                .matrix
                .row(i)
                .count_ones_under(self.available_cols.words());
            if best.map_or(true, |(_, w)| weight < w) {
                best = Some((i, weight));
            }
        }
        best
    }

    /// The branch step shared by every search strategy: choose `col` for the
    /// partial transversal, drop every row it hits, drop the column, reduce.
    /// Returns the child view; `self` is untouched.
    pub fn select(&self, col: usize) -> Result<PartialMatrix<'a>> {
        if col >= self.matrix.width() {
            return Err(Error::IndexOutOfBounds {
                index: col,
                size: self.matrix.width(),
            });
        }
        let mut child = self.clone();
        for row in 0..self.matrix.height() {
            if self.matrix.bit(row, col) {
                child.delete_row(row)?;
            }
        }
        child.delete_column(col, true)?;
        child.reduce()?;
        Ok(child)
    }
}
