use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use rand::Rng;
use ref_cast::RefCast;

use crate::bitset::{min_blocks, BitBlock, BitSet, BLOCKSIZE, MSB_ON};
use crate::error::{Error, Result};

/// One row of a [`BitMatrix`], viewed as a slice of packed [`BitBlock`]s.
///
/// The reduction rules work at word granularity; this wrapper carries the
/// word-level operations they need so per-bit scans stay out of the hot loops.
#[derive(RefCast, PartialEq, Eq, Debug)]
#[repr(transparent)]
pub struct BitRow([BitBlock]);

impl BitRow {
    /// Returns the value of the bit at column `j`.
    #[inline]
    pub fn bit(&self, j: usize) -> bool {
        self.0[j / BLOCKSIZE] & (MSB_ON >> (j % BLOCKSIZE)) != 0
    }

    /// ORs this row into `acc`, block-wise.
    #[inline]
    pub fn or_into(&self, acc: &mut [BitBlock]) {
        for (a, w) in acc.iter_mut().zip(self.0.iter()) {
            *a |= w;
        }
    }

    /// Returns true if, restricted to the columns in `mask`, every 1 of
    /// `other` is also a 1 of `self`.
    #[inline]
    pub fn covers(&self, other: &BitRow, mask: &[BitBlock]) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .zip(mask.iter())
            .all(|((a, b), m)| b & m & !a == 0)
    }

    /// Counts the 1s of this row restricted to the columns in `mask`.
    #[inline]
    pub fn count_ones_under(&self, mask: &[BitBlock]) -> usize {
        self.0
            .iter()
            .zip(mask.iter())
            .map(|(w, m)| (w & m).count_ones() as usize)
            .sum()
    }
}

/// A matrix of bits, stored row-major as packed [`BitBlock`]s.
///
/// Each row occupies `col_blocks` words with the bits packed
/// most-significant-bit-first; if the width is not a multiple of
/// [`BLOCKSIZE`], the tail of the last word in each row is 0. The matrix is
/// immutable once constructed: searches operate on live row/column subsets
/// tracked next to a shared borrow of the matrix, never on the matrix itself.
///
/// Rows are the sets to be hit, columns the elements available to hit them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BitMatrix {
    /// the number of rows in the matrix
    height: usize,

    /// the number of columns in the matrix
    width: usize,

    /// the number of [`BitBlock`]s used to store each row
    col_blocks: usize,

    /// packed cells, row-major
    data: Vec<BitBlock>,
}

impl BitMatrix {
    /// Builds a matrix from a function `f` that determines the value of each cell.
    pub fn build(height: usize, width: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let col_blocks = min_blocks(width);
        let mut data = vec![0; height * col_blocks];
        for i in 0..height {
            for j in 0..width {
                if f(i, j) {
                    data[i * col_blocks + j / BLOCKSIZE] |= MSB_ON >> (j % BLOCKSIZE);
                }
            }
        }
        BitMatrix {
            height,
            width,
            col_blocks,
            data,
        }
    }

    /// Reads a `height * width` matrix of whitespace-separated `0`/`1` tokens,
    /// row-major.
    ///
    /// The dimensions come from the caller, not the stream. Tokens beyond the
    /// declared size are ignored.
    ///
    /// # Errors
    ///
    /// [`Error::SizeMismatch`] if the stream runs out of tokens early,
    /// [`Error::InvalidValue`] on a token other than `0` or `1`, and
    /// [`Error::Io`] if reading fails.
    pub fn from_reader<R: Read>(mut reader: R, height: usize, width: usize) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let col_blocks = min_blocks(width);
        let mut data = vec![0; height * col_blocks];
        let mut tokens = text.split_whitespace();
        let mut seen = 0;
        for i in 0..height {
            for j in 0..width {
                let token = tokens.next().ok_or(Error::SizeMismatch {
                    expected: height * width,
                    actual: seen,
                })?;
                match token {
                    "0" => {}
                    "1" => data[i * col_blocks + j / BLOCKSIZE] |= MSB_ON >> (j % BLOCKSIZE),
                    _ => {
                        return Err(Error::InvalidValue {
                            token: token.to_owned(),
                        })
                    }
                }
                seen += 1;
            }
        }

        Ok(BitMatrix {
            height,
            width,
            col_blocks,
            data,
        })
    }

    /// Reads a matrix from a file in the format accepted by [`BitMatrix::from_reader`].
    pub fn from_path<P: AsRef<Path>>(path: P, height: usize, width: usize) -> Result<Self> {
        let file = File::open(path)?;
        BitMatrix::from_reader(BufReader::new(file), height, width)
    }

    /// Creates a random matrix where each cell is 1 with probability `density`.
    pub fn random(rng: &mut impl Rng, height: usize, width: usize, density: f64) -> Self {
        BitMatrix::build(height, width, |_, _| rng.random_bool(density))
    }

    /// Writes the matrix in the text format accepted by [`BitMatrix::from_reader`]:
    /// space-separated `0`/`1` tokens, one line per row.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for i in 0..self.height {
            for j in 0..self.width {
                write!(writer, "{} ", if self.bit(i, j) { 1 } else { 0 })?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub(crate) fn col_blocks(&self) -> usize {
        self.col_blocks
    }

    /// Returns the cell at (`row`, `col`).
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] if either index is outside the declared
    /// dimensions.
    pub fn at(&self, row: usize, col: usize) -> Result<bool> {
        if row >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: row,
                size: self.height,
            });
        }
        if col >= self.width {
            return Err(Error::IndexOutOfBounds {
                index: col,
                size: self.width,
            });
        }
        Ok(self.bit(row, col))
    }

    /// Unchecked cell access; callers guarantee the indices are in range.
    #[inline]
    pub(crate) fn bit(&self, row: usize, col: usize) -> bool {
        self.data[row * self.col_blocks + col / BLOCKSIZE] & (MSB_ON >> (col % BLOCKSIZE)) != 0
    }

    /// The packed words of row `row`.
    #[inline]
    pub fn row(&self, row: usize) -> &BitRow {
        BitRow::ref_cast(&self.data[row * self.col_blocks..(row + 1) * self.col_blocks])
    }

    /// The set of rows (over the full height) with a 1 in column `col`.
    pub fn rows_with_bit(&self, col: usize) -> Result<BitSet> {
        if col >= self.width {
            return Err(Error::IndexOutOfBounds {
                index: col,
                size: self.width,
            });
        }
        let mut rows = BitSet::new(self.height);
        for i in 0..self.height {
            if self.bit(i, col) {
                rows.set(i)?;
            }
        }
        Ok(rows)
    }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.height {
            for j in 0..self.width {
                write!(f, " {} ", if self.bit(i, j) { 1 } else { 0 })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
