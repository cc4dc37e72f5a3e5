use std::io;

use thiserror::Error;

/// Errors surfaced by matrix construction and the search routines.
///
/// Input-parsing failures abort construction immediately; nothing here is
/// retried. [`Error::InvariantViolation`] signals a defect in the search
/// bookkeeping itself and is asserted on in debug builds before being
/// returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The matrix file could not be opened or read.
    #[error("failed to read matrix input: {0}")]
    Io(#[from] io::Error),

    /// Fewer values than the declared dimensions require, or two bit sets
    /// of different capacities were combined.
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A matrix entry other than `0` or `1`.
    #[error("matrix entries must be 0 or 1, got `{token}`")]
    InvalidValue { token: String },

    /// A row, column, or bit index beyond the declared bounds.
    #[error("index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    /// A reduction/termination invariant did not hold during search.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
