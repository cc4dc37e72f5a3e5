//! `bitdual` is a Rust library for enumerating the minimal transversals
//! (irredundant hitting sets) of 0/1 matrices, whose rows are the sets to be
//! hit and whose columns are the elements available to hit them — the
//! classical dualization of a monotone Boolean function. Some features
//! include:
//! - bit-packed matrix and index-set representations with word-level
//!   operations in the search hot loops
//! - a live row/column projection with two structural reduction rules
//!   (unsupported columns, redundant wider rows)
//! - subsumption bookkeeping that makes every emitted transversal minimal by
//!   construction, with no post-hoc filtering
//! - joint enumeration over a pair of matrices — alternating or simultaneous
//!   expansion — producing disjoint coverage pairs without materializing the
//!   cross product
//! - combination of independently computed families under the disjointness
//!   test
//!
//! The two main data structures provided by this crate are:
//! - [`BitSet`]: a fixed-capacity set of indices stored in 64-bit blocks
//! - [`BitMatrix`]: an immutable two-dimensional bit matrix built from a
//!   `0`/`1` token stream, a file, a closure, or a random density
//!
//! # Example
//!
//! ```
//! use bitdual::{dualize, BitMatrix, SearchConfig};
//!
//! let matrix = BitMatrix::from_reader("1 1 0\n0 1 1\n".as_bytes(), 2, 3)?;
//! let family = dualize(&matrix, SearchConfig::default())?;
//!
//! // { 1 } hits both rows; { 0 2 } hits one row each
//! assert_eq!(family.len(), 2);
//! # bitdual::Result::Ok(())
//! ```

#![allow(
    clippy::needless_range_loop,
    clippy::uninlined_format_args,
    clippy::bool_assert_comparison,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]
pub mod bitmatrix;
pub mod bitset;
pub mod combine;
pub mod engine;
pub mod error;
pub mod partial;
pub mod support;

pub use bitmatrix::{BitMatrix, BitRow};
pub use bitset::{BitBlock, BitSet, BLOCKSIZE};
pub use combine::{combine, CombineMode};
pub use engine::{
    dualize, dualize_pair_alternating, dualize_pair_simultaneous, CoveragePair, CoverageSet,
    EnumerationMode, PivotPolicy, SearchConfig, TransversalFamily,
};
pub use error::{Error, Result};
pub use partial::PartialMatrix;
pub use support::SupportRegistry;
