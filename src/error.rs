//! Error types for stitchann.

use thiserror::Error;

/// Errors that can occur during index construction or search.
///
/// Contract violations (mismatched dimensions, empty estimator input, a
/// degree bound at or above the corpus size, out-of-range parameters) abort
/// the enclosing call. Sparse-data conditions — an entry set that matches no
/// label, a query far from every point — are *not* errors; they degrade to
/// an empty or undersized result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Coordinate vectors of different lengths were compared.
    #[error("dimension mismatch: {left} vs {right} coordinates")]
    DimensionMismatch { left: usize, right: usize },

    /// An estimator was called on zero points.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// The degree bound R must stay below the corpus size.
    #[error("max degree {degree} must be smaller than corpus size {corpus}")]
    DegreeExceedsCorpus { degree: usize, corpus: usize },

    /// A numeric parameter is outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
