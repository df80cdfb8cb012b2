//! Error types shared by the classifier and the metrics module.

use thiserror::Error;

/// Result type alias for classifier and metrics operations.
pub type Result<T> = std::result::Result<T, KnnError>;

/// Errors surfaced by the k-nearest-neighbor pipeline.
///
/// All variants are detected eagerly at the API boundary, before any
/// distance computation starts. There is no recovery path inside the
/// crate; the caller decides whether to re-fit, resize `k`, or abort.
#[derive(Error, Debug)]
pub enum KnnError {
    /// Two paired arrays disagree on a dimension (query vs. training
    /// features, training samples vs. labels, matrix columns vs.
    /// training size).
    #[error("shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Which pairing failed.
        what: &'static str,
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// A caller-supplied parameter is outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// `compute_distances` or `predict` was invoked before a successful
    /// `fit` bound training data.
    #[error("model has not been fitted; call fit() first")]
    NotFitted,
}
