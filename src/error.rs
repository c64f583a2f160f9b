//! Error types for step-size control operations.

/// Errors that can occur while controlling the step size.
#[derive(Debug, thiserror::Error)]
pub enum StepsizeError {
    /// The line search hit its shrink cap or step-size floor without finding
    /// a sufficient-decrease step.
    #[error(
        "line search failed to satisfy sufficient decrease after {iterations} shrink steps \
         (step size {step_size:.3e})"
    )]
    LineSearchDivergence {
        /// Number of shrink steps performed before giving up.
        iterations: usize,
        /// Step size at the point the search was abandoned.
        step_size: f64,
    },

    /// Two buffers that must share a shape do not.
    #[error("dimension mismatch: expected shape {expected:?}, got {found:?}")]
    DimensionMismatch {
        /// Shape required by the operation.
        expected: Vec<usize>,
        /// Shape actually provided.
        found: Vec<usize>,
    },

    /// A batch size the estimation phase cannot work with.
    #[error("invalid batch size: {msg}")]
    InvalidBatchSize {
        /// Human-readable error description.
        msg: String,
    },
}

/// Result type for step-size control operations.
pub type Result<T> = std::result::Result<T, StepsizeError>;

impl StepsizeError {
    /// Create a dimension mismatch error from two shapes.
    pub fn dimension_mismatch(expected: &[usize], found: &[usize]) -> Self {
        Self::DimensionMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// Create an invalid batch size error.
    pub fn invalid_batch_size<S: Into<String>>(msg: S) -> Self {
        Self::InvalidBatchSize { msg: msg.into() }
    }
}
