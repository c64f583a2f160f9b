//! Objective function contract for decomposable losses.

use crate::tensor::{Scalar, Tensor};

/// A sum-decomposable objective `f(x) = Σᵢ fᵢ(x)` evaluated over contiguous
/// sample ranges.
///
/// Implementations may hold internal state (for example a shuffled sample
/// ordering), so the evaluation methods take `&mut self`. Sample ranges are
/// the caller's responsibility: `offset + batch_size` must not exceed
/// [`num_functions`](Self::num_functions).
pub trait DecomposableFunction {
    /// Loss summed over samples `[offset, offset + batch_size)`.
    fn evaluate(&mut self, iterate: &Tensor, offset: usize, batch_size: usize) -> Scalar;

    /// Write the gradient summed over samples `[offset, offset + batch_size)`
    /// into `gradient`. Must tolerate `batch_size == 1`.
    fn gradient(
        &mut self,
        iterate: &Tensor,
        offset: usize,
        gradient: &mut Tensor,
        batch_size: usize,
    );

    /// Total number of training samples.
    fn num_functions(&self) -> usize;
}
