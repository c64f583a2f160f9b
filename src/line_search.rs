//! Backtracking line search with an Armijo–Goldstein acceptance rule.

use crate::error::{Result, StepsizeError};
use crate::function::DecomposableFunction;
use crate::tensor::{Scalar, Tensor};

/// Default multiplicative shrink factor per line-search step.
pub const DEFAULT_BACKTRACK_STEP_SIZE: f64 = 0.5;

/// Default sufficient-decrease strictness.
pub const DEFAULT_SEARCH_PARAMETER: f64 = 0.1;

/// Default cap on the number of shrink steps before the search fails.
pub const DEFAULT_MAX_SHRINK_STEPS: usize = 100;

/// Default floor below which a shrinking step size is considered diverged.
pub const DEFAULT_MIN_STEP_SIZE: f64 = 1e-15;

/// Backtracking line search along the negative gradient direction.
///
/// Starting from a trial step size `s`, candidate iterates
/// `iterate - s * gradient` are evaluated and `s` is multiplied by
/// `backtrack_step_size` until the sufficient-decrease condition
///
/// ```text
/// f(iterate - s * gradient) <= f(iterate) - search_parameter * s * gradient_norm
/// ```
///
/// holds, where `gradient_norm` is the squared L2 norm of the descent
/// direction. The search only ever shrinks the trial step size.
#[derive(Clone, Copy, Debug)]
pub struct BacktrackingLineSearch {
    /// Multiplicative shrink factor per shrink step, expected in (0, 1).
    pub backtrack_step_size: f64,
    /// Sufficient-decrease strictness, expected in (0, 1). Larger values
    /// demand more decrease before accepting a step.
    pub search_parameter: f64,
    /// Cap on shrink steps before the search fails.
    pub max_shrink_steps: usize,
    /// Floor below which a shrinking step size is considered diverged.
    pub min_step_size: f64,
}

impl Default for BacktrackingLineSearch {
    fn default() -> Self {
        Self::new(DEFAULT_BACKTRACK_STEP_SIZE, DEFAULT_SEARCH_PARAMETER)
    }
}

impl BacktrackingLineSearch {
    /// Create a line search from the two acceptance parameters.
    ///
    /// Neither parameter is validated; both are expected in (0, 1).
    pub fn new(backtrack_step_size: f64, search_parameter: f64) -> Self {
        Self {
            backtrack_step_size,
            search_parameter,
            max_shrink_steps: DEFAULT_MAX_SHRINK_STEPS,
            min_step_size: DEFAULT_MIN_STEP_SIZE,
        }
    }

    /// Adjust the termination limits.
    pub fn with_limits(mut self, max_shrink_steps: usize, min_step_size: f64) -> Self {
        self.max_shrink_steps = max_shrink_steps;
        self.min_step_size = min_step_size;
        self
    }

    /// Shrink `step_size` until sufficient decrease holds over the samples
    /// `[offset, offset + batch_size)`.
    ///
    /// Returns the accepted step size, which never exceeds the input. Fails
    /// with [`StepsizeError::LineSearchDivergence`] once `max_shrink_steps`
    /// shrink steps have been taken or the next candidate step size would
    /// fall below `min_step_size`.
    pub fn search<F: DecomposableFunction>(
        &self,
        function: &mut F,
        mut step_size: f64,
        iterate: &Tensor,
        gradient: &Tensor,
        gradient_norm: f64,
        offset: usize,
        batch_size: usize,
    ) -> Result<f64> {
        let objective = function.evaluate(iterate, offset, batch_size) as f64;

        let mut update = candidate(iterate, step_size, gradient);
        let mut objective_update = function.evaluate(&update, offset, batch_size) as f64;

        let mut shrinks = 0usize;
        while objective_update > objective - self.search_parameter * step_size * gradient_norm {
            if shrinks == self.max_shrink_steps
                || step_size * self.backtrack_step_size < self.min_step_size
            {
                return Err(StepsizeError::LineSearchDivergence {
                    iterations: shrinks,
                    step_size,
                });
            }
            step_size *= self.backtrack_step_size;
            shrinks += 1;

            update = candidate(iterate, step_size, gradient);
            objective_update = function.evaluate(&update, offset, batch_size) as f64;
        }

        Ok(step_size)
    }
}

fn candidate(iterate: &Tensor, step_size: f64, gradient: &Tensor) -> Tensor {
    let mut next = iterate.clone();
    next.scaled_add(-(step_size as Scalar), gradient);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::squared_l2_norm;
    use crate::test_utils::{PlateauFunction, SphereFunction};
    use ndarray::array;

    #[test]
    fn accepts_satisfying_step_unchanged() {
        let mut sphere = SphereFunction::new(1);
        let iterate = array![10.0, 10.0].into_dyn();
        let gradient = iterate.mapv(|x| 2.0 * x);
        let norm = squared_l2_norm(&gradient);

        let search = BacktrackingLineSearch::default();
        let step = search
            .search(&mut sphere, 0.5, &iterate, &gradient, norm, 0, 1)
            .unwrap();
        assert_eq!(step, 0.5);
    }

    #[test]
    fn shrinks_geometrically_until_sufficient_decrease() {
        let mut sphere = SphereFunction::new(1);
        let iterate = array![10.0, 10.0].into_dyn();
        let gradient = iterate.mapv(|x| 2.0 * x);
        let norm = squared_l2_norm(&gradient);

        let search = BacktrackingLineSearch::default();
        let step = search
            .search(&mut sphere, 10.0, &iterate, &gradient, norm, 0, 1)
            .unwrap();
        // For f(x) = xᵀx the condition holds exactly when s <= 0.9, so the
        // first accepted candidate is 10 * 0.5^4.
        assert_eq!(step, 0.625);
    }

    #[test]
    fn fails_after_shrink_cap_on_plateau() {
        let mut plateau = PlateauFunction::new(1.0, 4);
        let iterate = array![1.0, 1.0].into_dyn();
        let gradient = array![1.0, 1.0].into_dyn();

        let search = BacktrackingLineSearch::default().with_limits(8, 0.0);
        let err = search
            .search(&mut plateau, 1.0, &iterate, &gradient, 2.0, 0, 4)
            .unwrap_err();
        match err {
            StepsizeError::LineSearchDivergence {
                iterations,
                step_size,
            } => {
                assert_eq!(iterations, 8);
                assert!((step_size - 1.0 / 256.0).abs() < 1e-12);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fails_once_step_size_underflows_floor() {
        let mut plateau = PlateauFunction::new(1.0, 1);
        let iterate = array![1.0].into_dyn();
        let gradient = array![1.0].into_dyn();

        let search = BacktrackingLineSearch::default().with_limits(1000, 1e-3);
        let err = search
            .search(&mut plateau, 1.0, &iterate, &gradient, 1.0, 0, 1)
            .unwrap_err();
        match err {
            StepsizeError::LineSearchDivergence { step_size, .. } => {
                assert!(step_size >= 1e-3);
                assert!(step_size * 0.5 < 1e-3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
