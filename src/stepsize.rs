//! Adaptive step-size policy for big-batch SGD.

use crate::error::{Result, StepsizeError};
use crate::function::DecomposableFunction;
use crate::line_search::BacktrackingLineSearch;
use crate::tensor::{dot, l2_norm, squared_l2_norm, Scalar, Tensor};

/// Scalar outputs of a single [`AdaptiveStepsize::update`] call.
#[derive(Clone, Copy, Debug)]
pub struct StepsizeUpdate {
    /// Step size after decay, smoothing, and the post-step line search.
    pub step_size: f64,
    /// Squared L2 norm of the averaged extended-batch gradient.
    pub gradient_norm: f64,
    /// Dispersion accumulated over the per-sample gradients of the extended
    /// batch.
    pub sample_variance: f64,
}

/// Non-monotonic step-size scheme that uses curvature estimates to propose
/// new step-size choices.
///
/// The policy keeps the previous iterate as private state, so a single
/// instance serves exactly one optimization run and must not be shared
/// between concurrent runs.
#[derive(Clone, Debug)]
pub struct AdaptiveStepsize {
    /// Acceptance and termination parameters of the inner line search.
    pub line_search: BacktrackingLineSearch,
    iterate_prev: Option<Tensor>,
}

impl Default for AdaptiveStepsize {
    fn default() -> Self {
        Self {
            line_search: BacktrackingLineSearch::default(),
            iterate_prev: None,
        }
    }
}

impl AdaptiveStepsize {
    /// Create a policy from the two line-search parameters.
    ///
    /// Neither parameter is validated; both are expected in (0, 1).
    pub fn new(backtrack_step_size: f64, search_parameter: f64) -> Self {
        Self {
            line_search: BacktrackingLineSearch::new(backtrack_step_size, search_parameter),
            iterate_prev: None,
        }
    }

    /// The iterate recorded at the end of the last [`update`](Self::update)
    /// call, if any.
    pub fn previous_iterate(&self) -> Option<&Tensor> {
        self.iterate_prev.as_ref()
    }

    /// Perform one adaptive step-size iteration.
    ///
    /// Line-searches the incoming `step_size`, applies the descent step
    /// `iterate -= step_size * gradient`, re-estimates the gradient one
    /// sample at a time over `[offset, offset + backtracking_batch_size)`,
    /// turns the secant curvature between the two iterates into a step-size
    /// decay blended by `batch_size / num_functions`, and line-searches the
    /// result again. On return `iterate` holds the updated parameters and
    /// `gradient` the gradient averaged over the extended batch.
    ///
    /// A non-finite curvature ratio is treated as zero, which disables decay
    /// for the round, as does `batch_size <= 1` when the batch does not
    /// cover the whole dataset. The `reset` flag is accepted for
    /// compatibility with batch-growing drivers but is currently never
    /// consulted.
    #[allow(clippy::too_many_arguments)]
    pub fn update<F: DecomposableFunction>(
        &mut self,
        function: &mut F,
        step_size: f64,
        iterate: &mut Tensor,
        gradient: &mut Tensor,
        gradient_norm: f64,
        offset: usize,
        batch_size: usize,
        backtracking_batch_size: usize,
        reset: bool,
    ) -> Result<StepsizeUpdate> {
        let _ = reset;

        if backtracking_batch_size == 0 {
            return Err(StepsizeError::invalid_batch_size(
                "backtracking batch size must be at least 1",
            ));
        }
        if iterate.shape() != gradient.shape() {
            return Err(StepsizeError::dimension_mismatch(
                iterate.shape(),
                gradient.shape(),
            ));
        }
        if let Some(prev) = &self.iterate_prev {
            if prev.shape() != iterate.shape() {
                return Err(StepsizeError::dimension_mismatch(
                    prev.shape(),
                    iterate.shape(),
                ));
            }
        }
        let num_functions = function.num_functions();
        assert!(num_functions > 0, "objective must contain at least one sample");
        assert!(
            offset + backtracking_batch_size <= num_functions,
            "sample range out of bounds"
        );

        let mut step_size = self.line_search.search(
            function,
            step_size,
            iterate,
            gradient,
            gradient_norm,
            offset,
            backtracking_batch_size,
        )?;

        iterate.scaled_add(-(step_size as Scalar), gradient);

        let iterate_prev = self
            .iterate_prev
            .get_or_insert_with(|| Tensor::zeros(iterate.raw_dim()));

        let mut gradient_prev_sum = Tensor::zeros(iterate.raw_dim());
        function.gradient(iterate, offset, gradient, 1);
        function.gradient(iterate_prev, offset, &mut gradient_prev_sum, 1);

        let mut sample_gradient = Tensor::zeros(iterate.raw_dim());
        let mut sample_gradient_prev = Tensor::zeros(iterate.raw_dim());
        let mut running_mean = gradient.clone();
        let mut dispersion = 0.0f64;

        for j in 1..backtracking_batch_size {
            function.gradient(iterate, offset + j, &mut sample_gradient, 1);

            // Incremental mean over the per-sample gradients seen so far.
            let deviation = &sample_gradient - &running_mean;
            let mut next_mean = running_mean.clone();
            next_mean.scaled_add(1.0 / j as Scalar, &deviation);

            dispersion += l2_norm(&deviation) * l2_norm(&(&sample_gradient - &next_mean));

            running_mean = next_mean;
            *gradient += &sample_gradient;

            function.gradient(iterate_prev, offset + j, &mut sample_gradient_prev, 1);
            gradient_prev_sum += &sample_gradient_prev;
        }

        let sample_variance = dispersion;
        let averaged = gradient.mapv(|g| g / backtracking_batch_size as Scalar);
        let gradient_norm = squared_l2_norm(&averaged);

        // Curvature of the secant between the two iterates. If it cannot be
        // computed, call it 0, which keeps the step size from decaying.
        let displacement = &*iterate - &*iterate_prev;
        let gradient_change = &*gradient - &gradient_prev_sum;
        let ratio = dot(&displacement, &gradient_change) / squared_l2_norm(&displacement);
        let curvature = if ratio.is_finite() { ratio } else { 0.0 };

        iterate_prev.assign(iterate);

        let mut step_size_decay = 0.0;
        if gradient_norm != 0.0 && sample_variance != 0.0 && batch_size != 0 && curvature != 0.0 {
            if batch_size < num_functions {
                // The bias-corrected branch needs at least two samples.
                if batch_size > 1 {
                    step_size_decay = (1.0
                        - (sample_variance / (batch_size as f64 - 1.0))
                            / (batch_size as f64 * gradient_norm))
                        / curvature;
                }
            } else {
                step_size_decay = 1.0 / curvature;
            }
        }
        if !step_size_decay.is_finite() {
            step_size_decay = 0.0;
        }

        // Step-size smoothing weighted by the batch fraction of the dataset.
        let batch_fraction = batch_size as f64 / num_functions as f64;
        step_size = step_size * (1.0 - batch_fraction) + step_size_decay * batch_fraction;

        gradient.assign(&averaged);

        let step_size = self.line_search.search(
            function,
            step_size,
            iterate,
            gradient,
            gradient_norm,
            offset,
            backtracking_batch_size,
        )?;

        Ok(StepsizeUpdate {
            step_size,
            gradient_norm,
            sample_variance,
        })
    }
}
