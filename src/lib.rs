//! Adaptive step-size control for big-batch stochastic gradient descent.
//!
//! This crate provides the step-size strategy from "Big Batch SGD: Automated
//! Inference using Adaptive Batch Sizes" (De et al., 2017): a backtracking
//! line search paired with online curvature and gradient-dispersion
//! estimates that propose the step size for the next iteration. The outer
//! optimization loop, the objective implementations, and batch/offset
//! bookkeeping stay with the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod function;
pub mod line_search;
pub mod stepsize;
pub mod tensor;
pub mod test_utils;

pub use error::{Result, StepsizeError};
pub use function::DecomposableFunction;
pub use line_search::{
    BacktrackingLineSearch, DEFAULT_BACKTRACK_STEP_SIZE, DEFAULT_MAX_SHRINK_STEPS,
    DEFAULT_MIN_STEP_SIZE, DEFAULT_SEARCH_PARAMETER,
};
pub use stepsize::{AdaptiveStepsize, StepsizeUpdate};
pub use tensor::{dot, l2_norm, squared_l2_norm, Scalar, Tensor};

/// Common imports for downstream users.
pub mod prelude {
    pub use crate::{
        dot, l2_norm, squared_l2_norm, AdaptiveStepsize, BacktrackingLineSearch,
        DecomposableFunction, Result, Scalar, StepsizeError, StepsizeUpdate, Tensor,
    };
}
