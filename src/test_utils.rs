//! Synthetic objective functions for tests and benchmarks.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::function::DecomposableFunction;
use crate::tensor::{dot, squared_l2_norm, Scalar, Tensor};

/// Sphere objective: every sample contributes `f(x) = xᵀx` with gradient
/// `2x`.
#[derive(Clone, Debug)]
pub struct SphereFunction {
    num_functions: usize,
}

impl SphereFunction {
    /// Create a sphere objective reporting `num_functions` samples.
    pub fn new(num_functions: usize) -> Self {
        Self { num_functions }
    }
}

impl DecomposableFunction for SphereFunction {
    fn evaluate(&mut self, iterate: &Tensor, _offset: usize, batch_size: usize) -> Scalar {
        (batch_size as f64 * dot(iterate, iterate)) as Scalar
    }

    fn gradient(
        &mut self,
        iterate: &Tensor,
        _offset: usize,
        gradient: &mut Tensor,
        batch_size: usize,
    ) {
        gradient.assign(iterate);
        gradient.mapv_inplace(|x| x * (2.0 * batch_size as f64) as Scalar);
    }

    fn num_functions(&self) -> usize {
        self.num_functions
    }
}

/// Linear objective: every sample contributes `f(x) = slopeᵀx` with the
/// constant gradient `slope`.
#[derive(Clone, Debug)]
pub struct LinearFunction {
    slope: Tensor,
    num_functions: usize,
}

impl LinearFunction {
    /// Create a linear objective with the given per-sample slope.
    pub fn new(slope: Tensor, num_functions: usize) -> Self {
        Self {
            slope,
            num_functions,
        }
    }
}

impl DecomposableFunction for LinearFunction {
    fn evaluate(&mut self, iterate: &Tensor, _offset: usize, batch_size: usize) -> Scalar {
        (batch_size as f64 * dot(&self.slope, iterate)) as Scalar
    }

    fn gradient(
        &mut self,
        _iterate: &Tensor,
        _offset: usize,
        gradient: &mut Tensor,
        batch_size: usize,
    ) {
        gradient.assign(&self.slope);
        gradient.mapv_inplace(|x| x * batch_size as Scalar);
    }

    fn num_functions(&self) -> usize {
        self.num_functions
    }
}

/// Quadratic objective with one center per sample:
/// `fᵢ(x) = ‖x − cᵢ‖²` with gradient `2(x − cᵢ)`.
///
/// Samples are visited through an internal ordering that can be shuffled,
/// and evaluate/gradient calls are counted.
#[derive(Clone, Debug)]
pub struct CenteredQuadratic {
    centers: Vec<Tensor>,
    order: Vec<usize>,
    /// Number of `evaluate` calls made against this objective.
    pub evaluations: usize,
    /// Number of `gradient` calls made against this objective.
    pub gradient_calls: usize,
}

impl CenteredQuadratic {
    /// Create a quadratic objective from one center per sample.
    pub fn new(centers: Vec<Tensor>) -> Self {
        let order = (0..centers.len()).collect();
        Self {
            centers,
            order,
            evaluations: 0,
            gradient_calls: 0,
        }
    }

    /// Shuffle the sample visitation order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order.shuffle(rng);
    }
}

impl DecomposableFunction for CenteredQuadratic {
    fn evaluate(&mut self, iterate: &Tensor, offset: usize, batch_size: usize) -> Scalar {
        self.evaluations += 1;
        let mut total = 0.0f64;
        for j in offset..offset + batch_size {
            let center = &self.centers[self.order[j]];
            total += squared_l2_norm(&(iterate - center));
        }
        total as Scalar
    }

    fn gradient(
        &mut self,
        iterate: &Tensor,
        offset: usize,
        gradient: &mut Tensor,
        batch_size: usize,
    ) {
        self.gradient_calls += 1;
        gradient.fill(0.0 as Scalar);
        for j in offset..offset + batch_size {
            let center = &self.centers[self.order[j]];
            let mut term = iterate - center;
            term.mapv_inplace(|v| v * (2.0 as Scalar));
            *gradient += &term;
        }
    }

    fn num_functions(&self) -> usize {
        self.centers.len()
    }
}

/// Constant objective whose value never decreases along any direction, used
/// to drive the line search into its divergence path.
#[derive(Clone, Debug)]
pub struct PlateauFunction {
    value: Scalar,
    num_functions: usize,
}

impl PlateauFunction {
    /// Create a plateau objective with the given constant value.
    pub fn new(value: Scalar, num_functions: usize) -> Self {
        Self {
            value,
            num_functions,
        }
    }
}

impl DecomposableFunction for PlateauFunction {
    fn evaluate(&mut self, _iterate: &Tensor, _offset: usize, _batch_size: usize) -> Scalar {
        self.value
    }

    fn gradient(
        &mut self,
        _iterate: &Tensor,
        _offset: usize,
        gradient: &mut Tensor,
        _batch_size: usize,
    ) {
        gradient.fill(0.0 as Scalar);
    }

    fn num_functions(&self) -> usize {
        self.num_functions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sphere_matches_closed_form() {
        let mut sphere = SphereFunction::new(3);
        let x = array![1.0, 2.0].into_dyn();
        assert!((sphere.evaluate(&x, 0, 3) as f64 - 15.0).abs() < 1e-10);

        let mut g = Tensor::zeros(x.raw_dim());
        sphere.gradient(&x, 0, &mut g, 1);
        assert_eq!(g, array![2.0, 4.0].into_dyn());
    }

    #[test]
    fn centered_quadratic_sums_over_range() {
        let mut quadratic = CenteredQuadratic::new(vec![
            array![1.0, 0.0].into_dyn(),
            array![-1.0, 0.0].into_dyn(),
        ]);
        let x = array![0.0, 0.0].into_dyn();
        assert!((quadratic.evaluate(&x, 0, 2) as f64 - 2.0).abs() < 1e-10);

        let mut g = Tensor::zeros(x.raw_dim());
        quadratic.gradient(&x, 1, &mut g, 1);
        assert_eq!(g, array![2.0, 0.0].into_dyn());
        assert_eq!(quadratic.evaluations, 1);
        assert_eq!(quadratic.gradient_calls, 1);
    }

    #[test]
    fn shuffle_permutes_but_preserves_full_batch() {
        let mut quadratic = CenteredQuadratic::new(vec![
            array![1.0, 0.0].into_dyn(),
            array![-1.0, 0.0].into_dyn(),
            array![0.0, 2.0].into_dyn(),
            array![3.0, 1.0].into_dyn(),
        ]);
        let x = array![0.5, -0.5].into_dyn();
        let before = quadratic.evaluate(&x, 0, 4) as f64;

        let mut rng = StdRng::seed_from_u64(7);
        quadratic.shuffle(&mut rng);
        let after = quadratic.evaluate(&x, 0, 4) as f64;
        assert!((before - after).abs() < 1e-10);
    }
}
