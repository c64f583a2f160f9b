//! Tensor types and low-level numeric helpers.

use ndarray::ArrayD;

/// Scalar type (f64 by default, f32 with feature flag).
#[cfg(not(feature = "f32"))]
pub type Scalar = f64;

/// Scalar type (f64 by default, f32 with feature flag).
#[cfg(feature = "f32")]
pub type Scalar = f32;

/// Dynamic-dimensional tensor.
pub type Tensor = ArrayD<Scalar>;

/// Compute the squared L2 norm of a tensor, handling NaN/inf.
pub fn squared_l2_norm(t: &Tensor) -> f64 {
    let mut sum_sq: f64 = 0.0;
    for &v in t.iter() {
        let v = v as f64;
        if v.is_nan() {
            return f64::NAN;
        }
        if !v.is_finite() {
            return f64::INFINITY;
        }
        sum_sq += v * v;
    }
    sum_sq
}

/// Compute the L2 norm of a tensor, handling NaN/inf.
pub fn l2_norm(t: &Tensor) -> f64 {
    squared_l2_norm(t).sqrt()
}

/// Frobenius inner product of two same-shaped tensors.
///
/// Equals `trace(aᵀ · b)` for matrices.
pub fn dot(a: &Tensor, b: &Tensor) -> f64 {
    assert_eq!(a.shape(), b.shape(), "dot requires matching shapes");
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x as f64 * y as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_squared_l2_norm() {
        let t = array![3.0, 4.0].into_dyn();
        assert!((squared_l2_norm(&t) - 25.0).abs() < 1e-10);
        assert!((l2_norm(&t) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_norm_propagates_nan_and_inf() {
        let t = array![1.0, f64::NAN, 2.0].into_dyn();
        assert!(squared_l2_norm(&t).is_nan());
        let t = array![1.0, f64::INFINITY].into_dyn();
        assert!(squared_l2_norm(&t).is_infinite());
    }

    #[test]
    fn test_dot_matches_trace_form() {
        let a = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let b = array![[5.0, 6.0], [7.0, 8.0]].into_dyn();
        assert!((dot(&a, &b) - 70.0).abs() < 1e-10);
    }
}
