//! Euclidean distance for dense coordinate vectors.
//!
//! The index family in this crate is defined over L2 geometry only, so this
//! module stays deliberately small: one checked entry point for callers with
//! unvalidated data, and an unchecked kernel for the traversal hot paths.
//! [`Graph::new`](crate::graph::Graph::new) rejects mixed dimensionality at
//! ingestion, which is what makes the kernel safe to use internally.

use crate::error::{IndexError, Result};

/// Euclidean (L2) distance between two coordinate vectors.
///
/// Returns [`IndexError::DimensionMismatch`] when the slices differ in
/// length. Symmetric, deterministic, and zero exactly for coordinate-equal
/// inputs.
#[inline]
pub fn euclidean(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(IndexError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(l2(a, b))
}

/// L2 distance for slices already known to have equal length.
#[inline]
#[must_use]
pub(crate) fn l2(a: &[f32], b: &[f32]) -> f32 {
    let sum: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    sum.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_is_zero_for_identical() {
        let a = [1.0_f32, 2.0, 3.0];
        assert_eq!(euclidean(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn euclidean_matches_hand_computation() {
        let a = [0.0_f32, 0.0];
        let b = [3.0_f32, 4.0];
        let d = euclidean(&a, &b).unwrap();
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn euclidean_is_symmetric() {
        let a = [0.5_f32, -1.0, 2.0];
        let b = [1.5_f32, 0.25, -0.75];
        let d1 = euclidean(&a, &b).unwrap();
        let d2 = euclidean(&b, &a).unwrap();
        assert_eq!(d1, d2);
    }

    #[test]
    fn euclidean_rejects_mismatched_dimensions() {
        let a = [1.0_f32, 2.0];
        let b = [1.0_f32, 2.0, 3.0];
        assert_eq!(
            euclidean(&a, &b),
            Err(IndexError::DimensionMismatch { left: 2, right: 3 })
        );
    }
}
