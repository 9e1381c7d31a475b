//! This file defines some functions that checks some pre-conditions
//! E.g., Shape of data
//!
//! Every checker returns a [`StackError`] describing the violated
//! precondition, so that the pipeline fails before any fit.

use crate::StackError;
use crate::common::constants::SIMPLEX_TOLERANCE;


/// Check the number of folds against the number of distinct units.
#[inline(always)]
pub(crate) fn n_folds(n_folds: usize, n_units: usize)
    -> Result<(), StackError>
{
    if n_folds < 2 {
        return Err(StackError::TooFewFolds(n_folds));
    }
    if n_folds > n_units {
        return Err(StackError::TooManyFolds { n_folds, n_units });
    }
    Ok(())
}


/// Check that the weights are aligned with the sample,
/// finite, non-negative, and not all zero.
#[inline(always)]
pub(crate) fn observation_weights(weights: &[f64], n_sample: usize)
    -> Result<(), StackError>
{
    if weights.len() != n_sample {
        return Err(StackError::LengthMismatch {
            what: "observation weights",
            expected: n_sample,
            got: weights.len(),
        });
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(StackError::InvalidWeights(
            format!("weights must be finite and non-negative, got {w}")
        ));
    }
    if weights.iter().all(|&w| w == 0.0) {
        return Err(StackError::InvalidWeights(
            "all weights are zero".to_string()
        ));
    }
    Ok(())
}


/// Check whether the given slice lies on the probability simplex.
#[inline(always)]
pub(crate) fn is_on_simplex(slice: &[f64]) -> bool {
    let sum = slice.iter().sum::<f64>();
    (sum - 1f64).abs() < SIMPLEX_TOLERANCE
        && slice.iter().all(|&s| s >= 0.0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_n_folds_success() {
        assert!(n_folds(2, 2).is_ok());
        assert!(n_folds(10, 1_000).is_ok());
    }

    #[test]
    fn test_n_folds_failure() {
        assert!(matches!(n_folds(1, 10), Err(StackError::TooFewFolds(1))));
        assert!(matches!(
            n_folds(5, 4),
            Err(StackError::TooManyFolds { n_folds: 5, n_units: 4 })
        ));
    }

    #[test]
    fn test_observation_weights() {
        assert!(observation_weights(&[1.0, 0.0], 2).is_ok());
        assert!(observation_weights(&[1.0], 2).is_err());
        assert!(observation_weights(&[1.0, -0.1], 2).is_err());
        assert!(observation_weights(&[0.0, 0.0], 2).is_err());
        assert!(observation_weights(&[f64::NAN, 1.0], 2).is_err());
    }

    #[test]
    fn test_simplex() {
        assert!(is_on_simplex(&[0.25, 0.75]));
        assert!(!is_on_simplex(&[0.5, 0.6]));
        assert!(!is_on_simplex(&[1.5, -0.5]));
    }
}
