//! This file provides some common functions
//! such as inner products and the logistic link.
use rayon::prelude::*;
use crate::common::constants::PROBABILITY_CLAMP;


/// Compute the inner-product of the given two slices.
#[inline(always)]
pub(crate) fn inner_product(v1: &[f64], v2: &[f64]) -> f64 {
    v1.iter()
        .zip(v2)
        .map(|(a, b)| a * b)
        .sum::<f64>()
}


/// Normalize `items` so that `\| items \|_1 = 1`.
/// All-zero slices are left untouched.
#[inline(always)]
pub(crate) fn normalize(items: &mut [f64]) {
    let z = items.iter()
        .map(|it| it.abs())
        .sum::<f64>();

    if z == 0.0 { return; }

    items.par_iter_mut()
        .for_each(|item| { *item /= z; });
}


/// Clamp a probability into `[ε, 1 - ε]`.
#[inline(always)]
pub(crate) fn clamp_probability(p: f64) -> f64 {
    p.clamp(PROBABILITY_CLAMP, 1.0 - PROBABILITY_CLAMP)
}


/// The logit link, `ln(p / (1 - p))`, on a clamped probability.
#[inline(always)]
pub(crate) fn logit(p: f64) -> f64 {
    let p = clamp_probability(p);
    (p / (1.0 - p)).ln()
}


/// The logistic function.
#[inline(always)]
pub(crate) fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}


/// Weighted mean of `values`.
/// Returns `None` if the weights sum to zero.
#[inline(always)]
pub(crate) fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    let total = weights.iter().sum::<f64>();
    if total <= 0.0 { return None; }
    let sum = inner_product(values, weights);
    Some(sum / total)
}


/// Returns the first index among `indices` whose entry is minimal.
/// Non-finite entries are treated as `+∞`.
pub(crate) fn argmin_among<I>(arr: &[f64], indices: I) -> Option<usize>
    where I: IntoIterator<Item = usize>,
{
    indices.into_iter()
        .map(|i| {
            let v = if arr[i].is_finite() { arr[i] } else { f64::INFINITY };
            (i, v)
        })
        .fold(None, |acc: Option<(usize, f64)>, (i, v)| match acc {
            Some((_, best)) if best <= v => acc,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logit_is_inverse_of_sigmoid() {
        for p in [0.1, 0.25, 0.5, 0.9] {
            assert!((sigmoid(logit(p)) - p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_argmin_prefers_first_tie() {
        let arr = [3.0, 1.0, 1.0, f64::NAN];
        assert_eq!(argmin_among(&arr, 0..4), Some(1));
        assert_eq!(argmin_among(&arr, [0, 3]), Some(0));
        assert_eq!(argmin_among(&arr, std::iter::empty()), None);
    }

    #[test]
    fn test_normalize() {
        let mut w = vec![1.0, 3.0];
        normalize(&mut w);
        assert_eq!(w, vec![0.25, 0.75]);

        let mut z = vec![0.0, 0.0];
        normalize(&mut z);
        assert_eq!(z, vec![0.0, 0.0]);
    }
}
