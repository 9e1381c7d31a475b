//! Non-negative least squares by the Lawson-Hanson active-set method.
//!
//! The problem is given in Gram form,
//! `min_{x >= 0} ½ xᵀ G x - bᵀ x`,
//! with `G = Zᵀ W Z` and `b = Zᵀ W y`.
use crate::{
    common::{
        constants::{NNLS_ITER_PER_COLUMN, NUMERIC_TOLERANCE},
        linalg,
    },
    OptimizerError,
};


/// Solves the NNLS problem for the Gram matrix `gram` and vector `rhs`.
pub(crate) fn nnls_gram(gram: &[Vec<f64>], rhs: &[f64])
    -> Result<Vec<f64>, OptimizerError>
{
    let k = rhs.len();
    let max_iter = NNLS_ITER_PER_COLUMN * k.max(1);
    let scale = rhs.iter().fold(0f64, |m, b| m.max(b.abs()));
    let tol = NUMERIC_TOLERANCE * (1.0 + scale);

    let mut x = vec![0f64; k];
    let mut passive = vec![false; k];
    let mut iter = 0;

    loop {
        let grad = negative_gradient(gram, rhs, &x);
        let next = (0..k)
            .filter(|&j| !passive[j])
            .max_by(|&a, &b| grad[a].total_cmp(&grad[b]));

        let j = match next {
            Some(j) if grad[j] > tol => j,
            _ => break,
        };
        passive[j] = true;

        // Inner loop: keep the passive solution feasible.
        loop {
            iter += 1;
            if iter > max_iter {
                return Err(OptimizerError::NotConverged(max_iter));
            }

            let s = solve_passive(gram, rhs, &passive)?;
            let infeasible = (0..k)
                .any(|j| passive[j] && s[j] <= tol);
            if !infeasible {
                x = s;
                break;
            }

            let alpha = (0..k)
                .filter(|&j| passive[j] && s[j] <= tol)
                .map(|j| x[j] / (x[j] - s[j]))
                .fold(f64::INFINITY, f64::min)
                .clamp(0.0, 1.0);

            for j in 0..k {
                x[j] += alpha * (s[j] - x[j]);
                if passive[j] && x[j] <= tol {
                    passive[j] = false;
                    x[j] = 0.0;
                }
            }
        }
    }

    Ok(x)
}


/// Returns `b - G x`.
fn negative_gradient(gram: &[Vec<f64>], rhs: &[f64], x: &[f64]) -> Vec<f64> {
    gram.iter()
        .zip(rhs)
        .map(|(row, b)| {
            b - row.iter().zip(x).map(|(g, v)| g * v).sum::<f64>()
        })
        .collect()
}


/// Solves the unconstrained problem on the passive set.
/// Entries outside the passive set are `0`.
fn solve_passive(gram: &[Vec<f64>], rhs: &[f64], passive: &[bool])
    -> Result<Vec<f64>, OptimizerError>
{
    let index = (0..rhs.len())
        .filter(|&j| passive[j])
        .collect::<Vec<_>>();
    let sub = index.iter()
        .map(|&a| index.iter().map(|&b| gram[a][b]).collect())
        .collect::<Vec<Vec<f64>>>();
    let b = index.iter().map(|&a| rhs[a]).collect::<Vec<_>>();

    let s = linalg::solve(sub, b).ok_or(OptimizerError::Singular)?;

    let mut full = vec![0f64; rhs.len()];
    index.into_iter()
        .zip(s)
        .for_each(|(j, v)| full[j] = v);
    Ok(full)
}


/// Weighted NNLS of `y` on the columns of `z`.
pub(crate) fn nnls(z: &[&[f64]], y: &[f64], weights: &[f64])
    -> Result<Vec<f64>, OptimizerError>
{
    let (gram, rhs) = linalg::weighted_normal_equations(z, weights, y);
    nnls_gram(&gram, &rhs)
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_recovers_nonnegative_coefficients() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [1.0, 0.0, 1.0, 0.0, 1.0];
        let y = a.iter()
            .zip(&b)
            .map(|(x, z)| 0.3 * x + 0.7 * z)
            .collect::<Vec<_>>();

        let x = nnls(&[&a, &b], &y, &[1.0; 5]).unwrap();
        assert_abs_diff_eq!(x[0], 0.3, epsilon = 1e-8);
        assert_abs_diff_eq!(x[1], 0.7, epsilon = 1e-8);
    }

    #[test]
    fn test_clips_negative_coefficients() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [4.0, 3.0, 2.0, 1.0];
        let y = [1.0, 2.0, 3.0, 4.0];

        let x = nnls(&[&a, &b], &y, &[1.0; 4]).unwrap();
        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-8);
        assert_eq!(x[1], 0.0);
    }

    #[test]
    fn test_zero_solution() {
        let a = [1.0, 1.0];
        let y = [-1.0, -2.0];
        let x = nnls(&[&a], &y, &[1.0, 1.0]).unwrap();
        assert_eq!(x, vec![0.0]);
    }
}
