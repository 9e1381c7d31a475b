//! Non-negative logistic stacking.
//!
//! Fits `P(y = 1) = sigmoid(Σ_j β_j logit(z_j))` with `β >= 0`
//! by IRLS, solving each weighted least-squares step by NNLS.
use crate::{
    common::{
        constants::{IRLS_MAX_ITER, NUMERIC_TOLERANCE},
        linalg,
        utils,
    },
    OptimizerError,
};
use super::nnls::nnls_gram;


/// Lower bound of the working weights `μ (1 - μ)`.
const MIN_WORKING_WEIGHT: f64 = 1e-10;
/// Maximal number of step halvings per iteration.
const MAX_HALVING: usize = 30;


/// Returns the non-negative coefficients `β` (not normalized).
pub(crate) fn nn_loglik(z: &[&[f64]], y: &[f64], weights: &[f64])
    -> Result<Vec<f64>, OptimizerError>
{
    let k = z.len();
    let n = y.len();
    let x = z.iter()
        .map(|col| col.iter().map(|&p| utils::logit(p)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut beta = vec![1.0 / k as f64; k];
    let mut dev = deviance(&x, y, weights, &beta);

    for _ in 0..IRLS_MAX_ITER {
        let eta = linear_predictor(&x, &beta, n);

        let (work_w, work_y): (Vec<f64>, Vec<f64>) = eta.iter()
            .zip(y)
            .zip(weights)
            .map(|((&e, &t), &w)| {
                let mu = utils::sigmoid(e);
                let v = (mu * (1.0 - mu)).max(MIN_WORKING_WEIGHT);
                (w * v, e + (t - mu) / v)
            })
            .unzip();

        let columns = x.iter().map(|c| &c[..]).collect::<Vec<_>>();
        let (gram, rhs) = linalg::weighted_normal_equations(
            &columns, &work_w, &work_y,
        );
        let proposal = nnls_gram(&gram, &rhs)?;

        // Step halving keeps the deviance non-increasing.
        let mut step = 1.0;
        let mut next = proposal.clone();
        let mut next_dev = deviance(&x, y, weights, &next);
        let mut halving = 0;
        while next_dev > dev && halving < MAX_HALVING {
            step *= 0.5;
            next = beta.iter()
                .zip(&proposal)
                .map(|(b, p)| b + step * (p - b))
                .collect();
            next_dev = deviance(&x, y, weights, &next);
            halving += 1;
        }

        let converged = (dev - next_dev).abs()
            <= NUMERIC_TOLERANCE * (next_dev.abs() + 0.1);
        beta = next;
        dev = next_dev.min(dev);
        if converged {
            return Ok(beta);
        }
    }
    Err(OptimizerError::NotConverged(IRLS_MAX_ITER))
}


fn linear_predictor(x: &[Vec<f64>], beta: &[f64], n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| x.iter().zip(beta).map(|(c, b)| b * c[i]).sum::<f64>())
        .collect()
}


/// Weighted binomial deviance of `sigmoid(x β)`.
fn deviance(x: &[Vec<f64>], y: &[f64], weights: &[f64], beta: &[f64])
    -> f64
{
    linear_predictor(x, beta, y.len())
        .into_iter()
        .zip(y)
        .zip(weights)
        .map(|((e, &t), &w)| {
            let p = utils::clamp_probability(utils::sigmoid(e));
            -2.0 * w * (t * p.ln() + (1.0 - t) * (1.0 - p).ln())
        })
        .sum()
}
