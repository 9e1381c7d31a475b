//! Weighted logistic regression fitted by
//! iteratively reweighted least squares (IRLS).
use serde::{Serialize, Deserialize};

use crate::{
    common::{
        constants::{IRLS_MAX_ITER, NUMERIC_TOLERANCE, RIDGE_JITTER},
        linalg,
        utils,
    },
    LearnerError,
    Regressor,
    Sample,
};
use super::core::{Learner, check_training_sample};
use super::linear::design_with_intercept;


/// Lower bound of the IRLS working weights `μ (1 - μ)`.
const MIN_WORKING_WEIGHT: f64 = 1e-10;


/// Weighted logistic regression with an intercept.
/// The target must lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub(crate) lambda_l2: f64,
    pub(crate) max_iter: usize,
}


/// The model returned by [`LogisticRegression`].
/// Predicts probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressor {
    pub(crate) intercept: f64,
    pub(crate) coefficients: Vec<f64>,
}


impl Default for LogisticRegression {
    fn default() -> Self {
        Self { lambda_l2: 0.0, max_iter: IRLS_MAX_ITER }
    }
}


impl LogisticRegression {
    /// Construct an unpenalized logistic regression.
    pub fn new() -> Self {
        Self::default()
    }


    /// Set the L2-regularization parameter.
    pub fn lambda_l2(mut self, lambda_l2: f64) -> Self {
        assert!(lambda_l2 >= 0.0, "lambda_l2 must be non-negative");
        self.lambda_l2 = lambda_l2;
        self
    }


    /// Set the maximal number of IRLS iterations.
    /// Default is `100`.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }
}


impl LogisticRegressor {
    /// Returns the intercept (log-odds scale).
    pub fn intercept(&self) -> f64 {
        self.intercept
    }


    /// Returns the slopes (log-odds scale).
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients[..]
    }
}


impl Learner for LogisticRegression {
    type Model = LogisticRegressor;


    fn name(&self) -> String {
        if self.lambda_l2 > 0.0 {
            format!("Logistic({})", self.lambda_l2)
        } else {
            "Logistic".to_string()
        }
    }


    fn fit(&self, sample: &Sample, weights: &[f64])
        -> Result<Self::Model, LearnerError>
    {
        check_training_sample(sample, weights)?;
        let target = sample.target();
        if let Some(y) = target.iter().find(|y| !(0.0..=1.0).contains(*y)) {
            return Err(LearnerError::InvalidTarget(
                format!("logistic regression needs y in [0, 1], got {y}")
            ));
        }

        let design = design_with_intercept(sample);
        let n_param = design.len();
        let total = weights.iter().sum::<f64>();

        // Start from the intercept-only solution.
        let mut beta = vec![0f64; n_param];
        beta[0] = utils::logit(
            utils::weighted_mean(target, weights)
                .ok_or(LearnerError::EmptySample)?
        );

        for _ in 0..self.max_iter {
            let eta = linear_predictor(&design, &beta);

            let mut working_weights = Vec::with_capacity(eta.len());
            let mut working_response = Vec::with_capacity(eta.len());
            for ((e, y), w) in eta.iter().zip(target).zip(weights) {
                let mu = utils::sigmoid(*e);
                let v = (mu * (1.0 - mu)).max(MIN_WORKING_WEIGHT);
                working_weights.push(w * v);
                working_response.push(e + (y - mu) / v);
            }

            let columns = design.iter()
                .map(|c| &c[..])
                .collect::<Vec<_>>();
            let (mut gram, rhs) = linalg::weighted_normal_equations(
                &columns, &working_weights, &working_response,
            );
            gram.iter_mut()
                .enumerate()
                .skip(1)
                .for_each(|(j, row)| {
                    row[j] += self.lambda_l2 * total + RIDGE_JITTER;
                });

            let next = linalg::solve(gram, rhs)
                .ok_or(LearnerError::Singular("logistic regression"))?;

            let step = next.iter()
                .zip(&beta)
                .map(|(a, b)| (a - b).abs())
                .fold(0f64, f64::max);
            let size = next.iter().fold(0f64, |m, b| m.max(b.abs()));
            beta = next;

            if step <= NUMERIC_TOLERANCE.sqrt() * (1.0 + size) {
                return Ok(LogisticRegressor {
                    intercept: beta[0],
                    coefficients: beta[1..].to_vec(),
                });
            }
        }

        Err(LearnerError::NotConverged {
            learner: "logistic regression",
            iterations: self.max_iter,
        })
    }
}


fn linear_predictor(design: &[Vec<f64>], beta: &[f64]) -> Vec<f64> {
    let n_sample = design[0].len();
    (0..n_sample)
        .map(|i| {
            design.iter()
                .zip(beta)
                .map(|(col, b)| b * col[i])
                .sum::<f64>()
        })
        .collect()
}


impl Regressor for LogisticRegressor {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        let eta = self.coefficients.iter()
            .enumerate()
            .map(|(j, b)| b * sample.value(row, j))
            .sum::<f64>()
            + self.intercept;
        utils::sigmoid(eta)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Feature;

    #[test]
    fn test_intercept_only_matches_mean() {
        let x = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let y = vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", x)], y,
        ).unwrap();

        let model = LogisticRegression::new()
            .fit(&sample, &[1.0; 6])
            .unwrap();
        let p = model.predict_all(&sample);
        // Group means are 1/3 (x = 0) and 2/3 (x = 1).
        assert!((p[0] - 1.0 / 3.0).abs() < 1e-6);
        assert!((p[1] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_non_probability_target() {
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", vec![0.0, 1.0])], vec![0.0, 2.0],
        ).unwrap();
        let result = LogisticRegression::new().fit(&sample, &[1.0, 1.0]);
        assert!(matches!(result, Err(LearnerError::InvalidTarget(_))));
    }
}
