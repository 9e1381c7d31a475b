//! Weighted (ridge) least squares.
use serde::{Serialize, Deserialize};

use crate::{
    common::{constants::RIDGE_JITTER, linalg},
    LearnerError,
    Regressor,
    Sample,
};
use super::core::{Learner, check_training_sample};


/// Weighted linear regression with an intercept and
/// an optional L2 penalty on the slopes.
///
/// The penalty is scaled by the total weight,
/// so `lambda_l2` does not depend on the sample size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub(crate) lambda_l2: f64,
}


/// The model returned by [`LinearRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub(crate) intercept: f64,
    pub(crate) coefficients: Vec<f64>,
}


impl Default for LinearRegression {
    fn default() -> Self {
        Self { lambda_l2: 0.0 }
    }
}


impl LinearRegression {
    /// Construct an unpenalized linear regression.
    pub fn new() -> Self {
        Self::default()
    }


    /// Set the L2-regularization parameter.
    pub fn lambda_l2(mut self, lambda_l2: f64) -> Self {
        assert!(lambda_l2 >= 0.0, "lambda_l2 must be non-negative");
        self.lambda_l2 = lambda_l2;
        self
    }
}


impl LinearRegressor {
    /// Returns the intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }


    /// Returns the slopes, in column order.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients[..]
    }
}


/// Design columns `[1, x_1, ..., x_d]` of `sample`.
pub(crate) fn design_with_intercept(sample: &Sample) -> Vec<Vec<f64>> {
    let n_sample = sample.shape().0;
    std::iter::once(vec![1f64; n_sample])
        .chain(sample.features().iter().map(|f| f.values().to_vec()))
        .collect()
}


impl Learner for LinearRegression {
    type Model = LinearRegressor;


    fn name(&self) -> String {
        if self.lambda_l2 > 0.0 {
            format!("Ridge({})", self.lambda_l2)
        } else {
            "Linear".to_string()
        }
    }


    fn fit(&self, sample: &Sample, weights: &[f64])
        -> Result<Self::Model, LearnerError>
    {
        check_training_sample(sample, weights)?;

        let design = design_with_intercept(sample);
        let columns = design.iter()
            .map(|c| &c[..])
            .collect::<Vec<_>>();
        let (mut gram, rhs) = linalg::weighted_normal_equations(
            &columns, weights, sample.target(),
        );

        let total = weights.iter().sum::<f64>();
        gram.iter_mut()
            .enumerate()
            .skip(1)
            .for_each(|(j, row)| {
                row[j] += self.lambda_l2 * total + RIDGE_JITTER;
            });

        let beta = linalg::solve(gram, rhs)
            .ok_or(LearnerError::Singular("linear regression"))?;

        Ok(LinearRegressor {
            intercept: beta[0],
            coefficients: beta[1..].to_vec(),
        })
    }
}


impl Regressor for LinearRegressor {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        self.coefficients.iter()
            .enumerate()
            .map(|(j, b)| b * sample.value(row, j))
            .sum::<f64>()
            + self.intercept
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Feature;

    #[test]
    fn test_recovers_exact_line() {
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = x.iter().map(|v| 1.0 + 2.0 * v).collect::<Vec<_>>();
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", x)], y,
        ).unwrap();

        let model = LinearRegression::new()
            .fit(&sample, &[1.0; 5])
            .unwrap();
        assert!((model.intercept() - 1.0).abs() < 1e-6);
        assert!((model.coefficients()[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_weight_rows_are_ignored() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![0.0, 1.0, 2.0, 100.0];
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", x)], y,
        ).unwrap();

        let model = LinearRegression::new()
            .fit(&sample, &[1.0, 1.0, 1.0, 0.0])
            .unwrap();
        assert!((model.coefficients()[0] - 1.0).abs() < 1e-6);
    }
}
