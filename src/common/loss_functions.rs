use serde::{Serialize, Deserialize};

use std::fmt;

use crate::StackError;
use crate::common::utils;


/// This trait defines the loss functions.
pub trait LossFunction {
    /// The name of the loss function.
    fn name(&self) -> &str;


    /// Loss value for a single point.
    fn eval_at_point(&self, prediction: f64, true_value: f64) -> f64;


    /// Derivative of the loss with respect to the prediction.
    fn gradient_at_point(&self, prediction: f64, true_value: f64) -> f64;


    /// Mean loss value.
    fn eval(&self, predictions: &[f64], target: &[f64]) -> f64 {
        let n_items = predictions.len();

        assert_eq!(n_items, target.len());

        predictions.iter()
            .zip(target)
            .map(|(&p, &y)| self.eval_at_point(p, y))
            .sum::<f64>()
            / n_items as f64
    }


    /// Weighted mean loss value, `Σ w l / Σ w`.
    fn weighted_eval(
        &self,
        predictions: &[f64],
        target: &[f64],
        weights: &[f64],
    ) -> f64
    {
        assert_eq!(predictions.len(), target.len());
        assert_eq!(predictions.len(), weights.len());

        let (sum, total) = predictions.iter()
            .zip(target)
            .zip(weights)
            .filter(|(_, &w)| w > 0.0)
            .fold((0f64, 0f64), |(s, t), ((&p, &y), &w)| {
                (s + w * self.eval_at_point(p, y), t + w)
            });
        if total > 0.0 { sum / total } else { f64::NAN }
    }


    /// Per-observation loss values.
    fn pointwise(&self, predictions: &[f64], target: &[f64]) -> Vec<f64> {
        predictions.iter()
            .zip(target)
            .map(|(&p, &y)| self.eval_at_point(p, y))
            .collect()
    }
}


/// Loss families recognized by the ensemble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Continuous outcome, squared-error loss.
    Gaussian,

    /// Binary `{0, 1}` outcome, binomial deviance
    /// `-2 [y ln p + (1 - y) ln (1 - p)]`.
    Binomial,
}


impl Family {
    /// Check that the target suits this family.
    pub fn validate(&self, target: &[f64]) -> Result<(), StackError> {
        let invalid = |detail: String| StackError::InvalidTarget {
            family: self.to_string(),
            detail,
        };

        if target.is_empty() {
            return Err(invalid("the target is empty".to_string()));
        }
        if let Some(y) = target.iter().find(|y| !y.is_finite()) {
            return Err(invalid(format!("non-finite value {y}")));
        }

        if let Self::Binomial = self {
            let non_binary = target.iter()
                .filter(|&&y| y != 0.0 && y != 1.0)
                .take(5)
                .map(|y| y.to_string())
                .collect::<Vec<_>>();
            if !non_binary.is_empty() {
                let line = non_binary.join(", ");
                return Err(invalid(
                    format!("values must be 0 or 1. Ex. [{line}, ...]")
                ));
            }
        }
        Ok(())
    }
}


impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gaussian => "gaussian",
            Self::Binomial => "binomial",
        };
        write!(f, "{name}")
    }
}


impl LossFunction for Family {
    fn name(&self) -> &str {
        match self {
            Self::Gaussian => "squared error",
            Self::Binomial => "binomial deviance",
        }
    }


    fn eval_at_point(&self, prediction: f64, true_value: f64) -> f64 {
        match self {
            Self::Gaussian => (prediction - true_value).powi(2),
            Self::Binomial => {
                let p = utils::clamp_probability(prediction);
                let y = true_value;
                -2.0 * (y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            },
        }
    }


    fn gradient_at_point(&self, prediction: f64, true_value: f64) -> f64 {
        match self {
            Self::Gaussian => 2.0 * (prediction - true_value),
            Self::Binomial => {
                let p = utils::clamp_probability(prediction);
                let y = true_value;
                -2.0 * (y / p - (1.0 - y) / (1.0 - p))
            },
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_error() {
        let loss = Family::Gaussian;
        assert_eq!(loss.eval(&[1.0, 3.0], &[0.0, 1.0]), 2.5);
        let w = loss.weighted_eval(&[1.0, 3.0], &[0.0, 1.0], &[3.0, 1.0]);
        assert_eq!(w, (3.0 * 1.0 + 4.0) / 4.0);
    }

    #[test]
    fn test_binomial_deviance() {
        let loss = Family::Binomial;
        let d = loss.eval_at_point(0.5, 1.0);
        assert!((d - 2.0 * 2f64.ln()).abs() < 1e-12);
        assert!(loss.eval_at_point(0.0, 1.0).is_finite());
    }

    #[test]
    fn test_validate() {
        assert!(Family::Binomial.validate(&[0.0, 1.0, 1.0]).is_ok());
        assert!(Family::Binomial.validate(&[0.0, 0.5]).is_err());
        assert!(Family::Gaussian.validate(&[0.0, 0.5]).is_ok());
        assert!(Family::Gaussian.validate(&[f64::NAN]).is_err());
        assert!(Family::Gaussian.validate(&[]).is_err());
    }
}
