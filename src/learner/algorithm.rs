//! A typed registry of the built-in learners.
//!
//! [`Algorithm`] is what a configuration file names,
//! and [`AlgorithmModel`] is what it fits.
use serde::{Serialize, Deserialize};

use crate::{
    LearnerError,
    Regressor,
    Sample,
};
use super::{
    core::Learner,
    kernel::{KernelSmoother, KernelRegressor},
    linear::{LinearRegression, LinearRegressor},
    logistic::{LogisticRegression, LogisticRegressor},
    mean::{MeanLearner, MeanRegressor},
    regression_tree::{RegressionTree, RegressionTreeRegressor},
};


/// One of the built-in learners.
///
/// ```
/// use ministack::prelude::*;
///
/// let library = vec![
///     Algorithm::Mean(MeanLearner),
///     Algorithm::Linear(LinearRegression::new()),
///     Algorithm::Tree(RegressionTree::new().max_depth(3)),
/// ];
/// assert_eq!(library[2].name(), "Tree(depth=3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Weighted mean of the target.
    Mean(MeanLearner),
    /// Weighted (ridge) least squares.
    Linear(LinearRegression),
    /// Weighted logistic regression.
    Logistic(LogisticRegression),
    /// Weighted CART.
    Tree(RegressionTree),
    /// Nadaraya-Watson smoother.
    Kernel(KernelSmoother),
}


/// A model fitted by an [`Algorithm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmModel {
    /// See [`MeanRegressor`].
    Mean(MeanRegressor),
    /// See [`LinearRegressor`].
    Linear(LinearRegressor),
    /// See [`LogisticRegressor`].
    Logistic(LogisticRegressor),
    /// See [`RegressionTreeRegressor`].
    Tree(RegressionTreeRegressor),
    /// See [`KernelRegressor`].
    Kernel(KernelRegressor),
}


impl Learner for Algorithm {
    type Model = AlgorithmModel;


    fn name(&self) -> String {
        match self {
            Self::Mean(l) => l.name(),
            Self::Linear(l) => l.name(),
            Self::Logistic(l) => l.name(),
            Self::Tree(l) => l.name(),
            Self::Kernel(l) => l.name(),
        }
    }


    fn fit(&self, sample: &Sample, weights: &[f64])
        -> Result<Self::Model, LearnerError>
    {
        let model = match self {
            Self::Mean(l) => AlgorithmModel::Mean(l.fit(sample, weights)?),
            Self::Linear(l) => AlgorithmModel::Linear(l.fit(sample, weights)?),
            Self::Logistic(l)
                => AlgorithmModel::Logistic(l.fit(sample, weights)?),
            Self::Tree(l) => AlgorithmModel::Tree(l.fit(sample, weights)?),
            Self::Kernel(l) => AlgorithmModel::Kernel(l.fit(sample, weights)?),
        };
        Ok(model)
    }
}


impl Regressor for AlgorithmModel {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        match self {
            Self::Mean(m) => m.predict(sample, row),
            Self::Linear(m) => m.predict(sample, row),
            Self::Logistic(m) => m.predict(sample, row),
            Self::Tree(m) => m.predict(sample, row),
            Self::Kernel(m) => m.predict(sample, row),
        }
    }
}


impl From<MeanLearner> for Algorithm {
    fn from(l: MeanLearner) -> Self { Self::Mean(l) }
}

impl From<LinearRegression> for Algorithm {
    fn from(l: LinearRegression) -> Self { Self::Linear(l) }
}

impl From<LogisticRegression> for Algorithm {
    fn from(l: LogisticRegression) -> Self { Self::Logistic(l) }
}

impl From<RegressionTree> for Algorithm {
    fn from(l: RegressionTree) -> Self { Self::Tree(l) }
}

impl From<KernelSmoother> for Algorithm {
    fn from(l: KernelSmoother) -> Self { Self::Kernel(l) }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let algo = Algorithm::Tree(RegressionTree::new().max_depth(4));
        let json = serde_json::to_string(&algo).unwrap();
        let back: Algorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(algo, back);
    }

    #[test]
    fn test_mean_from_config() {
        let algo: Algorithm = serde_json::from_str(r#"{"mean":null}"#)
            .unwrap();
        assert_eq!(algo.name(), "Mean");
    }
}
