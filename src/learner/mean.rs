//! The marginal mean predictor.
use serde::{Serialize, Deserialize};

use crate::{
    common::utils,
    LearnerError,
    Regressor,
    Sample,
};
use super::core::{Learner, check_training_sample};


/// A learner that ignores the covariates and predicts
/// the weighted mean of the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanLearner;


/// The model returned by [`MeanLearner`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanRegressor {
    pub(crate) mean: f64,
}


impl MeanRegressor {
    /// Returns the fitted mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }
}


impl Learner for MeanLearner {
    type Model = MeanRegressor;


    fn name(&self) -> String {
        "Mean".to_string()
    }


    fn fit(&self, sample: &Sample, weights: &[f64])
        -> Result<Self::Model, LearnerError>
    {
        check_training_sample(sample, weights)?;
        let mean = utils::weighted_mean(sample.target(), weights)
            .ok_or(LearnerError::EmptySample)?;
        Ok(MeanRegressor { mean })
    }
}


impl Regressor for MeanRegressor {
    fn predict(&self, _sample: &Sample, _row: usize) -> f64 {
        self.mean
    }
}
