//! Provides the [`Learner`] trait.
use crate::{
    LearnerError,
    Regressor,
    Sample,
};


/// The trait [`Learner`] defines the contract of a base algorithm
/// in the ensemble library.
///
/// A learner fits a model on a training sample with
/// per-observation weights, and the model predicts new rows.
/// Hyperparameters are fields of the learner value, so
/// two learners with different settings are two library entries.
///
/// Fitting may fail. The ensemble isolates the failure
/// to the (fold, candidate) task that raised it.
pub trait Learner: Sync {
    /// The fitted model this learner returns.
    type Model: Regressor + Send + Sync;


    /// Returns the name of the learner, used to label candidates.
    fn name(&self) -> String;


    /// Fits a model on `sample` with non-negative observation `weights`.
    fn fit(&self, sample: &Sample, weights: &[f64])
        -> Result<Self::Model, LearnerError>;
}


/// Returns an error if the sample has no row or no positive weight.
pub(crate) fn check_training_sample(sample: &Sample, weights: &[f64])
    -> Result<(), LearnerError>
{
    let n_sample = sample.shape().0;
    let total = weights.iter().sum::<f64>();
    if n_sample == 0 || weights.len() != n_sample || total <= 0.0 {
        return Err(LearnerError::EmptySample);
    }
    Ok(())
}
