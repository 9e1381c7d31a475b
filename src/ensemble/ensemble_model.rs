//! The fitted ensemble.
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;

use std::fmt;

use crate::{
    hypothesis::{FittedCandidate, WeightedMajority},
    optimization::{PredictionMatrix, WeightMethod},
    Family,
    Regressor,
    Sample,
    StackError,
};


/// A cross-validated ensemble returned by
/// [`SuperLearner::fit`](crate::SuperLearner::fit).
///
/// It holds the stacking weights, every candidate refitted on the full
/// data, the discrete winner, and the cross-validation diagnostics.
/// You can read/write this struct by `Serde` trait,
/// or by [`EnsembleModel::to_json`] and [`EnsembleModel::from_json`].
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EnsembleModel<M> {
    pub(crate) family: Family,
    pub(crate) method: WeightMethod,
    pub(crate) n_folds: usize,
    pub(crate) blend: WeightedMajority<M>,
    pub(crate) discrete: usize,
    pub(crate) cv_risk: Vec<f64>,
    pub(crate) fold_failures: Vec<usize>,
    pub(crate) excluded: Vec<bool>,
    pub(crate) refit_failed: Vec<bool>,
    pub(crate) degraded: Option<String>,
    pub(crate) cv_predictions: PredictionMatrix,
}


impl<M> EnsembleModel<M> {
    /// Returns the loss family the ensemble was fitted for.
    pub fn family(&self) -> Family {
        self.family
    }


    /// Returns the weight method.
    pub fn method(&self) -> WeightMethod {
        self.method
    }


    /// Returns the number of folds used for the cross-validation.
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }


    /// Returns the candidate names, in library order.
    pub fn names(&self) -> Vec<&str> {
        self.blend.candidates.iter()
            .map(|c| c.name.as_str())
            .collect()
    }


    /// Returns the stacking weights. They sum to `1`.
    pub fn weights(&self) -> &[f64] {
        &self.blend.weights[..]
    }


    /// Returns the fitted candidates.
    pub fn candidates(&self) -> &[FittedCandidate<M>] {
        &self.blend.candidates[..]
    }


    /// Returns the cross-validated risk of each candidate.
    pub fn cv_risk(&self) -> &[f64] {
        &self.cv_risk[..]
    }


    /// Returns the position of the discrete winner,
    /// the active candidate with the lowest cross-validated risk.
    pub fn discrete_winner(&self) -> usize {
        self.discrete
    }


    /// Returns the name of the discrete winner.
    pub fn discrete_winner_name(&self) -> &str {
        &self.blend.candidates[self.discrete].name
    }


    /// Returns the number of folds each candidate failed on.
    pub fn fold_failures(&self) -> &[usize] {
        &self.fold_failures[..]
    }


    /// Returns `true` for each candidate excluded from the blend.
    pub fn excluded(&self) -> &[bool] {
        &self.excluded[..]
    }


    /// Returns `true` for each candidate whose full-data refit failed
    /// and was replaced by the full-data mean.
    pub fn refit_failed(&self) -> &[bool] {
        &self.refit_failed[..]
    }


    /// Returns `true` if the weight optimizer failed and
    /// the ensemble fell back to the discrete winner.
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }


    /// Returns why the ensemble is degraded, if it is.
    pub fn degraded_reason(&self) -> Option<&str> {
        self.degraded.as_deref()
    }


    /// Returns the out-of-fold prediction matrix `Z`.
    pub fn cv_predictions(&self) -> &PredictionMatrix {
        &self.cv_predictions
    }


    /// Returns the cross-validated predictions of the blend,
    /// `Z` combined with the final weights.
    pub fn cv_blend(&self) -> Vec<f64> {
        self.cv_predictions.combine(&self.blend.weights, self.blend.combination)
    }
}


impl<M: Regressor> EnsembleModel<M> {
    /// Predicts the target of every row of `sample`
    /// with the weighted blend.
    pub fn predict(&self, sample: &Sample) -> Result<Vec<f64>, StackError> {
        self.blend.predict_all(sample)
    }


    /// Predicts the target of every row of `sample`
    /// with the discrete winner.
    pub fn predict_discrete(&self, sample: &Sample)
        -> Result<Vec<f64>, StackError>
    {
        self.blend.candidates[self.discrete].predict_all(sample)
    }


    /// Predicts every row of `sample` with every candidate,
    /// including the zero-weight ones.
    pub fn predict_candidates(&self, sample: &Sample)
        -> Result<Vec<Vec<f64>>, StackError>
    {
        self.blend.candidates.iter()
            .map(|c| c.predict_all(sample))
            .collect()
    }
}


impl<M: Serialize> EnsembleModel<M> {
    /// Serializes the model into a JSON string.
    pub fn to_json(&self) -> Result<String, StackError> {
        Ok(serde_json::to_string(self)?)
    }
}


impl<M: DeserializeOwned> EnsembleModel<M> {
    /// Restores a model from [`EnsembleModel::to_json`].
    pub fn from_json(json: &str) -> Result<Self, StackError> {
        Ok(serde_json::from_str(json)?)
    }
}


impl<M> fmt::Display for EnsembleModel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\
            ----------\n\
            # Super Learner\n\n\
            - Family:  {}\n\
            - Method:  {}\n\
            - Folds:   {}\n\
            - Winner:  {}\
            ",
            self.family,
            self.method,
            self.n_folds,
            self.discrete_winner_name(),
        )?;
        if let Some(reason) = &self.degraded {
            writeln!(f, "- Degraded: {reason}")?;
        }
        writeln!(f)?;
        writeln!(
            f, "{:<32} {:>12} {:>10} {:>7}", "Candidate", "Risk", "Weight", "Failed",
        )?;
        for (j, c) in self.blend.candidates.iter().enumerate() {
            let mark = if self.excluded[j] { " (excluded)" } else { "" };
            writeln!(
                f,
                "{:<32} {:>12.6} {:>10.4} {:>7}{mark}",
                c.name,
                self.cv_risk[j],
                self.blend.weights[j],
                self.fold_failures[j],
            )?;
        }
        write!(f, "----------")
    }
}
