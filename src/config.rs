//! A serializable description of a whole run.
use serde::{Serialize, Deserialize};

use crate::{
    common::constants::{DEFAULT_N_FOLDS, DEFAULT_SEED},
    ensemble::{EnsembleModel, Library, SuperLearner},
    learner::{Algorithm, AlgorithmModel},
    optimization::WeightMethod,
    screen::Screening,
    survival::{DiscreteSurvival, SurvivalEnsemble},
    Family,
    Sample,
    StackError,
    SurvivalSample,
};


/// Settings of a stacking run, readable from JSON.
///
/// Observation weights and cluster ids are data,
/// so they are passed to the builders instead.
///
/// ```
/// use ministack::prelude::*;
///
/// let config = StackConfig::from_json(r#"{
///     "family": "binomial",
///     "library": [{"mean": null}, {"logistic": {"lambda_l2": 0.0, "max_iter": 50}}]
/// }"#).unwrap();
/// assert_eq!(config.n_folds, 10);
/// assert_eq!(config.library().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Number of folds `V`.
    #[serde(default = "default_n_folds")]
    pub n_folds: usize,

    /// Loss family.
    #[serde(default = "default_family")]
    pub family: Family,

    /// The learners, in library order.
    pub library: Vec<Algorithm>,

    /// The screens every learner is paired with.
    #[serde(default = "default_screens")]
    pub screen_library: Vec<Screening>,

    /// Weight method. `None` picks the family default.
    #[serde(default)]
    pub method: Option<WeightMethod>,

    /// Seed of the fold assignment.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Horizon of survival runs.
    /// `None` uses the largest observed time.
    #[serde(default)]
    pub horizon: Option<usize>,

    /// Pool the hazard across time in survival runs.
    #[serde(default = "default_pool")]
    pub pool_across_time: bool,

    /// Print the progress to the console.
    #[serde(default)]
    pub verbose: bool,
}


fn default_n_folds() -> usize { DEFAULT_N_FOLDS }
fn default_family() -> Family { Family::Gaussian }
fn default_screens() -> Vec<Screening> { vec![Screening::All] }
fn default_seed() -> u64 { DEFAULT_SEED }
fn default_pool() -> bool { true }


impl Default for StackConfig {
    fn default() -> Self {
        Self {
            n_folds: default_n_folds(),
            family: default_family(),
            library: Vec::new(),
            screen_library: default_screens(),
            method: None,
            seed: default_seed(),
            horizon: None,
            pool_across_time: default_pool(),
            verbose: false,
        }
    }
}


impl StackConfig {
    /// Parses a JSON document.
    pub fn from_json(json: &str) -> Result<Self, StackError> {
        Ok(serde_json::from_str(json)?)
    }


    /// Serializes into a JSON document.
    pub fn to_json(&self) -> Result<String, StackError> {
        Ok(serde_json::to_string(self)?)
    }


    /// Every learner crossed with every screen.
    pub fn library(&self) -> Library<Algorithm, Screening> {
        Library::cross(self.library.clone(), self.screen_library.clone())
    }


    /// A [`SuperLearner`] on `sample` with these settings.
    pub fn super_learner<'a>(&self, sample: &'a Sample) -> SuperLearner<'a> {
        let mut sl = SuperLearner::init(sample)
            .n_folds(self.n_folds)
            .family(self.family)
            .seed(self.seed)
            .verbose(self.verbose);
        if let Some(method) = self.method {
            sl = sl.method(method);
        }
        sl
    }


    /// A [`DiscreteSurvival`] on `data` with these settings.
    /// The family is always binomial.
    pub fn discrete_survival<'a>(&self, data: &'a SurvivalSample)
        -> DiscreteSurvival<'a>
    {
        let mut ds = DiscreteSurvival::init(data)
            .n_folds(self.n_folds)
            .seed(self.seed)
            .pool_across_time(self.pool_across_time)
            .verbose(self.verbose);
        if let Some(horizon) = self.horizon {
            ds = ds.horizon(horizon);
        }
        if let Some(method) = self.method {
            ds = ds.method(method);
        }
        ds
    }


    /// Fits a super learner on `sample`.
    pub fn fit(&self, sample: &Sample)
        -> Result<EnsembleModel<AlgorithmModel>, StackError>
    {
        self.super_learner(sample).fit(&self.library())
    }


    /// Fits a discrete-time survival model on `data`.
    pub fn fit_survival(&self, data: &SurvivalSample)
        -> Result<SurvivalEnsemble<AlgorithmModel>, StackError>
    {
        self.discrete_survival(data).fit(&self.library())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StackConfig::from_json(r#"{"library": []}"#).unwrap();
        assert_eq!(config, StackConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let result = StackConfig::from_json(r#"{"n_folds": "ten"}"#);
        assert!(matches!(result, Err(StackError::Config(_))));
    }
}
