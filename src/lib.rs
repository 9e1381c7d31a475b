#![warn(missing_docs)]

//!
//! A crate that provides cross-validated stacking ensembles,
//! a.k.a. *super learners*, with extensions to
//! right-censored, discrete-time survival outcomes.
//!
//! A super learner fits every candidate of a library
//! (a learner paired with a screen) on `V - 1` folds,
//! predicts the held-out fold, and combines the out-of-fold predictions
//! with non-negative weights that sum to `1`.
//!
//! - [`SuperLearner`] fits the ensemble and returns an [`EnsembleModel`].
//! - [`NestedCrossValidation`] estimates the risk of the whole procedure.
//! - [`DiscreteSurvival`] fits discrete hazards, pooled across time
//!   by the person-period expansion or one time at a time.
//! - [`ipcw_weights`] computes inverse probability of censoring weights
//!   for a binary "event by horizon" outcome.
//!
//! ```no_run
//! use ministack::prelude::*;
//!
//! # fn main() -> Result<(), StackError> {
//! # let sample = Sample::from_columns(vec![], vec![])?;
//! let library = Library::cross(
//!     vec![
//!         Algorithm::Mean(MeanLearner),
//!         Algorithm::Linear(LinearRegression::new()),
//!         Algorithm::Kernel(KernelSmoother::new().bandwidth(0.5)),
//!     ],
//!     vec![Screening::All, Screening::Correlation { top_k: 3 }],
//! );
//!
//! let model = SuperLearner::init(&sample)
//!     .n_folds(5)
//!     .seed(1234)
//!     .fit(&library)?;
//! println!("{model}");
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod hypothesis;
pub mod learner;
pub mod optimization;
pub mod prelude;
pub mod research;
pub mod sample;
pub mod screen;
pub mod survival;


pub use error::{StackError, LearnerError, OptimizerError};

pub use sample::{Sample, Feature, SurvivalSample};

pub use common::{Family, LossFunction};

pub use hypothesis::{
    Regressor,
    Combination,
    FittedCandidate,
    WeightedMajority,
};

pub use learner::{
    Learner,
    Algorithm,
    AlgorithmModel,
    MeanLearner,
    LinearRegression,
    LogisticRegression,
    RegressionTree,
    KernelSmoother,
};

pub use screen::{Screen, Screening};

pub use optimization::{WeightMethod, FWType, PredictionMatrix};

pub use ensemble::{Candidate, Library, SuperLearner, EnsembleModel};

pub use research::{
    CrossValidation,
    Folds,
    NestedCrossValidation,
    RiskTable,
};

pub use survival::{
    ipcw_weights,
    CensoringFit,
    CensoringTable,
    IpcwVariant,
    Expander,
    PersonPeriod,
    DiscreteSurvival,
    HazardModel,
    SurvivalEnsemble,
};

pub use config::StackConfig;
