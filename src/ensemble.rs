//! The stacking ensemble.

pub mod library;
pub mod super_learner;
pub mod ensemble_model;


pub use library::{Candidate, Library};
pub use super_learner::SuperLearner;
pub use ensemble_model::EnsembleModel;
