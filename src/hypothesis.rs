//! The core library for fitted models and their combination.

pub(crate) mod hypothesis_traits;
pub(crate) mod weighted_majority;


pub use hypothesis_traits::Regressor;
pub use weighted_majority::{
    CandidateFit,
    Combination,
    FittedCandidate,
    WeightedMajority,
};
