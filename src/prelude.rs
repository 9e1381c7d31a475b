//! Exports the standard learners, ensembles, and traits.
//!

pub use crate::error::{
    StackError,
    LearnerError,
    OptimizerError,
};


pub use crate::sample::{
    Sample,
    Feature,
    SurvivalSample,
};


pub use crate::common::{
    Family,
    LossFunction,
};


pub use crate::hypothesis::Regressor;


pub use crate::learner::{
    // Learner trait
    Learner,

    // Built-in learners
    Algorithm,
    AlgorithmModel,
    MeanLearner,
    LinearRegression,
    LogisticRegression,
    RegressionTree,
    KernelSmoother,
};


pub use crate::screen::{
    Screen,
    Screening,
};


pub use crate::optimization::{
    WeightMethod,
    FWType,
};


pub use crate::ensemble::{
    Library,
    SuperLearner,
    EnsembleModel,
};


pub use crate::research::{
    CrossValidation,
    NestedCrossValidation,
    RiskTable,
};


pub use crate::survival::{
    CensoringFit,
    IpcwVariant,
    Expander,
    DiscreteSurvival,
    HazardModel,
    SurvivalEnsemble,
};


pub use crate::config::StackConfig;
