//! This directory provides the cross-validation tools.
//! - Fold assignment and `(train, test)` splits
//! - Nested cross-validation of a super learner
//! - Console output of the verbose mode

/// Provides the fold manager.
pub mod cross_validation;

/// Provides the nested cross-validation.
pub mod nested;

/// Console output.
pub(crate) mod logger;


pub use cross_validation::{CrossValidation, Folds, FoldSplit};
pub use nested::{
    NestedCrossValidation,
    RiskRow,
    RiskTable,
    DISCRETE_SL,
    SUPER_LEARNER,
};
