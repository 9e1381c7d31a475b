//! Error types.
//!
//! - [`StackError`] is fatal. Configuration errors are raised
//!   before any learner is fitted.
//! - [`LearnerError`] is isolated to a single (fold, candidate) task.
//! - [`OptimizerError`] makes the ensemble fall back to the discrete winner.
use polars::prelude::PolarsError;
use thiserror::Error;


/// Fatal errors raised by the ensemble pipeline.
#[derive(Error, Debug)]
pub enum StackError {
    /// Fewer distinct units than folds.
    #[error(
        "The number of folds ({n_folds}) exceeds \
         the number of distinct units ({n_units})."
    )]
    TooManyFolds {
        /// Requested number of folds.
        n_folds: usize,
        /// Number of rows, or of distinct cluster ids.
        n_units: usize,
    },

    /// Cross-validation needs at least two folds.
    #[error("At least 2 folds are required, got {0}.")]
    TooFewFolds(usize),

    /// The candidate library has no member.
    #[error("The candidate library is empty.")]
    EmptyLibrary,

    /// The target does not fit the loss family.
    #[error("Invalid target for the {family} family: {detail}")]
    InvalidTarget {
        /// Name of the family.
        family: String,
        /// What is wrong with the target.
        detail: String,
    },

    /// Two inputs that should be aligned row by row are not.
    #[error("Length mismatch for {what}: expected {expected}, got {got}.")]
    LengthMismatch {
        /// The offending input.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Observation weights are negative, non-finite or all zero.
    #[error("Invalid observation weights: {0}")]
    InvalidWeights(String),

    /// A required column is absent.
    #[error("The column '{0}' does not exist.")]
    MissingColumn(String),

    /// A column name occurs twice.
    #[error("The column '{0}' occurs more than once.")]
    DuplicateColumn(String),

    /// Survival data violates its schema.
    #[error("Invalid survival data: {0}")]
    InvalidSurvivalData(String),

    /// The horizon (or a requested time) is zero or out of range.
    #[error("Invalid horizon {0}: expected a positive time within the fitted range.")]
    InvalidHorizon(usize),

    /// Every candidate was excluded by the failure policy.
    #[error(
        "No candidate survived cross-validation \
         ({n_candidates} candidates, all excluded)."
    )]
    NoViableCandidate {
        /// Size of the library.
        n_candidates: usize,
    },

    /// A configuration document could not be parsed.
    #[error("Failed to parse the configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Error from the underlying Polars DataFrame library.
    #[error("Error from the underlying Polars DataFrame library: {0}")]
    Polars(#[from] PolarsError),
}


impl StackError {
    /// Returns `true` for errors that describe an impossible configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::TooManyFolds { .. }
                | Self::TooFewFolds(_)
                | Self::EmptyLibrary
                | Self::InvalidTarget { .. }
                | Self::InvalidHorizon(_)
                | Self::Config(_)
        )
    }
}


/// Errors raised by a learner while fitting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LearnerError {
    /// The training sample has no rows or no positive weight.
    #[error("The training sample is empty or has zero total weight.")]
    EmptySample,

    /// The screened sample has no columns.
    #[error("The learner requires at least one feature.")]
    NoFeature,

    /// The normal equations are singular.
    #[error("Singular system while fitting {0}.")]
    Singular(&'static str),

    /// An iterative fit did not converge.
    #[error("{learner} did not converge within {iterations} iterations.")]
    NotConverged {
        /// Learner name.
        learner: &'static str,
        /// Iteration budget.
        iterations: usize,
    },

    /// The target does not suit the learner.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}


/// Errors raised by the stacking weight optimizer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    /// A linear sub-problem is singular.
    #[error("The weight optimizer met a singular system.")]
    Singular,

    /// The iteration budget was exhausted.
    #[error("The weight optimizer did not converge within {0} iterations.")]
    NotConverged(usize),

    /// The solution has no positive entry, so it cannot be normalized.
    #[error("The weight optimizer returned an all-zero solution.")]
    ZeroWeights,
}
