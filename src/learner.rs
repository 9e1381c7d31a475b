//! Provides the [`Learner`] trait and the built-in learners.
//!
//! - [`MeanLearner`]
//! - [`LinearRegression`]
//! - [`LogisticRegression`]
//! - [`RegressionTree`]
//! - [`KernelSmoother`]
//!
//! [`Algorithm`] wraps all of them in one serializable enum.

pub mod core;
pub mod algorithm;
pub mod mean;
pub mod linear;
pub mod logistic;
pub mod kernel;
pub mod regression_tree;


pub use self::core::Learner;
pub use algorithm::{Algorithm, AlgorithmModel};
pub use mean::{MeanLearner, MeanRegressor};
pub use linear::{LinearRegression, LinearRegressor};
pub use logistic::{LogisticRegression, LogisticRegressor};
pub use kernel::{KernelSmoother, KernelRegressor};
pub use regression_tree::{RegressionTree, RegressionTreeRegressor};
