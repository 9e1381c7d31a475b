//! Defines some common functions used in this library.

/// Defines loss function trait and the loss families.
pub mod loss_functions;

/// Defines some useful functions such as inner products.
pub(crate) mod utils;

/// Small dense linear algebra.
pub(crate) mod linalg;

/// Defines some checker functions.
pub(crate) mod checker;

/// Defines constants.
pub mod constants;

pub use loss_functions::{Family, LossFunction};
