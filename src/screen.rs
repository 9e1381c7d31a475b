//! Screening algorithms.
//! A screen picks the feature columns a learner is fitted on.

pub mod core;
pub mod screening;


pub use self::core::Screen;
pub use screening::Screening;
