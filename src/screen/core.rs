//! Provides the [`Screen`] trait.
use crate::Sample;


/// A screen selects a subset of the feature columns of a training sample.
///
/// The selection is recomputed on each training fold,
/// so it never looks at the validation rows.
/// An empty selection excludes the candidate from the ensemble.
pub trait Screen: Sync {
    /// Returns the name of the screen, used to label candidates.
    fn name(&self) -> String;


    /// Returns the names of the selected columns, in `sample` order.
    fn select(&self, sample: &Sample) -> Vec<String>;
}
