//! This file defines split rules for regression tree.
use serde::{Serialize, Deserialize};

use crate::Sample;


/// The output of the function `split` of `Splitter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LR {
    Left,
    Right,
}


/// Sends a row to the left child if `x[feature] < threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Splitter {
    pub(crate) feature: String,
    pub(crate) threshold: f64,
}


impl Splitter {
    #[inline]
    pub(crate) fn new(name: &str, threshold: f64) -> Self {
        let feature = name.to_string();
        Self { feature, threshold, }
    }


    /// Defines the splitting.
    #[inline]
    pub(crate) fn split(&self, data: &Sample, row: usize) -> LR {
        let value = data[&self.feature][row];

        if value < self.threshold {
            LR::Left
        } else {
            LR::Right
        }
    }
}
