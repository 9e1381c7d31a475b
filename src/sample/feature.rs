use polars::prelude::*;
use serde::{Serialize, Deserialize};

use std::ops::Index;
use std::slice::Iter;


/// A named, dense feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature name
    pub(crate) name: String,
    /// Feature values.
    pub(crate) values: Vec<f64>,
}


impl Feature {
    /// Construct an empty feature.
    pub fn new<T: ToString>(name: T) -> Self {
        Self { name: name.to_string(), values: Vec::new() }
    }


    /// Construct a feature from the given values.
    pub fn from_values<T: ToString>(name: T, values: Vec<f64>) -> Self {
        Self { name: name.to_string(), values }
    }


    /// Convert a `polars::Series` into a feature.
    /// Integer and boolean columns are cast to `f64`.
    pub fn from_series(series: &Series) -> PolarsResult<Self> {
        let name = series.name().to_string();
        let values = series.cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect::<Vec<_>>();
        Ok(Self { name, values })
    }


    /// Get the feature name.
    pub fn name(&self) -> &str {
        &self.name
    }


    /// Returns the values of this feature.
    pub fn values(&self) -> &[f64] {
        &self.values[..]
    }


    pub(crate) fn into_values(self) -> Vec<f64> {
        self.values
    }


    /// Returns an iterator over the values.
    pub fn iter(&self) -> Iter<'_, f64> {
        self.values.iter()
    }


    /// Returns the number of items in this feature.
    pub fn len(&self) -> usize {
        self.values.len()
    }


    /// Returns `true` if the feature has no value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }


    /// Returns a new feature that keeps the rows in `rows`.
    pub(crate) fn gather(&self, rows: &[usize]) -> Self {
        let values = rows.iter()
            .map(|&i| self.values[i])
            .collect::<Vec<_>>();
        Self { name: self.name.clone(), values }
    }


    /// Compute the weighted mean of the feature.
    /// The weights must be non-negative with a positive sum.
    pub(crate) fn weighted_mean(&self, weight: &[f64]) -> f64 {
        let (sum, total) = self.values.iter()
            .zip(weight)
            .fold((0f64, 0f64), |(s, t), (x, w)| (s + w * x, t + w));
        sum / total
    }


    /// Compute the weighted mean and (population) variance.
    pub(crate) fn weighted_mean_and_variance(&self, weight: &[f64])
        -> (f64, f64)
    {
        let mean = self.weighted_mean(weight);
        let (sum, total) = self.values.iter()
            .zip(weight)
            .fold((0f64, 0f64), |(s, t), (x, w)| {
                (s + w * (x - mean).powi(2), t + w)
            });
        (mean, sum / total)
    }
}


impl Index<usize> for Feature {
    type Output = f64;
    fn index(&self, idx: usize) -> &Self::Output {
        &self.values[idx]
    }
}
