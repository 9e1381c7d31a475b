use polars::prelude::*;
use rayon::prelude::*;

use std::collections::HashMap;
use std::ops::Index;

use crate::StackError;
use super::feature::Feature;


/// Struct `Sample` holds a batch sample in a dense, column-major format
/// together with its target values.
///
/// A `Sample` is never modified once built.
/// Row subsets, column selections and appended columns
/// produce new values.
#[derive(Debug, Clone)]
pub struct Sample {
    pub(super) name_to_index: HashMap<String, usize>,
    pub(super) features: Vec<Feature>,
    pub(super) target: Vec<f64>,
    pub(super) n_sample: usize,
    pub(super) n_feature: usize,
}


impl Sample {
    /// Construct a new `Sample` from feature columns and target values.
    ///
    /// Returns `Err` if the lengths disagree or a name occurs twice.
    pub fn from_columns(features: Vec<Feature>, target: Vec<f64>)
        -> Result<Self, StackError>
    {
        let n_sample = target.len();
        for feat in features.iter() {
            if feat.len() != n_sample {
                return Err(StackError::LengthMismatch {
                    what: "feature column",
                    expected: n_sample,
                    got: feat.len(),
                });
            }
        }

        let name_to_index = name_to_index(&features)?;
        let n_feature = features.len();
        Ok(Self { name_to_index, features, target, n_sample, n_feature, })
    }


    /// Construct a `Sample` with the given features and
    /// an all-zero target.
    /// Covariate-only samples (e.g., new data for prediction)
    /// are built in this way.
    pub fn from_features(features: Vec<Feature>)
        -> Result<Self, StackError>
    {
        let n_sample = features.first()
            .map(|feat| feat.len())
            .unwrap_or(0);
        Self::from_columns(features, vec![0f64; n_sample])
    }


    /// Convert `polars::DataFrame` into `Sample`.
    /// The column named `target` is used as the target
    /// and the other columns become features.
    pub fn from_dataframe<S: AsRef<str>>(data: &DataFrame, target: S)
        -> Result<Self, StackError>
    {
        let name = target.as_ref();
        let target = Feature::from_series(data.column(name)?)?
            .into_values();

        let features = data.get_columns()
            .par_iter()
            .filter(|series| series.name() != name)
            .map(Feature::from_series)
            .collect::<PolarsResult<Vec<_>>>()?;

        Self::from_columns(features, target)
    }


    /// Returns the pair of the number of examples and
    /// the number of features
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sample, self.n_feature)
    }


    /// Returns the slice of target values.
    pub fn target(&self) -> &[f64] {
        &self.target[..]
    }


    /// Returns a slice of the features.
    pub fn features(&self) -> &[Feature] {
        &self.features[..]
    }


    /// Returns the feature names in column order.
    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter()
            .map(|feat| feat.name().to_string())
            .collect()
    }


    /// Returns the feature named `name`.
    pub fn column<S: AsRef<str>>(&self, name: S)
        -> Result<&Feature, StackError>
    {
        let name = name.as_ref();
        self.name_to_index.get(name)
            .map(|&k| &self.features[k])
            .ok_or_else(|| StackError::MissingColumn(name.to_string()))
    }


    /// Returns the `idx`-th instance `(x, y)`.
    pub fn at(&self, idx: usize) -> (Vec<f64>, f64) {
        let x = self.features.iter()
            .map(|feat| feat[idx])
            .collect::<Vec<f64>>();
        let y = self.target[idx];

        (x, y)
    }


    /// Returns the value of the `col`-th feature at row `row`.
    #[inline(always)]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.features[col][row]
    }


    /// Returns a new sample that keeps the rows in `rows`
    /// (in the given order).
    pub fn subset(&self, rows: &[usize]) -> Self {
        let features = self.features.iter()
            .map(|feat| feat.gather(rows))
            .collect::<Vec<_>>();
        let target = rows.iter()
            .map(|&i| self.target[i])
            .collect::<Vec<_>>();

        Self {
            name_to_index: self.name_to_index.clone(),
            features,
            target,
            n_sample: rows.len(),
            n_feature: self.n_feature,
        }
    }


    /// Returns a new sample that keeps the columns named in `names`,
    /// in that order.
    pub fn select<S: AsRef<str>>(&self, names: &[S])
        -> Result<Self, StackError>
    {
        let features = names.iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let name_to_index = name_to_index(&features)?;

        Ok(Self {
            name_to_index,
            n_feature: features.len(),
            features,
            target: self.target.clone(),
            n_sample: self.n_sample,
        })
    }


    /// Returns a new sample with `feature` appended as the last column.
    pub fn with_feature(&self, feature: Feature)
        -> Result<Self, StackError>
    {
        let mut features = self.features.clone();
        features.push(feature);
        Self::from_columns(features, self.target.clone())
    }


    /// Returns a new sample whose target is replaced by `target`.
    pub fn with_target(&self, target: Vec<f64>)
        -> Result<Self, StackError>
    {
        if target.len() != self.n_sample {
            return Err(StackError::LengthMismatch {
                what: "target",
                expected: self.n_sample,
                got: target.len(),
            });
        }
        Ok(Self { target, ..self.clone() })
    }


    /// Computes the weighted mean of the target.
    /// Returns `None` if the weights sum to zero.
    pub fn weighted_target_mean(&self, weight: &[f64]) -> Option<f64> {
        let total = weight.iter().sum::<f64>();
        if total <= 0.0 {
            return None;
        }
        let sum = self.target.iter()
            .zip(weight)
            .map(|(y, w)| y * w)
            .sum::<f64>();
        Some(sum / total)
    }
}


/// Build the name-to-position map, rejecting duplicated names.
fn name_to_index(features: &[Feature])
    -> Result<HashMap<String, usize>, StackError>
{
    let mut map = HashMap::with_capacity(features.len());
    for (i, feat) in features.iter().enumerate() {
        if map.insert(feat.name().to_string(), i).is_some() {
            return Err(StackError::DuplicateColumn(feat.name().to_string()));
        }
    }
    Ok(map)
}


impl<S> Index<S> for Sample
    where S: AsRef<str>
{
    type Output = Feature;

    fn index(&self, name: S) -> &Self::Output {
        let name: &str = name.as_ref();
        let k = *self.name_to_index.get(name)
            .unwrap_or_else(|| panic!("The feature `{name}` does not exist"));
        &self.features[k]
    }
}
