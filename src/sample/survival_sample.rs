use polars::prelude::*;

use crate::StackError;
use super::{Feature, Sample};


/// Right-censored, discrete-time survival data.
///
/// Each row carries covariates, an observed time `ftime >= 1`
/// and an event type `ftype` (`0` is censoring, `k >= 1` an event of kind `k`).
/// Rows may also carry a stratum (e.g., treatment arm), which the censoring
/// estimator stratifies on, and a cluster id shared by rows of one subject.
#[derive(Debug, Clone)]
pub struct SurvivalSample {
    pub(crate) covariates: Sample,
    pub(crate) ftime: Vec<usize>,
    pub(crate) ftype: Vec<u32>,
    pub(crate) strata: Option<Vec<i64>>,
    pub(crate) clusters: Option<Vec<u64>>,
}


impl SurvivalSample {
    /// Construct a new instance of `SurvivalSample`.
    pub fn new(covariates: Sample, ftime: Vec<usize>, ftype: Vec<u32>)
        -> Result<Self, StackError>
    {
        let n_sample = covariates.shape().0;
        check_length("ftime", n_sample, ftime.len())?;
        check_length("ftype", n_sample, ftype.len())?;

        if let Some(pos) = ftime.iter().position(|&t| t == 0) {
            return Err(StackError::InvalidSurvivalData(format!(
                "ftime must be at least 1, got 0 at row {pos}"
            )));
        }

        Ok(Self { covariates, ftime, ftype, strata: None, clusters: None, })
    }


    /// Convert `polars::DataFrame` into `SurvivalSample`.
    /// The columns `ftime` and `ftype` are taken as the survival outcome
    /// and every other column becomes a covariate.
    pub fn from_dataframe<S: AsRef<str>>(
        data: &DataFrame,
        ftime: S,
        ftype: S,
    ) -> Result<Self, StackError>
    {
        let (ftime, ftype) = (ftime.as_ref(), ftype.as_ref());
        let times = integer_column(data, ftime)?;
        let types = integer_column(data, ftype)?;

        let features = data.get_columns()
            .iter()
            .filter(|series| series.name() != ftime && series.name() != ftype)
            .map(Feature::from_series)
            .collect::<PolarsResult<Vec<_>>>()?;
        let n_sample = data.height();
        let covariates = Sample::from_columns(features, vec![0f64; n_sample])?;

        let times = times.into_iter()
            .map(|t| usize::try_from(t).unwrap_or(0))
            .collect();
        let types = types.into_iter()
            .map(u32::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| StackError::InvalidSurvivalData(
                "ftype must be non-negative".to_string()
            ))?;

        Self::new(covariates, times, types)
    }


    /// Set the stratum of each row.
    pub fn strata(mut self, strata: Vec<i64>) -> Result<Self, StackError> {
        check_length("strata", self.len(), strata.len())?;
        self.strata = Some(strata);
        Ok(self)
    }


    /// Set the cluster (subject) id of each row.
    pub fn clusters(mut self, clusters: Vec<u64>) -> Result<Self, StackError> {
        check_length("clusters", self.len(), clusters.len())?;
        self.clusters = Some(clusters);
        Ok(self)
    }


    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.ftime.len()
    }


    /// Returns `true` if there is no row.
    pub fn is_empty(&self) -> bool {
        self.ftime.is_empty()
    }


    /// Returns the covariates.
    pub fn covariates(&self) -> &Sample {
        &self.covariates
    }


    /// Returns the observed times.
    pub fn ftime(&self) -> &[usize] {
        &self.ftime[..]
    }


    /// Returns the event types.
    pub fn ftype(&self) -> &[u32] {
        &self.ftype[..]
    }


    /// Returns the strata, if any.
    pub fn stratum_ids(&self) -> Option<&[i64]> {
        self.strata.as_deref()
    }


    /// Returns the cluster ids, if any.
    pub fn cluster_ids(&self) -> Option<&[u64]> {
        self.clusters.as_deref()
    }


    /// Returns the stratum of row `i` (`0` if unstratified).
    #[inline(always)]
    pub(crate) fn stratum_of(&self, i: usize) -> i64 {
        self.strata.as_ref().map(|s| s[i]).unwrap_or(0)
    }


    /// Returns `true` if row `i` is an event of interest.
    /// `cause = None` counts every event kind.
    #[inline(always)]
    pub(crate) fn is_event(&self, i: usize, cause: Option<u32>) -> bool {
        match cause {
            None => self.ftype[i] >= 1,
            Some(k) => self.ftype[i] == k,
        }
    }


    /// Returns the largest observed time.
    pub fn max_time(&self) -> usize {
        self.ftime.iter().copied().max().unwrap_or(0)
    }


    /// Returns a new survival sample that keeps the rows in `rows`.
    pub fn subset(&self, rows: &[usize]) -> Self {
        let gather = |v: &[usize]| -> Vec<usize> {
            rows.iter().map(|&i| v[i]).collect()
        };
        Self {
            covariates: self.covariates.subset(rows),
            ftime: gather(&self.ftime),
            ftype: rows.iter().map(|&i| self.ftype[i]).collect(),
            strata: self.strata.as_ref()
                .map(|s| rows.iter().map(|&i| s[i]).collect()),
            clusters: self.clusters.as_ref()
                .map(|c| rows.iter().map(|&i| c[i]).collect()),
        }
    }
}


fn check_length(what: &'static str, expected: usize, got: usize)
    -> Result<(), StackError>
{
    if expected == got {
        Ok(())
    } else {
        Err(StackError::LengthMismatch { what, expected, got })
    }
}


fn integer_column(data: &DataFrame, name: &str)
    -> Result<Vec<i64>, StackError>
{
    let values = data.column(name)?
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| StackError::InvalidSurvivalData(
            format!("the column '{name}' has missing values")
        ))?;
    Ok(values)
}
