//! Inverse probability of censoring weights (IPCW).
//!
//! The censoring process is estimated by a Kaplan-Meier curve per stratum,
//! where a "failure" is a censoring (`ftype == 0`).
use serde::{Serialize, Deserialize};

use std::collections::HashMap;

use crate::{
    common::constants::MIN_CENSORING_PROBABILITY,
    research::cross_validation::CrossValidation,
    Sample,
    StackError,
    SurvivalSample,
};


/// How the IPCW weights treat the horizon `h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpcwVariant {
    /// `w = 1{event, ftime <= h} / G(ftime)`.
    FixedHorizon,

    /// `w = [1{event, ftime <= h} + 1{ftime > h}] / G(min(ftime, h))`.
    /// Subjects still at risk after `h` are kept.
    HorizonCensored,
}


/// Which rows the censoring curve is estimated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CensoringFit {
    /// One curve fitted on every row.
    InSample,

    /// The rows of each fold use a curve fitted on the other folds.
    CrossFitted {
        /// Number of folds.
        n_folds: usize,
        /// Seed of the fold assignment.
        seed: u64,
    },
}


/// Kaplan-Meier estimates of the censoring survival,
/// pooled and per stratum.
///
/// `survival(t)` is the probability of being uncensored after `t`,
/// and [`CensoringTable::probability`] is the shifted
/// `G(t) = survival(t - 1)`, the probability of being uncensored
/// up to and including `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensoringTable {
    pooled: Vec<f64>,
    strata: HashMap<i64, Vec<f64>>,
    min_probability: f64,
}


impl CensoringTable {
    /// Fits the censoring curves on every row of `data`.
    pub fn fit(data: &SurvivalSample) -> Self {
        let rows = (0..data.len()).collect::<Vec<_>>();
        Self::fit_rows(data, &rows)
    }


    /// Fits the censoring curves on the rows `rows` of `data`.
    pub fn fit_rows(data: &SurvivalSample, rows: &[usize]) -> Self {
        let max_time = rows.iter()
            .map(|&i| data.ftime[i])
            .max()
            .unwrap_or(0);

        let pooled = kaplan_meier(data, rows.iter().copied(), max_time);

        let mut by_stratum: HashMap<i64, Vec<usize>> = HashMap::new();
        if data.strata.is_some() {
            for &i in rows {
                by_stratum.entry(data.stratum_of(i)).or_default().push(i);
            }
        }
        let strata = by_stratum.into_iter()
            .map(|(s, members)| {
                (s, kaplan_meier(data, members.into_iter(), max_time))
            })
            .collect();

        Self { pooled, strata, min_probability: MIN_CENSORING_PROBABILITY }
    }


    /// Set the lower bound applied to `G` when it is used as a divisor.
    /// Default is `1e-6`.
    pub fn min_probability(mut self, min_probability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&min_probability),
            "the lower bound must lie in [0, 1]",
        );
        self.min_probability = min_probability;
        self
    }


    /// Returns the largest time of the fitted curves.
    pub fn max_time(&self) -> usize {
        self.pooled.len().saturating_sub(1)
    }


    /// The curve of `stratum`; unknown strata use the pooled curve.
    fn curve(&self, stratum: Option<i64>) -> &[f64] {
        stratum.and_then(|s| self.strata.get(&s))
            .unwrap_or(&self.pooled)
    }


    /// Probability of remaining uncensored after `t`.
    /// Times past the last observed time carry the last value forward.
    pub fn survival(&self, stratum: Option<i64>, t: usize) -> f64 {
        let curve = self.curve(stratum);
        curve[t.min(curve.len() - 1)]
    }


    /// `G(t)`, the probability of remaining uncensored
    /// up to and including `t`. `G(0) = 1`.
    pub fn probability(&self, stratum: Option<i64>, t: usize) -> f64 {
        if t == 0 { 1.0 } else { self.survival(stratum, t - 1) }
    }


    /// `max(G(t), min_probability)`.
    pub fn truncated(&self, stratum: Option<i64>, t: usize) -> f64 {
        self.probability(stratum, t).max(self.min_probability)
    }
}


/// `S(t) = S(t - 1) (1 - d_t / n_t)` for `t = 0..=max_time`, `S(0) = 1`.
fn kaplan_meier<I>(data: &SurvivalSample, rows: I, max_time: usize)
    -> Vec<f64>
    where I: Iterator<Item = usize>,
{
    // `exits[t]` counts rows with `ftime == t`, `censored[t]` the censored ones.
    let mut exits = vec![0usize; max_time + 2];
    let mut censored = vec![0usize; max_time + 2];
    let mut at_risk = 0usize;
    for i in rows {
        let t = data.ftime[i];
        exits[t] += 1;
        if data.ftype[i] == 0 { censored[t] += 1; }
        at_risk += 1;
    }

    let mut curve = Vec::with_capacity(max_time + 1);
    curve.push(1.0);
    let mut s = 1.0;
    for t in 1..=max_time {
        if at_risk > 0 {
            s *= 1.0 - censored[t] as f64 / at_risk as f64;
        }
        curve.push(s);
        at_risk -= exits[t];
    }
    curve
}


/// Computes the IPCW weight of every row of `data`.
pub fn ipcw_weights(
    data: &SurvivalSample,
    horizon: usize,
    variant: IpcwVariant,
    fit: CensoringFit,
) -> Result<Vec<f64>, StackError>
{
    if horizon == 0 {
        return Err(StackError::InvalidHorizon(horizon));
    }
    let n_sample = data.len();
    let mut weights = vec![0f64; n_sample];

    match fit {
        CensoringFit::InSample => {
            let table = CensoringTable::fit(data);
            for (i, w) in weights.iter_mut().enumerate() {
                *w = row_weight(data, &table, i, horizon, variant);
            }
        },
        CensoringFit::CrossFitted { n_folds, seed } => {
            let mut cv = CrossValidation::new(n_sample)
                .n_folds(n_folds)
                .seed(seed);
            if let Some(ids) = data.cluster_ids() {
                cv = cv.clusters(ids.to_vec());
            }
            let folds = cv.folds()?;
            for v in 0..folds.n_folds() {
                let table = CensoringTable::fit_rows(
                    data, &folds.training_rows(v)
                );
                for &i in folds.validation_rows(v) {
                    weights[i] = row_weight(data, &table, i, horizon, variant);
                }
            }
        },
    }
    Ok(weights)
}


fn row_weight(
    data: &SurvivalSample,
    table: &CensoringTable,
    i: usize,
    horizon: usize,
    variant: IpcwVariant,
) -> f64
{
    let t = data.ftime[i];
    let stratum = data.strata.as_ref().map(|s| s[i]);
    let event_by_horizon = data.is_event(i, None) && t <= horizon;

    match variant {
        IpcwVariant::FixedHorizon => {
            if event_by_horizon { 1.0 / table.truncated(stratum, t) } else { 0.0 }
        },
        IpcwVariant::HorizonCensored => {
            if event_by_horizon || t > horizon {
                1.0 / table.truncated(stratum, t.min(horizon))
            } else {
                0.0
            }
        },
    }
}


impl SurvivalSample {
    /// Builds the binary "event by `horizon`" sample
    /// together with its IPCW weights,
    /// ready for [`SuperLearner::obs_weights`](crate::SuperLearner::obs_weights).
    pub fn ipcw_sample(
        &self,
        horizon: usize,
        variant: IpcwVariant,
        fit: CensoringFit,
    ) -> Result<(Sample, Vec<f64>), StackError>
    {
        let weights = ipcw_weights(self, horizon, variant, fit)?;
        let target = (0..self.len())
            .map(|i| {
                let event = self.is_event(i, None) && self.ftime[i] <= horizon;
                if event { 1.0 } else { 0.0 }
            })
            .collect::<Vec<_>>();
        let sample = self.covariates.with_target(target)?;
        Ok((sample, weights))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Feature;

    fn toy(ftime: Vec<usize>, ftype: Vec<u32>) -> SurvivalSample {
        let n = ftime.len();
        let x = Feature::from_values("x", vec![0.0; n]);
        let covariates = Sample::from_features(vec![x]).unwrap();
        SurvivalSample::new(covariates, ftime, ftype).unwrap()
    }

    #[test]
    fn test_kaplan_meier_of_censoring() {
        let data = toy(vec![2, 2, 3, 3, 3], vec![0, 0, 1, 1, 0]);
        let table = CensoringTable::fit(&data);
        assert_eq!(table.probability(None, 0), 1.0);
        assert_eq!(table.probability(None, 1), 1.0);
        assert_eq!(table.probability(None, 2), 1.0);
        assert!((table.probability(None, 3) - 0.6).abs() < 1e-12);
        assert!((table.survival(None, 3) - 0.4).abs() < 1e-12);
        // carried forward
        assert_eq!(table.survival(None, 10), table.survival(None, 3));
    }

    #[test]
    fn test_unknown_stratum_uses_pooled_curve() {
        let data = toy(vec![1, 2, 2, 3], vec![0, 1, 0, 1])
            .strata(vec![0, 0, 1, 1])
            .unwrap();
        let table = CensoringTable::fit(&data);
        assert_eq!(table.probability(Some(42), 3), table.probability(None, 3));
        assert!(table.probability(Some(0), 2) < 1.0);
    }

    #[test]
    fn test_truncation() {
        let data = toy(vec![1, 1], vec![0, 0]);
        let table = CensoringTable::fit(&data).min_probability(0.1);
        assert_eq!(table.probability(None, 2), 0.0);
        assert_eq!(table.truncated(None, 2), 0.1);
    }
}
