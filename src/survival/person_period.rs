//! The person-period expansion of discrete-time survival data.
//!
//! A subject observed until `ftime` becomes one row per time
//! `t = 1..=min(ftime, horizon)`, with a binary target that is `1`
//! only at `t = ftime` for an event.
//! The time is appended as a covariate, so that a single binary
//! regression estimates the hazard at every time.
use crate::{
    common::constants::DEFAULT_TIME_COLUMN,
    Feature,
    Sample,
    StackError,
    SurvivalSample,
};


/// Builds [`PersonPeriod`] data.
///
/// ```
/// use ministack::prelude::*;
///
/// let x = Feature::from_values("age", vec![50.0, 60.0]);
/// let covariates = Sample::from_features(vec![x]).unwrap();
/// let data = SurvivalSample::new(covariates, vec![2, 4], vec![1, 0]).unwrap();
///
/// let pp = Expander::new(3).expand(&data).unwrap();
/// assert_eq!(pp.sample().shape(), (5, 2));
/// assert_eq!(pp.sample().target(), &[0.0, 1.0, 0.0, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expander {
    horizon: usize,
    time_column: String,
    cause: Option<u32>,
}


/// Person-period rows, grouped by subject and ordered by time.
#[derive(Debug, Clone)]
pub struct PersonPeriod {
    sample: Sample,
    subject: Vec<usize>,
    time: Vec<usize>,
    clusters: Vec<u64>,
    offsets: Vec<usize>,
    horizon: usize,
}


impl Expander {
    /// Construct an expander up to `horizon`.
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            cause: None,
        }
    }


    /// Set the name of the appended time column.
    /// Default is `"time"`.
    pub fn time_column<T: ToString>(mut self, name: T) -> Self {
        self.time_column = name.to_string();
        self
    }


    /// Only `ftype == cause` counts as an event.
    /// Other event kinds end the records of the subject without an event.
    pub fn cause(mut self, cause: u32) -> Self {
        self.cause = Some(cause);
        self
    }


    /// Returns the horizon.
    pub fn horizon(&self) -> usize {
        self.horizon
    }


    /// Expands observed survival data.
    pub fn expand(&self, data: &SurvivalSample)
        -> Result<PersonPeriod, StackError>
    {
        self.check_horizon()?;
        let ends = data.ftime()
            .iter()
            .map(|&t| t.min(self.horizon))
            .collect::<Vec<_>>();
        let (subject, time) = rows_until(&ends);

        let target = subject.iter()
            .zip(&time)
            .map(|(&i, &t)| {
                let event = t == data.ftime()[i]
                    && data.is_event(i, self.cause);
                if event { 1.0 } else { 0.0 }
            })
            .collect::<Vec<_>>();

        let clusters = match data.cluster_ids() {
            Some(ids) => subject.iter().map(|&i| ids[i]).collect(),
            None => subject.iter().map(|&i| i as u64).collect(),
        };
        self.build(data.covariates(), subject, time, target, clusters, &ends)
    }


    /// Expands new covariates for prediction:
    /// every subject gets the rows `t = 1..=horizon`.
    pub fn expand_for_prediction(&self, covariates: &Sample)
        -> Result<PersonPeriod, StackError>
    {
        self.check_horizon()?;
        let ends = vec![self.horizon; covariates.shape().0];
        let (subject, time) = rows_until(&ends);
        let target = vec![0f64; subject.len()];
        let clusters = subject.iter().map(|&i| i as u64).collect();
        self.build(covariates, subject, time, target, clusters, &ends)
    }


    /// Turns per-row hazards into per-subject survival curves,
    /// `S(t) = Π_{s <= t} (1 - h(s))`.
    /// Each curve has one value per row of its subject,
    /// so curves of [`Expander::expand_for_prediction`] span `1..=horizon`.
    pub fn collapse(&self, pp: &PersonPeriod, hazards: &[f64])
        -> Result<Vec<Vec<f64>>, StackError>
    {
        if hazards.len() != pp.len() {
            return Err(StackError::LengthMismatch {
                what: "hazards",
                expected: pp.len(),
                got: hazards.len(),
            });
        }
        let curves = pp.offsets
            .windows(2)
            .map(|w| {
                let mut s = 1.0;
                hazards[w[0]..w[1]].iter()
                    .map(|h| {
                        s *= 1.0 - h.clamp(0.0, 1.0);
                        s
                    })
                    .collect()
            })
            .collect();
        Ok(curves)
    }


    fn check_horizon(&self) -> Result<(), StackError> {
        if self.horizon == 0 {
            Err(StackError::InvalidHorizon(0))
        } else {
            Ok(())
        }
    }


    fn build(
        &self,
        covariates: &Sample,
        subject: Vec<usize>,
        time: Vec<usize>,
        target: Vec<f64>,
        clusters: Vec<u64>,
        ends: &[usize],
    ) -> Result<PersonPeriod, StackError>
    {
        let time_feature = Feature::from_values(
            &self.time_column,
            time.iter().map(|&t| t as f64).collect(),
        );
        let sample = covariates.subset(&subject)
            .with_target(target)?
            .with_feature(time_feature)?;

        let mut offsets = Vec::with_capacity(ends.len() + 1);
        let mut end = 0;
        offsets.push(end);
        for &e in ends {
            end += e;
            offsets.push(end);
        }

        Ok(PersonPeriod {
            sample, subject, time, clusters, offsets, horizon: self.horizon,
        })
    }
}


/// `(subject, t)` for `t = 1..=ends[subject]`.
fn rows_until(ends: &[usize]) -> (Vec<usize>, Vec<usize>) {
    ends.iter()
        .enumerate()
        .flat_map(|(i, &end)| (1..=end).map(move |t| (i, t)))
        .unzip()
}


impl PersonPeriod {
    /// Returns the expanded sample.
    /// Its target is the event indicator.
    pub fn sample(&self) -> &Sample {
        &self.sample
    }


    /// Returns the subject (row of the original data) of each row.
    pub fn subject(&self) -> &[usize] {
        &self.subject[..]
    }


    /// Returns the time of each row.
    pub fn time(&self) -> &[usize] {
        &self.time[..]
    }


    /// Returns the cluster key of each row.
    /// It is the cluster id of the subject if the data had one,
    /// and the subject index otherwise.
    pub fn clusters(&self) -> &[u64] {
        &self.clusters[..]
    }


    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.subject.len()
    }


    /// Returns `true` if there is no row.
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty()
    }


    /// Returns the number of subjects.
    pub fn n_subjects(&self) -> usize {
        self.offsets.len() - 1
    }


    /// Returns the horizon of the expansion.
    pub fn horizon(&self) -> usize {
        self.horizon
    }


    /// Recovers `(min(ftime, horizon), event by then)` of each subject.
    pub fn outcomes(&self) -> Vec<(usize, bool)> {
        let target = self.sample.target();
        self.offsets
            .windows(2)
            .map(|w| {
                let last = w[1] - 1;
                (self.time[last], target[last] == 1.0)
            })
            .collect()
    }
}
