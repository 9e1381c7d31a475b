//! Discrete-time hazard estimation with super learners.
use serde::{Serialize, Deserialize};

use crate::{
    common::constants::{DEFAULT_N_FOLDS, DEFAULT_SEED, DEFAULT_TIME_COLUMN},
    ensemble::{EnsembleModel, Library, SuperLearner},
    learner::Learner,
    optimization::WeightMethod,
    research::logger,
    screen::Screen,
    Family,
    Regressor,
    Sample,
    StackError,
    SurvivalSample,
};
use super::person_period::Expander;


/// Fits the discrete hazard `P(T = t | T >= t, X)` for `t = 1..=horizon`.
///
/// - Pooled (default): one binomial [`SuperLearner`] on the
///   person-period rows, with the time as a covariate and
///   the subject as the cluster key.
/// - Unpooled: one independent binomial [`SuperLearner`] per time,
///   fitted on the subjects at risk at that time.
///
/// # Example
/// ```no_run
/// use ministack::prelude::*;
///
/// # fn main() -> Result<(), StackError> {
/// # let data: SurvivalSample = unimplemented!();
/// let library = Library::from_learners(vec![
///     Algorithm::Mean(MeanLearner),
///     Algorithm::Logistic(LogisticRegression::new()),
/// ]);
/// let model = DiscreteSurvival::init(&data)
///     .horizon(10)
///     .pool_across_time(true)
///     .n_folds(5)
///     .fit(&library)?;
///
/// let curves = model.predict_survival(data.covariates())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DiscreteSurvival<'a> {
    data: &'a SurvivalSample,
    horizon: Option<usize>,
    pool_across_time: bool,
    n_folds: usize,
    method: Option<WeightMethod>,
    seed: u64,
    cause: Option<u32>,
    time_column: String,
    verbose: bool,
}


/// The hazard ensembles fitted by [`DiscreteSurvival`].
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum HazardModel<M> {
    /// One ensemble over every time.
    Pooled(EnsembleModel<M>),
    /// One ensemble per time `t = 1..=horizon`.
    PerTime(Vec<EnsembleModel<M>>),
}


/// A fitted discrete-time survival model.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SurvivalEnsemble<M> {
    horizon: usize,
    time_column: String,
    model: HazardModel<M>,
}


impl<'a> DiscreteSurvival<'a> {
    /// Initialize `DiscreteSurvival`.
    /// By default, the horizon is the largest observed time
    /// and the hazards are pooled across time.
    pub fn init(data: &'a SurvivalSample) -> Self {
        Self {
            data,
            horizon: None,
            pool_across_time: true,
            n_folds: DEFAULT_N_FOLDS,
            method: None,
            seed: DEFAULT_SEED,
            cause: None,
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            verbose: false,
        }
    }


    /// Set the horizon.
    pub fn horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }


    /// Pool the hazard across time (`true`)
    /// or fit one ensemble per time (`false`).
    pub fn pool_across_time(mut self, pool: bool) -> Self {
        self.pool_across_time = pool;
        self
    }


    /// Set the number of folds of every ensemble.
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the weight method of every ensemble.
    pub fn method(mut self, method: WeightMethod) -> Self {
        self.method = Some(method);
        self
    }


    /// Set the seed of the fold assignments.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Model the cause-specific hazard of event kind `cause`.
    pub fn cause(mut self, cause: u32) -> Self {
        self.cause = Some(cause);
        self
    }


    /// Set the name of the time covariate of the pooled model.
    pub fn time_column<T: ToString>(mut self, name: T) -> Self {
        self.time_column = name.to_string();
        self
    }


    /// Print the progress to the console.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    fn super_learner<'b>(&self, sample: &'b Sample) -> SuperLearner<'b> {
        let mut sl = SuperLearner::init(sample)
            .family(Family::Binomial)
            .n_folds(self.n_folds)
            .seed(self.seed)
            .verbose(self.verbose);
        if let Some(method) = self.method {
            sl = sl.method(method);
        }
        sl
    }


    /// Fits the hazard ensembles.
    /// Every configuration check runs before the first fit.
    pub fn fit<L, S>(&self, library: &Library<L, S>)
        -> Result<SurvivalEnsemble<L::Model>, StackError>
        where L: Learner,
              S: Screen,
    {
        let horizon = self.horizon.unwrap_or_else(|| self.data.max_time());
        if horizon == 0 {
            return Err(StackError::InvalidHorizon(horizon));
        }

        let model = if self.pool_across_time {
            self.fit_pooled(library, horizon)?
        } else {
            self.fit_per_time(library, horizon)?
        };

        Ok(SurvivalEnsemble {
            horizon,
            time_column: self.time_column.clone(),
            model,
        })
    }


    fn fit_pooled<L, S>(&self, library: &Library<L, S>, horizon: usize)
        -> Result<HazardModel<L::Model>, StackError>
        where L: Learner,
              S: Screen,
    {
        let mut expander = Expander::new(horizon)
            .time_column(&self.time_column);
        if let Some(cause) = self.cause {
            expander = expander.cause(cause);
        }
        let pp = expander.expand(self.data)?;

        let model = self.super_learner(pp.sample())
            .clusters(pp.clusters().to_vec())
            .fit(library)?;
        Ok(HazardModel::Pooled(model))
    }


    fn fit_per_time<L, S>(&self, library: &Library<L, S>, horizon: usize)
        -> Result<HazardModel<L::Model>, StackError>
        where L: Learner,
              S: Screen,
    {
        let data = self.data;
        let samples = (1..=horizon)
            .map(|t| -> Result<(Sample, Option<Vec<u64>>), StackError> {
                let at_risk = (0..data.len())
                    .filter(|&i| data.ftime()[i] >= t)
                    .collect::<Vec<_>>();
                let target = at_risk.iter()
                    .map(|&i| {
                        let event = data.ftime()[i] == t
                            && data.is_event(i, self.cause);
                        if event { 1.0 } else { 0.0 }
                    })
                    .collect::<Vec<_>>();
                let clusters = data.cluster_ids()
                    .map(|ids| at_risk.iter().map(|&i| ids[i]).collect());
                let sample = data.covariates()
                    .subset(&at_risk)
                    .with_target(target)?;
                Ok((sample, clusters))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let learners = samples.iter()
            .map(|(sample, clusters)| {
                let sl = self.super_learner(sample);
                match clusters {
                    Some(ids) => sl.clusters(ids.clone()),
                    None => sl,
                }
            })
            .collect::<Vec<_>>();

        // Fail before fitting if any time cannot be cross-validated.
        let prepared = learners.iter()
            .map(|sl| sl.prepare(library.len()))
            .collect::<Result<Vec<_>, _>>()?;

        let models = learners.iter()
            .zip(prepared)
            .enumerate()
            .map(|(k, (sl, prepared))| {
                if self.verbose {
                    logger::finish(format!("Fitting the hazard at t = {}", k+1));
                }
                sl.fit_prepared(library, prepared)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HazardModel::PerTime(models))
    }
}


impl<M> SurvivalEnsemble<M> {
    /// Returns the horizon.
    pub fn horizon(&self) -> usize {
        self.horizon
    }


    /// Returns the fitted hazard ensembles.
    pub fn model(&self) -> &HazardModel<M> {
        &self.model
    }
}


impl<M: Regressor> SurvivalEnsemble<M> {
    /// Predicts the hazards `h(1), ..., h(horizon)` of every subject.
    pub fn predict_hazards(&self, covariates: &Sample)
        -> Result<Vec<Vec<f64>>, StackError>
    {
        let n_subjects = covariates.shape().0;
        let hazards = match &self.model {
            HazardModel::Pooled(model) => {
                let pp = Expander::new(self.horizon)
                    .time_column(&self.time_column)
                    .expand_for_prediction(covariates)?;
                let flat = model.predict(pp.sample())?;
                flat.chunks(self.horizon)
                    .map(|c| c.iter().map(|h| h.clamp(0.0, 1.0)).collect())
                    .collect()
            },
            HazardModel::PerTime(models) => {
                let per_time = models.iter()
                    .map(|m| m.predict(covariates))
                    .collect::<Result<Vec<_>, _>>()?;
                (0..n_subjects)
                    .map(|i| {
                        per_time.iter()
                            .map(|h| h[i].clamp(0.0, 1.0))
                            .collect()
                    })
                    .collect()
            },
        };
        Ok(hazards)
    }


    /// Predicts the survival curves
    /// `S(t) = Π_{s <= t} (1 - h(s))`, `t = 1..=horizon`.
    /// Each curve is non-increasing and lies in `[0, 1]`.
    pub fn predict_survival(&self, covariates: &Sample)
        -> Result<Vec<Vec<f64>>, StackError>
    {
        let curves = self.predict_hazards(covariates)?
            .into_iter()
            .map(|hazards| {
                let mut s = 1.0;
                hazards.into_iter()
                    .map(|h| {
                        s *= 1.0 - h;
                        s
                    })
                    .collect()
            })
            .collect();
        Ok(curves)
    }


    /// Predicts `S(t0)` for every subject. `S(0) = 1`.
    pub fn survival_at(&self, covariates: &Sample, t0: usize)
        -> Result<Vec<f64>, StackError>
    {
        if t0 > self.horizon {
            return Err(StackError::InvalidHorizon(t0));
        }
        if t0 == 0 {
            return Ok(vec![1.0; covariates.shape().0]);
        }
        let survival = self.predict_survival(covariates)?
            .into_iter()
            .map(|curve| curve[t0 - 1])
            .collect();
        Ok(survival)
    }
}
