//! The ensemble orchestrator.
use fixedbitset::FixedBitSet;
use rayon::prelude::*;

use std::fmt;

use crate::{
    common::{
        checker,
        constants::{DEFAULT_N_FOLDS, DEFAULT_SEED},
        utils,
    },
    hypothesis::{CandidateFit, Combination, FittedCandidate, WeightedMajority},
    learner::Learner,
    optimization::{self, PredictionMatrix, WeightMethod},
    research::{cross_validation::{CrossValidation, Folds}, logger},
    screen::Screen,
    Family,
    LearnerError,
    LossFunction,
    Regressor,
    Sample,
    StackError,
};
use super::{
    ensemble_model::EnsembleModel,
    library::{Candidate, Library},
};


/// The cross-validated stacking ensemble, a.k.a. Super Learner.
///
/// Every candidate of a [`Library`] is fitted on `V - 1` folds and
/// predicts the held-out fold. The out-of-fold predictions are combined
/// by non-negative weights that sum to `1`, and every candidate is
/// refitted on the full data.
///
/// # Example
/// ```no_run
/// use ministack::prelude::*;
///
/// # fn main() -> Result<(), StackError> {
/// # let sample = Sample::from_columns(vec![], vec![])?;
/// let library = Library::from_learners(vec![
///     Algorithm::Mean(MeanLearner),
///     Algorithm::Linear(LinearRegression::new()),
///     Algorithm::Tree(RegressionTree::new().max_depth(3)),
/// ]);
///
/// let model = SuperLearner::init(&sample)
///     .n_folds(5)
///     .family(Family::Gaussian)
///     .seed(777)
///     .verbose(true)
///     .fit(&library)?;
///
/// let predictions = model.predict(&sample)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SuperLearner<'a> {
    pub(crate) sample: &'a Sample,
    pub(crate) n_folds: usize,
    pub(crate) family: Family,
    pub(crate) method: Option<WeightMethod>,
    pub(crate) obs_weights: Option<Vec<f64>>,
    pub(crate) clusters: Option<Vec<u64>>,
    pub(crate) seed: u64,
    pub(crate) verbose: bool,
}


/// Everything checked before the first fit.
pub(crate) struct Prepared {
    pub(crate) weights: Vec<f64>,
    pub(crate) method: WeightMethod,
    pub(crate) folds: Folds,
}


/// The training and validation data of one fold.
struct FoldData {
    train: Sample,
    train_weights: Vec<f64>,
    valid: Sample,
    fallback: f64,
}


/// Why a (fold, candidate) task fell back to the training mean.
#[derive(Debug)]
enum TaskFailure {
    ScreenEmpty,
    Learner(LearnerError),
    NonFinite,
}


impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScreenEmpty => write!(f, "the screen selected no column"),
            Self::Learner(e) => write!(f, "{e}"),
            Self::NonFinite => write!(f, "non-finite predictions"),
        }
    }
}


/// The record a (fold, candidate) task returns.
/// Records are scattered into `Z` after every task has finished.
struct FoldPrediction {
    fold: usize,
    candidate: usize,
    values: Vec<f64>,
    failure: Option<TaskFailure>,
}


impl<'a> SuperLearner<'a> {
    /// Initialize the `SuperLearner`.
    /// By default, 10 folds, the gaussian family, unit weights,
    /// and seed `1234`.
    pub fn init(sample: &'a Sample) -> Self {
        Self {
            sample,
            n_folds: DEFAULT_N_FOLDS,
            family: Family::Gaussian,
            method: None,
            obs_weights: None,
            clusters: None,
            seed: DEFAULT_SEED,
            verbose: false,
        }
    }


    /// Set the number of folds `V`.
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the loss family.
    pub fn family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }


    /// Set the weight method.
    /// By default, [`WeightMethod::default_for`] the family.
    pub fn method(mut self, method: WeightMethod) -> Self {
        self.method = Some(method);
        self
    }


    /// Set the observation weights.
    pub fn obs_weights(mut self, weights: Vec<f64>) -> Self {
        self.obs_weights = Some(weights);
        self
    }


    /// Set the cluster id of each row.
    /// Rows of one cluster share a fold.
    pub fn clusters(mut self, clusters: Vec<u64>) -> Self {
        self.clusters = Some(clusters);
        self
    }


    /// Set the seed of the fold assignment.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Print the progress to the console.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Returns the training sample.
    pub fn sample(&self) -> &'a Sample {
        self.sample
    }


    /// Same settings on the rows `rows` of `sample`.
    /// Weights and clusters are restricted to those rows.
    pub(crate) fn restrict<'b>(&self, sample: &'b Sample, rows: &[usize])
        -> SuperLearner<'b>
    {
        let gather_f = |v: &Vec<f64>| rows.iter().map(|&i| v[i]).collect();
        let gather_u = |v: &Vec<u64>| rows.iter().map(|&i| v[i]).collect();
        SuperLearner {
            sample,
            n_folds: self.n_folds,
            family: self.family,
            method: self.method,
            obs_weights: self.obs_weights.as_ref().map(gather_f),
            clusters: self.clusters.as_ref().map(gather_u),
            seed: self.seed,
            verbose: false,
        }
    }


    /// Runs every configuration check.
    pub(crate) fn prepare(&self, n_candidates: usize)
        -> Result<Prepared, StackError>
    {
        let n_sample = self.sample.shape().0;
        if n_candidates == 0 {
            return Err(StackError::EmptyLibrary);
        }
        self.family.validate(self.sample.target())?;

        let method = self.method
            .unwrap_or_else(|| WeightMethod::default_for(self.family));
        if method == WeightMethod::NnLogLik && self.family != Family::Binomial {
            return Err(StackError::InvalidTarget {
                family: self.family.to_string(),
                detail: "log-likelihood weights need a binomial target"
                    .to_string(),
            });
        }

        let weights = match &self.obs_weights {
            Some(w) => {
                checker::observation_weights(w, n_sample)?;
                w.clone()
            },
            None => vec![1.0; n_sample],
        };

        let mut cv = CrossValidation::new(n_sample)
            .n_folds(self.n_folds)
            .seed(self.seed);
        if let Some(ids) = &self.clusters {
            cv = cv.clusters(ids.clone());
        }
        let folds = cv.folds()?;

        Ok(Prepared { weights, method, folds })
    }


    /// Fits the ensemble on `library`.
    ///
    /// Configuration errors are returned before any learner is fitted.
    /// A candidate failing on a single fold falls back to
    /// the training mean of that fold;
    /// failures never abort the run.
    pub fn fit<L, S>(&self, library: &Library<L, S>)
        -> Result<EnsembleModel<L::Model>, StackError>
        where L: Learner,
              S: Screen,
    {
        let prepared = self.prepare(library.len())?;
        self.fit_prepared(library, prepared)
    }


    pub(crate) fn fit_prepared<L, S>(
        &self,
        library: &Library<L, S>,
        prepared: Prepared,
    ) -> Result<EnsembleModel<L::Model>, StackError>
        where L: Learner,
              S: Screen,
    {
        let Prepared { weights, method, folds } = prepared;
        let sample = self.sample;
        let target = sample.target();
        let n_sample = sample.shape().0;
        let n_folds = folds.n_folds();
        let candidates = library.candidates();
        let n_candidates = candidates.len();

        let full_mean = utils::weighted_mean(target, &weights)
            .ok_or_else(|| StackError::InvalidWeights(
                "all weights are zero".to_string()
            ))?;

        if self.verbose {
            logger::print_stats("SUPER LEARNER", &[
                ("Rows", n_sample.to_string()),
                ("Candidates", n_candidates.to_string()),
                ("Folds", n_folds.to_string()),
                ("Family", self.family.to_string()),
                ("Method", method.to_string()),
                ("Seed", self.seed.to_string()),
            ]);
        }

        // ---------------------------------------------------------------------
        // Cross-validation
        let fold_data = (0..n_folds).into_par_iter()
            .map(|v| {
                let rows = folds.training_rows(v);
                let train = sample.subset(&rows);
                let train_weights = rows.iter()
                    .map(|&i| weights[i])
                    .collect::<Vec<_>>();
                let valid = sample.subset(folds.validation_rows(v));
                let fallback = utils::weighted_mean(
                    train.target(), &train_weights
                ).unwrap_or(full_mean);
                FoldData { train, train_weights, valid, fallback }
            })
            .collect::<Vec<_>>();

        if self.verbose {
            fold_data.iter()
                .enumerate()
                .for_each(|(v, d)| {
                    logger::print_fold(v+1, d.train.shape().0, d.valid.shape().0)
                });
        }

        let records = (0..n_folds * n_candidates).into_par_iter()
            .map(|task| {
                let (fold, candidate) = (task / n_candidates, task % n_candidates);
                let data = &fold_data[fold];
                let (values, failure) = match predict_on_fold(
                    &candidates[candidate], data
                ) {
                    Ok(values) => (values, None),
                    Err(e) => {
                        let n_valid = data.valid.shape().0;
                        (vec![data.fallback; n_valid], Some(e))
                    },
                };
                FoldPrediction { fold, candidate, values, failure }
            })
            .collect::<Vec<_>>();

        let mut z = PredictionMatrix::new(n_sample, n_candidates);
        let mut fold_failures = vec![0usize; n_candidates];
        let mut screen_empty = vec![false; n_candidates];
        for record in records {
            let FoldPrediction { fold, candidate, values, failure } = record;
            z.scatter(candidate, folds.validation_rows(fold), &values);

            let Some(failure) = failure else { continue; };
            if self.verbose {
                logger::warn(format!(
                    "{} failed on fold {}: {failure}",
                    candidates[candidate].name(), fold+1,
                ));
            }
            match failure {
                TaskFailure::ScreenEmpty => screen_empty[candidate] = true,
                _ => fold_failures[candidate] += 1,
            }
        }

        // ---------------------------------------------------------------------
        // Failure policy
        let mut active = FixedBitSet::with_capacity(n_candidates);
        let mut excluded = vec![false; n_candidates];
        for j in 0..n_candidates {
            let majority = 2 * fold_failures[j] > n_folds;
            if screen_empty[j] || majority {
                excluded[j] = true;
                if self.verbose {
                    logger::warn(format!(
                        "{} is excluded from the ensemble", candidates[j].name()
                    ));
                }
            } else {
                active.insert(j);
            }
        }

        let cv_risk = (0..n_candidates)
            .map(|j| self.family.weighted_eval(z.column(j), target, &weights))
            .collect::<Vec<_>>();

        let discrete = utils::argmin_among(&cv_risk, active.ones())
            .ok_or(StackError::NoViableCandidate { n_candidates })?;

        // ---------------------------------------------------------------------
        // Weights
        let solved = optimization::optimize(
            method, self.family, &z, target, &weights, &active,
        );
        let (blend_weights, combination, degraded) = match solved {
            Ok(w) => (w, method.combination(), None),
            Err(e) => {
                if self.verbose {
                    logger::warn(format!(
                        "{e} Falling back to the discrete winner."
                    ));
                }
                let mut w = vec![0f64; n_candidates];
                w[discrete] = 1.0;
                (w, Combination::Identity, Some(e.to_string()))
            },
        };
        debug_assert!(checker::is_on_simplex(&blend_weights));

        // ---------------------------------------------------------------------
        // Full-data refits. Excluded candidates keep weight `0`.
        let refits = candidates.par_iter()
            .map(|candidate| {
                match fit_screened(candidate, sample, &weights) {
                    Ok((columns, model)) => {
                        let fitted = FittedCandidate {
                            name: candidate.name().to_string(),
                            columns,
                            fit: CandidateFit::Model(model),
                        };
                        (fitted, false)
                    },
                    Err(_) => (constant(candidate, full_mean), true),
                }
            })
            .collect::<Vec<_>>();
        let (fitted, refit_failed): (Vec<_>, Vec<_>) = refits.into_iter().unzip();

        if self.verbose {
            refit_failed.iter()
                .enumerate()
                .filter(|(_, &failed)| failed)
                .for_each(|(j, _)| {
                    logger::warn(format!(
                        "The full-data refit of {} failed. \
                         Predicting the weighted mean instead.",
                        candidates[j].name(),
                    ))
                });
        }

        let blend = WeightedMajority::new(blend_weights, fitted, combination);

        if self.verbose {
            logger::print_table_header();
            for j in 0..n_candidates {
                logger::print_candidate(
                    candidates[j].name(),
                    cv_risk[j],
                    blend.weights[j],
                    fold_failures[j],
                    excluded[j],
                );
            }
            logger::finish(format!(
                "Discrete winner: {}", candidates[discrete].name()
            ));
        }

        Ok(EnsembleModel {
            family: self.family,
            method,
            n_folds,
            blend,
            discrete,
            cv_risk,
            fold_failures,
            excluded,
            refit_failed,
            degraded,
            cv_predictions: z,
        })
    }
}


/// Fits the screen and the learner of `candidate` on `sample`.
fn fit_screened<L, S>(
    candidate: &Candidate<L, S>,
    sample: &Sample,
    weights: &[f64],
) -> Result<(Vec<String>, L::Model), TaskFailure>
    where L: Learner,
          S: Screen,
{
    let columns = candidate.screen.select(sample);
    if columns.is_empty() {
        return Err(TaskFailure::ScreenEmpty);
    }
    let screened = sample.select(&columns)
        .map_err(|_| TaskFailure::Learner(LearnerError::NoFeature))?;
    let model = candidate.learner.fit(&screened, weights)
        .map_err(TaskFailure::Learner)?;
    Ok((columns, model))
}


/// Fits `candidate` on the training rows of a fold and
/// predicts its validation rows.
fn predict_on_fold<L, S>(candidate: &Candidate<L, S>, data: &FoldData)
    -> Result<Vec<f64>, TaskFailure>
    where L: Learner,
          S: Screen,
{
    let (columns, model) = fit_screened(
        candidate, &data.train, &data.train_weights
    )?;
    let valid = data.valid.select(&columns)
        .map_err(|_| TaskFailure::Learner(LearnerError::NoFeature))?;
    let values = model.predict_all(&valid);
    if values.iter().all(|v| v.is_finite()) {
        Ok(values)
    } else {
        Err(TaskFailure::NonFinite)
    }
}


fn constant<L, S, M>(candidate: &Candidate<L, S>, value: f64)
    -> FittedCandidate<M>
{
    FittedCandidate {
        name: candidate.name().to_string(),
        columns: Vec::new(),
        fit: CandidateFit::Constant(value),
    }
}
