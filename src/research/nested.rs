//! Nested cross-validation of a super learner.
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use std::fmt;

use crate::{
    common::constants::DEFAULT_N_FOLDS,
    ensemble::{Library, SuperLearner},
    learner::Learner,
    optimization::PredictionMatrix,
    screen::Screen,
    LossFunction,
    StackError,
};
use super::{cross_validation::CrossValidation, logger};


/// Name of the blend row of a [`RiskTable`].
pub const SUPER_LEARNER: &str = "SuperLearner";
/// Name of the discrete-winner row of a [`RiskTable`].
pub const DISCRETE_SL: &str = "DiscreteSL";


/// Estimates the risk of a [`SuperLearner`] by an outer cross-validation.
///
/// Each outer fold fits the whole ensemble (with its own inner folds)
/// on the other folds and predicts the held-out fold with every
/// candidate, the blend, and the discrete winner.
///
/// ```no_run
/// use ministack::prelude::*;
///
/// # fn main() -> Result<(), StackError> {
/// # let sample = Sample::from_columns(vec![], vec![])?;
/// # let library = Library::from_learners(vec![Algorithm::Mean(MeanLearner)]);
/// let sl = SuperLearner::init(&sample).n_folds(5);
/// let table = NestedCrossValidation::new(&sl)
///     .n_folds(5)
///     .seed(42)
///     .run(&library)?;
/// println!("{table}");
/// # Ok(())
/// # }
/// ```
pub struct NestedCrossValidation<'a, 'b> {
    super_learner: &'b SuperLearner<'a>,
    n_folds: usize,
    seed: u64,
    verbose: bool,
}


/// One row of a [`RiskTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRow {
    /// Candidate name, [`SUPER_LEARNER`], or [`DISCRETE_SL`].
    pub name: String,
    /// Weighted mean risk over every row.
    pub risk: f64,
    /// Standard error of `risk`.
    pub se: f64,
    /// Smallest risk of a single outer fold.
    pub min: f64,
    /// Largest risk of a single outer fold.
    pub max: f64,
    /// Risk of each outer fold.
    pub fold_risks: Vec<f64>,
}


/// The output of [`NestedCrossValidation::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskTable {
    rows: Vec<RiskRow>,
    winner_counts: Vec<usize>,
    failure_counts: Vec<usize>,
    degraded_folds: usize,
    predictions: PredictionMatrix,
}


/// What one outer fold returns.
struct OuterFold {
    predictions: Vec<Vec<f64>>,
    winner: usize,
    failures: Vec<usize>,
    degraded: bool,
}


impl<'a, 'b> NestedCrossValidation<'a, 'b> {
    /// Wraps `super_learner`. The outer folds use its seed by default.
    pub fn new(super_learner: &'b SuperLearner<'a>) -> Self {
        Self {
            super_learner,
            n_folds: DEFAULT_N_FOLDS,
            seed: super_learner.seed,
            verbose: super_learner.verbose,
        }
    }


    /// Set the number of outer folds.
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the seed of the outer fold assignment.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Print the outer folds and the table.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Runs the nested cross-validation.
    /// Every configuration error, inner ones included,
    /// is raised before the first fit.
    pub fn run<L, S>(&self, library: &Library<L, S>)
        -> Result<RiskTable, StackError>
        where L: Learner,
              S: Screen,
    {
        let sl = self.super_learner;
        let sample = sl.sample;
        let n_sample = sample.shape().0;
        let n_candidates = library.len();
        let weights = sl.prepare(n_candidates)?.weights;

        let mut cv = CrossValidation::new(n_sample)
            .n_folds(self.n_folds)
            .seed(self.seed);
        if let Some(ids) = &sl.clusters {
            cv = cv.clusters(ids.clone());
        }
        let folds = cv.folds()?;

        let trains = (0..folds.n_folds())
            .map(|v| {
                let rows = folds.training_rows(v);
                let train = sample.subset(&rows);
                (rows, train)
            })
            .collect::<Vec<_>>();
        let inner = trains.iter()
            .map(|(rows, train)| {
                let inner = sl.restrict(train, rows);
                inner.prepare(n_candidates).map(|prepared| (inner, prepared))
            })
            .collect::<Result<Vec<_>, StackError>>()?;

        if self.verbose {
            logger::print_stats("NESTED CROSS VALIDATION", &[
                ("Rows", n_sample.to_string()),
                ("Candidates", n_candidates.to_string()),
                ("Outer folds", folds.n_folds().to_string()),
                ("Inner folds", sl.n_folds.to_string()),
            ]);
            for v in 0..folds.n_folds() {
                logger::print_fold(
                    v+1, trains[v].0.len(), folds.validation_rows(v).len(),
                );
            }
        }

        let outer = inner.into_par_iter()
            .enumerate()
            .map(|(v, (inner, prepared))| -> Result<OuterFold, StackError> {
                let model = inner.fit_prepared(library, prepared)?;
                let test = sample.subset(folds.validation_rows(v));

                let mut predictions = model.predict_candidates(&test)?;
                predictions.push(model.predict(&test)?);
                predictions.push(model.predict_discrete(&test)?);

                let failures = model.fold_failures()
                    .iter()
                    .zip(model.refit_failed())
                    .map(|(&f, &r)| f + usize::from(r))
                    .collect();
                Ok(OuterFold {
                    predictions,
                    winner: model.discrete_winner(),
                    failures,
                    degraded: model.is_degraded(),
                })
            })
            .collect::<Result<Vec<_>, StackError>>()?;

        // Gather the out-of-fold predictions.
        let n_rows = n_candidates + 2;
        let mut predictions = PredictionMatrix::new(n_sample, n_rows);
        let mut winner_counts = vec![0usize; n_candidates];
        let mut failure_counts = vec![0usize; n_candidates];
        let mut degraded_folds = 0;
        for (v, fold) in outer.iter().enumerate() {
            let rows = folds.validation_rows(v);
            fold.predictions.iter()
                .enumerate()
                .for_each(|(r, p)| predictions.scatter(r, rows, p));
            winner_counts[fold.winner] += 1;
            failure_counts.iter_mut()
                .zip(&fold.failures)
                .for_each(|(c, f)| *c += f);
            degraded_folds += usize::from(fold.degraded);
        }

        let mut names = library.names();
        names.push(SUPER_LEARNER.to_string());
        names.push(DISCRETE_SL.to_string());

        let family = sl.family;
        let target = sample.target();
        let rows = names.into_iter()
            .enumerate()
            .map(|(r, name)| {
                let column = predictions.column(r);
                let losses = family.pointwise(column, target);
                let (risk, se) = weighted_mean_and_se(&losses, &weights);
                let fold_risks = (0..folds.n_folds())
                    .map(|v| {
                        let idx = folds.validation_rows(v);
                        let l = idx.iter().map(|&i| losses[i]).collect::<Vec<_>>();
                        let w = idx.iter().map(|&i| weights[i]).collect::<Vec<_>>();
                        weighted_mean_and_se(&l, &w).0
                    })
                    .collect::<Vec<_>>();
                let min = fold_risks.iter().copied().fold(f64::INFINITY, f64::min);
                let max = fold_risks.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                RiskRow { name, risk, se, min, max, fold_risks }
            })
            .collect::<Vec<_>>();

        let table = RiskTable {
            rows, winner_counts, failure_counts, degraded_folds, predictions,
        };
        if self.verbose {
            println!("{table}");
        }
        Ok(table)
    }
}


/// Weighted mean of `values` and its standard error
/// `sqrt(Σ w (x - m)² / Σ w / n)`, `n` being the number of positive weights.
fn weighted_mean_and_se(values: &[f64], weights: &[f64]) -> (f64, f64) {
    let (sum, total, n) = values.iter()
        .zip(weights)
        .filter(|(_, &w)| w > 0.0)
        .fold((0f64, 0f64, 0usize), |(s, t, n), (x, w)| (s + w * x, t + w, n + 1));
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = sum / total;
    let var = values.iter()
        .zip(weights)
        .filter(|(_, &w)| w > 0.0)
        .map(|(x, w)| w * (x - mean).powi(2))
        .sum::<f64>()
        / total;
    (mean, (var / n as f64).sqrt())
}


impl RiskTable {
    /// Returns every row: the candidates in library order,
    /// then [`SUPER_LEARNER`] and [`DISCRETE_SL`].
    pub fn rows(&self) -> &[RiskRow] {
        &self.rows[..]
    }


    /// Returns the row named `name`.
    pub fn row(&self, name: &str) -> Option<&RiskRow> {
        self.rows.iter().find(|r| r.name == name)
    }


    /// Returns how many outer folds each candidate won.
    pub fn winner_counts(&self) -> &[usize] {
        &self.winner_counts[..]
    }


    /// Returns the number of failed inner fits of each candidate,
    /// summed over the outer folds.
    pub fn failure_counts(&self) -> &[usize] {
        &self.failure_counts[..]
    }


    /// Returns the number of outer folds whose ensemble was degraded.
    pub fn degraded_folds(&self) -> usize {
        self.degraded_folds
    }


    /// Returns the outer out-of-fold predictions,
    /// one column per row of the table.
    pub fn predictions(&self) -> &PredictionMatrix {
        &self.predictions
    }
}


impl fmt::Display for RiskTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "----------\n# Nested cross-validation\n")?;
        writeln!(
            f, "{:<32} {:>12} {:>12} {:>12} {:>12} {:>6}",
            "Algorithm", "Ave", "se", "Min", "Max", "Wins",
        )?;
        let n_candidates = self.winner_counts.len();
        for (r, row) in self.rows.iter().enumerate() {
            let wins = if r < n_candidates {
                self.winner_counts[r].to_string()
            } else {
                String::new()
            };
            writeln!(
                f, "{:<32} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>6}",
                row.name, row.risk, row.se, row.min, row.max, wins,
            )?;
        }
        write!(f, "----------")
    }
}
