use rand::prelude::*;
use colored::Colorize;

use std::collections::HashMap;
use std::iter::Iterator;

use crate::{
    common::{checker, constants::{DEFAULT_N_FOLDS, DEFAULT_SEED}},
    Sample,
    StackError,
};

const WIDTH: usize = 9;


/// A struct that assigns every row to one of `V` folds.
///
/// The assignment works on *units*: the rows themselves,
/// or the distinct cluster ids when clusters are given.
/// Units are shuffled with the seed and dealt round-robin,
/// so the number of units per fold differs by at most one
/// and the rows of a cluster always share a fold.
///
/// # Example
/// ```
/// use ministack::prelude::*;
///
/// let folds = CrossValidation::new(10)
///     .n_folds(3)
///     .seed(777)
///     .folds()
///     .unwrap();
///
/// for (train, valid) in folds.iter() {
///     assert_eq!(train.len() + valid.len(), 10);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_rows: usize,
    n_folds: usize,
    seed: u64,
    clusters: Option<Vec<u64>>,
    shuffle: bool,
    verbose: bool,
}


/// A fold assignment produced by [`CrossValidation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folds {
    assignment: Vec<usize>,
    validation: Vec<Vec<usize>>,
    unit_sizes: Vec<usize>,
}


impl CrossValidation {
    /// Construct a new instance of `CrossValidation`
    /// for `n_rows` rows.
    #[inline]
    pub fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            n_folds: DEFAULT_N_FOLDS,
            seed: DEFAULT_SEED,
            clusters: None,
            shuffle: true,
            verbose: false,
        }
    }


    /// Set the number of folds.
    /// Default value is `10.`
    #[inline]
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the seed of the randomness for shuffling.
    /// Default vaule is `1234.`
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the cluster id of each row.
    /// Rows sharing an id are kept in one fold.
    #[inline]
    pub fn clusters(mut self, clusters: Vec<u64>) -> Self {
        self.clusters = Some(clusters);
        self
    }


    /// Shuffle the units before dealing them.
    /// By default, `CrossValidation` shuffles.
    /// Without shuffling, unit `p` goes to fold `p % V`.
    #[inline]
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }


    /// Set the verbose parameter.
    /// If `true`, [`CrossValidation::split`] prints some information
    /// when generating a train/test pair.
    /// Default vaule is `false.`
    #[inline]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Builds the fold assignment.
    ///
    /// Returns `Err` if `V < 2`, if `V` exceeds the number of units,
    /// or if the cluster ids do not match the rows.
    pub fn folds(&self) -> Result<Folds, StackError> {
        let (unit_of_row, n_units) = match &self.clusters {
            None => ((0..self.n_rows).collect::<Vec<_>>(), self.n_rows),
            Some(ids) => {
                if ids.len() != self.n_rows {
                    return Err(StackError::LengthMismatch {
                        what: "cluster ids",
                        expected: self.n_rows,
                        got: ids.len(),
                    });
                }
                units_of_clusters(ids)
            },
        };
        checker::n_folds(self.n_folds, n_units)?;

        let mut order = (0..n_units).collect::<Vec<_>>();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed);
            order.shuffle(&mut rng);
        }

        let mut fold_of_unit = vec![0usize; n_units];
        let mut unit_sizes = vec![0usize; self.n_folds];
        order.into_iter()
            .enumerate()
            .for_each(|(p, unit)| {
                let v = p % self.n_folds;
                fold_of_unit[unit] = v;
                unit_sizes[v] += 1;
            });

        let assignment = unit_of_row.into_iter()
            .map(|u| fold_of_unit[u])
            .collect::<Vec<_>>();
        Ok(Folds::from_assignment(assignment, unit_sizes))
    }


    /// Returns an iterator over the `(train, test)` sample pairs.
    pub fn split<'a>(&self, sample: &'a Sample)
        -> Result<FoldSplit<'a>, StackError>
    {
        let cv = Self { n_rows: sample.shape().0, ..self.clone() };
        let folds = cv.folds()?;
        Ok(FoldSplit { sample, folds, current_fold: 0, verbose: self.verbose })
    }
}


/// Maps each cluster id to a unit index, in order of first appearance.
fn units_of_clusters(ids: &[u64]) -> (Vec<usize>, usize) {
    let mut index = HashMap::new();
    let units = ids.iter()
        .map(|id| {
            let next = index.len();
            *index.entry(*id).or_insert(next)
        })
        .collect::<Vec<_>>();
    (units, index.len())
}


impl Folds {
    fn from_assignment(assignment: Vec<usize>, unit_sizes: Vec<usize>)
        -> Self
    {
        let mut validation = vec![Vec::new(); unit_sizes.len()];
        assignment.iter()
            .enumerate()
            .for_each(|(i, &v)| validation[v].push(i));
        Self { assignment, validation, unit_sizes }
    }


    /// Returns the number of folds.
    pub fn n_folds(&self) -> usize {
        self.validation.len()
    }


    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.assignment.len()
    }


    /// Returns the fold of `row`.
    #[inline(always)]
    pub fn fold_of(&self, row: usize) -> usize {
        self.assignment[row]
    }


    /// Returns the fold of every row.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment[..]
    }


    /// Returns the rows of fold `v`, in increasing order.
    pub fn validation_rows(&self, v: usize) -> &[usize] {
        &self.validation[v][..]
    }


    /// Returns the rows outside fold `v`, in increasing order.
    pub fn training_rows(&self, v: usize) -> Vec<usize> {
        self.assignment.iter()
            .enumerate()
            .filter_map(|(i, &f)| (f != v).then_some(i))
            .collect()
    }


    /// Returns the number of units in each fold.
    pub fn unit_sizes(&self) -> &[usize] {
        &self.unit_sizes[..]
    }


    /// Returns an iterator over `(training rows, validation rows)`.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, &[usize])> + '_ {
        (0..self.n_folds())
            .map(|v| (self.training_rows(v), self.validation_rows(v)))
    }
}


/// An iterator over the `(train, test)` pairs of a sample.
/// See [`CrossValidation::split`].
pub struct FoldSplit<'a> {
    sample: &'a Sample,
    folds: Folds,
    current_fold: usize,
    verbose: bool,
}


impl FoldSplit<'_> {
    /// Returns the fold assignment behind this iterator.
    pub fn folds(&self) -> &Folds {
        &self.folds
    }
}


impl Iterator for FoldSplit<'_> {
    type Item = (Sample, Sample);
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_fold >= self.folds.n_folds() { return None; }

        let v = self.current_fold;
        let train = self.sample.subset(&self.folds.training_rows(v));
        let test = self.sample.subset(self.folds.validation_rows(v));
        self.current_fold += 1;

        if self.verbose {
            let train_size = train.shape().0;
            let test_size = test.shape().0;
            println!(
                "{}    {}    {}",
                format!("  [{: >3}'th fold]", self.current_fold).bold().red(),
                format!("[TRAIN {:>WIDTH$}]", train_size).bold().green(),
                format!("[TEST {:>WIDTH$}]", test_size).bold().yellow(),
            );
        }

        Some((train, test))
    }
}
