use serde::{Serialize, Deserialize};
use crate::{
    common::utils,
    Regressor,
    Sample,
    StackError,
};


/// How the candidate predictions are combined.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combination {
    /// `Σ_j w_j p_j`.
    Identity,
    /// `sigmoid(Σ_j w_j logit(p_j))`.
    /// Used by the binomial log-likelihood stacking.
    Logit,
}


impl Combination {
    /// Combine a row of candidate predictions with `weights`.
    #[inline]
    pub fn combine(&self, weights: &[f64], predictions: &[f64]) -> f64 {
        match self {
            Self::Identity => utils::inner_product(weights, predictions),
            Self::Logit => {
                let eta = weights.iter()
                    .zip(predictions)
                    .map(|(w, p)| w * utils::logit(*p))
                    .sum::<f64>();
                utils::sigmoid(eta)
            },
        }
    }
}


/// The fitted part of a candidate.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum CandidateFit<M> {
    /// A fitted model.
    Model(M),
    /// A constant prediction.
    /// Used when the full-data refit failed.
    Constant(f64),
}


/// A candidate refitted on the full data,
/// together with the columns its screen selected.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FittedCandidate<M> {
    /// Candidate name, `"{learner}_{screen}"`.
    pub name: String,
    /// Columns selected by the screen, in fitting order.
    pub columns: Vec<String>,
    /// The fitted model.
    pub fit: CandidateFit<M>,
}


impl<M: Regressor> FittedCandidate<M> {
    /// Predicts every row of `sample`.
    /// `sample` must contain the columns in `self.columns`.
    pub fn predict_all(&self, sample: &Sample)
        -> Result<Vec<f64>, StackError>
    {
        let n_sample = sample.shape().0;
        match &self.fit {
            CandidateFit::Model(model) => {
                let sample = sample.select(&self.columns)?;
                Ok(model.predict_all(&sample))
            },
            CandidateFit::Constant(c) => Ok(vec![*c; n_sample]),
        }
    }


    /// Returns `true` if the full-data refit fell back to a constant.
    pub fn is_constant(&self) -> bool {
        matches!(self.fit, CandidateFit::Constant(_))
    }
}


/// A weighted combination of fitted candidates.
/// You can read/write this struct by `Serde` trait.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WeightedMajority<M> {
    /// Weights on each candidate in `self.candidates`.
    pub weights: Vec<f64>,
    /// Set of fitted candidates.
    pub candidates: Vec<FittedCandidate<M>>,
    /// Combination rule.
    pub combination: Combination,
}


impl<M> WeightedMajority<M> {
    /// Construct a new `WeightedMajority`.
    /// Weights are normalized so that `\| w \|_1 = 1`.
    pub fn new(
        mut weights: Vec<f64>,
        candidates: Vec<FittedCandidate<M>>,
        combination: Combination,
    ) -> Self
    {
        utils::normalize(&mut weights[..]);
        Self { weights, candidates, combination, }
    }


    /// Decompose the combined hypothesis
    /// into the weights and the candidates.
    #[inline]
    pub fn decompose(self) -> (Vec<f64>, Vec<FittedCandidate<M>>) {
        (self.weights, self.candidates)
    }
}


impl<M: Regressor> WeightedMajority<M> {
    /// Returns the prediction matrix of the candidates on `sample`,
    /// one vector per candidate. Candidates with zero weight
    /// get an empty vector.
    pub fn candidate_predictions(&self, sample: &Sample)
        -> Result<Vec<Vec<f64>>, StackError>
    {
        self.weights.iter()
            .zip(&self.candidates[..])
            .map(|(&w, c)| {
                if w > 0.0 { c.predict_all(sample) } else { Ok(Vec::new()) }
            })
            .collect()
    }


    /// Predicts the target values of `sample`.
    pub fn predict_all(&self, sample: &Sample)
        -> Result<Vec<f64>, StackError>
    {
        let n_sample = sample.shape().0;
        let predictions = self.candidate_predictions(sample)?;

        let (weights, columns): (Vec<f64>, Vec<&Vec<f64>>) = self.weights
            .iter()
            .zip(&predictions[..])
            .filter(|(&w, _)| w > 0.0)
            .map(|(&w, p)| (w, p))
            .unzip();

        let combined = (0..n_sample)
            .map(|i| {
                let row = columns.iter()
                    .map(|p| p[i])
                    .collect::<Vec<_>>();
                self.combination.combine(&weights, &row)
            })
            .collect();
        Ok(combined)
    }
}
