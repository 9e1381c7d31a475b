//! The stacking weight optimizer.
//!
//! Given the out-of-fold matrix `Z`, the target and
//! the observation weights, the optimizer returns
//! non-negative candidate weights that sum to `1`.

pub mod prediction_matrix;
pub mod frank_wolfe;
pub(crate) mod nnls;
pub(crate) mod loglik;


use fixedbitset::FixedBitSet;
use serde::{Serialize, Deserialize};

use std::fmt;

use crate::{
    common::{constants::IDENTICAL_TOLERANCE, utils},
    hypothesis::Combination,
    Family,
    OptimizerError,
};

pub use prediction_matrix::PredictionMatrix;
pub use frank_wolfe::FWType;


/// How the stacking weights are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMethod {
    /// Non-negative least squares of `y` on `Z`, then renormalized.
    Nnls,

    /// Non-negative logistic regression of `y` on `logit(Z)`,
    /// then renormalized.
    /// The ensemble combines the candidates on the logit scale.
    NnLogLik,

    /// Direct minimization of the family's risk of `Z w`
    /// over the simplex.
    FrankWolfe(FWType),
}


impl WeightMethod {
    /// Returns the default method for `family`.
    pub fn default_for(family: Family) -> Self {
        match family {
            Family::Gaussian => Self::Nnls,
            Family::Binomial => Self::NnLogLik,
        }
    }


    /// Returns the rule that combines candidate predictions
    /// under the weights this method produces.
    pub fn combination(&self) -> Combination {
        match self {
            Self::NnLogLik => Combination::Logit,
            _ => Combination::Identity,
        }
    }
}


impl fmt::Display for WeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nnls => write!(f, "NNLS"),
            Self::NnLogLik => write!(f, "NNloglik"),
            Self::FrankWolfe(FWType::Classic) => write!(f, "Frank-Wolfe"),
            Self::FrankWolfe(FWType::LineSearch)
                => write!(f, "Frank-Wolfe (line search)"),
        }
    }
}


/// Computes the weights over the candidates flagged in `active`.
/// Inactive candidates get weight `0`.
///
/// If every active column is identical,
/// the weights are uniform over the active candidates.
pub(crate) fn optimize(
    method: WeightMethod,
    family: Family,
    z: &PredictionMatrix,
    y: &[f64],
    weights: &[f64],
    active: &FixedBitSet,
) -> Result<Vec<f64>, OptimizerError>
{
    let (_, n_cols) = z.shape();
    let index = active.ones().collect::<Vec<usize>>();
    if index.is_empty() {
        return Err(OptimizerError::ZeroWeights);
    }
    let columns = z.select(&index);

    let local = if columns_are_identical(&columns, weights) {
        vec![1.0 / index.len() as f64; index.len()]
    } else {
        match method {
            WeightMethod::Nnls => nnls::nnls(&columns, y, weights)?,
            WeightMethod::NnLogLik => loglik::nn_loglik(&columns, y, weights)?,
            WeightMethod::FrankWolfe(fw_type) => {
                frank_wolfe::FrankWolfe::new(
                    family, fw_type, &columns, y, weights,
                ).run()?
            },
        }
    };

    let mut local = local;
    let total = local.iter().sum::<f64>();
    if !total.is_finite() || total <= 0.0 {
        return Err(OptimizerError::ZeroWeights);
    }
    utils::normalize(&mut local[..]);

    let mut full = vec![0f64; n_cols];
    index.into_iter()
        .zip(local)
        .for_each(|(j, w)| full[j] = w.max(0.0));
    Ok(full)
}


/// Returns `true` if the columns agree on every row with positive weight.
fn columns_are_identical(columns: &[&[f64]], weights: &[f64]) -> bool {
    let first = columns[0];
    columns[1..].iter()
        .all(|c| {
            c.iter()
                .zip(first)
                .zip(weights)
                .all(|((a, b), &w)| w <= 0.0 || (a - b).abs() <= IDENTICAL_TOLERANCE)
        })
}
