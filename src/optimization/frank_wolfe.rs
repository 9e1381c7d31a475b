//! Frank-Wolfe over the probability simplex.
//!
//! Minimizes the weighted risk `F(w) = Σ_i v_i l(Z_i w, y_i) / Σ_i v_i`
//! of the blended predictions directly on the simplex,
//! so the output needs no renormalization.
use serde::{Serialize, Deserialize};

use crate::{
    common::{
        constants::{FRANK_WOLFE_MAX_ITER, FRANK_WOLFE_TOLERANCE},
        utils,
    },
    Family,
    LossFunction,
    OptimizerError,
};


const SUB_TOLERANCE: f64 = 1e-9;
/// A run that exhausts its budget is accepted below this duality gap.
const ACCEPTABLE_GAP: f64 = 1e-4;


/// FWType updates.
/// These options correspond to the Frank-Wolfe strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FWType {
    /// Classic step size, `2 / (t + 2)`.
    Classic,

    /// Line-search step size,
    /// Adopt the best step size on the descent direction.
    #[default]
    LineSearch,
}


pub(crate) struct FrankWolfe<'a> {
    family: Family,
    fw_type: FWType,
    z: &'a [&'a [f64]],
    y: &'a [f64],
    weights: &'a [f64],
    total: f64,
}


impl<'a> FrankWolfe<'a> {
    /// Create a new FrankWolfe instance
    pub(crate) fn new(
        family: Family,
        fw_type: FWType,
        z: &'a [&'a [f64]],
        y: &'a [f64],
        weights: &'a [f64],
    ) -> Self
    {
        let total = weights.iter().sum::<f64>();
        Self { family, fw_type, z, y, weights, total, }
    }


    /// Runs Frank-Wolfe from the uniform weights.
    pub(crate) fn run(&self) -> Result<Vec<f64>, OptimizerError> {
        let k = self.z.len();
        let mut weights = vec![1.0 / k as f64; k];
        let mut gap = f64::INFINITY;

        for iteration in 0..FRANK_WOLFE_MAX_ITER {
            let blend = self.blend(&weights);
            let grad = self.gradient(&blend);

            // Linear minimization oracle: the best vertex.
            let vertex = (0..k)
                .min_by(|&a, &b| grad[a].total_cmp(&grad[b]))
                .ok_or(OptimizerError::ZeroWeights)?;

            gap = utils::inner_product(&grad, &weights) - grad[vertex];
            let scale = self.family.weighted_eval(&blend, self.y, self.weights)
                .abs()
                .max(1.0);
            if gap <= FRANK_WOLFE_TOLERANCE * scale {
                return Ok(weights);
            }

            weights = self.next_iterate(iteration, vertex, &blend, weights);
        }

        if gap <= ACCEPTABLE_GAP {
            Ok(weights)
        } else {
            Err(OptimizerError::NotConverged(FRANK_WOLFE_MAX_ITER))
        }
    }


    /// Returns the next weights on the candidates.
    fn next_iterate(
        &self,
        iteration: usize,
        vertex: usize,
        blend: &[f64],
        weights: Vec<f64>,
    ) -> Vec<f64>
    {
        let step_size = match self.fw_type {
            FWType::Classic => 2.0_f64 / ((iteration + 2) as f64),
            FWType::LineSearch => self.line_search(vertex, blend),
        };
        interior_point(step_size, vertex, weights)
    }


    /// `Z w`.
    fn blend(&self, weights: &[f64]) -> Vec<f64> {
        (0..self.y.len())
            .map(|i| {
                self.z.iter()
                    .zip(weights)
                    .map(|(c, w)| w * c[i])
                    .sum::<f64>()
            })
            .collect()
    }


    /// `∇F(w)_j = Σ_i v_i l'(Z_i w, y_i) Z_ij / Σ v`.
    fn gradient(&self, blend: &[f64]) -> Vec<f64> {
        let dl = self.pointwise_derivative(blend);
        self.z.iter()
            .map(|c| utils::inner_product(&dl, c) / self.total)
            .collect()
    }


    fn pointwise_derivative(&self, blend: &[f64]) -> Vec<f64> {
        blend.iter()
            .zip(self.y)
            .zip(self.weights)
            .map(|((&p, &y), &v)| {
                if v > 0.0 { v * self.family.gradient_at_point(p, y) }
                else { 0.0 }
            })
            .collect()
    }


    /// Bisection on the directional derivative along `e_vertex - w`.
    fn line_search(&self, vertex: usize, blend: &[f64]) -> f64
    {
        // `Z (e_h - w)`
        let dir = self.z[vertex].iter()
            .zip(blend)
            .map(|(zv, b)| zv - b)
            .collect::<Vec<_>>();

        let slope = |step: f64| -> f64 {
            let point = blend.iter()
                .zip(&dir)
                .map(|(b, d)| b + step * d)
                .collect::<Vec<_>>();
            utils::inner_product(&self.pointwise_derivative(&point), &dir)
        };

        // Check the case where the step size is `1`.
        if slope(1.0) <= 0.0 {
            return 1.0;
        }

        let mut ub = 1.0;
        let mut lb = 0.0;
        while ub - lb > SUB_TOLERANCE {
            let step_size = (lb + ub) / 2.0;
            let dot = slope(step_size);

            if dot < 0.0 {
                lb = step_size;
            } else if dot > 0.0 {
                ub = step_size;
            } else {
                break;
            }
        }
        (lb + ub) / 2.0
    }
}


/// Take the interior point of the given two arrays.
pub(crate) fn interior_point(
    step_size: f64,
    new_basis: usize,
    base: Vec<f64>,
) -> Vec<f64>
{
    debug_assert!((0.0..=1.0).contains(&step_size));
    base.into_iter()
        .enumerate()
        .map(|(j, b)| {
            let dir = if j == new_basis { 1.0 - b } else { -b };

            b + step_size * dir
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_interior_point() {
        let w = interior_point(0.5, 1, vec![1.0, 0.0]);
        assert_eq!(w, vec![0.5, 0.5]);
    }

    #[test]
    fn test_line_search_finds_exact_blend() {
        let a = [0.0, 1.0, 2.0, 3.0];
        let b = [2.0, 3.0, 4.0, 5.0];
        let y = [0.5, 1.5, 2.5, 3.5];
        let z = [&a[..], &b[..]];

        let fw = FrankWolfe::new(
            Family::Gaussian, FWType::LineSearch, &z, &y, &[1.0; 4],
        );
        let w = fw.run().unwrap();
        assert_abs_diff_eq!(w[0], 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(w[1], 0.25, epsilon = 1e-6);
    }
}
