//! Nadaraya-Watson kernel smoother.
use serde::{Serialize, Deserialize};

use crate::{
    LearnerError,
    Regressor,
    Sample,
};
use super::core::{Learner, check_training_sample};


/// A Nadaraya-Watson smoother with a Gaussian kernel
/// on standardized features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelSmoother {
    pub(crate) bandwidth: f64,
}


/// The model returned by [`KernelSmoother`].
/// It keeps the (standardized) training rows with positive weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelRegressor {
    bandwidth: f64,
    center: Vec<f64>,
    scale: Vec<f64>,
    rows: Vec<Vec<f64>>,
    target: Vec<f64>,
    weights: Vec<f64>,
}


impl Default for KernelSmoother {
    fn default() -> Self {
        Self { bandwidth: 1.0 }
    }
}


impl KernelSmoother {
    /// Construct a smoother with bandwidth `1`.
    pub fn new() -> Self {
        Self::default()
    }


    /// Set the bandwidth (in units of standard deviations).
    pub fn bandwidth(mut self, bandwidth: f64) -> Self {
        assert!(bandwidth > 0.0, "bandwidth must be positive");
        self.bandwidth = bandwidth;
        self
    }
}


impl Learner for KernelSmoother {
    type Model = KernelRegressor;


    fn name(&self) -> String {
        format!("Kernel({})", self.bandwidth)
    }


    fn fit(&self, sample: &Sample, weights: &[f64])
        -> Result<Self::Model, LearnerError>
    {
        check_training_sample(sample, weights)?;
        if sample.shape().1 == 0 {
            return Err(LearnerError::NoFeature);
        }

        let (center, scale): (Vec<f64>, Vec<f64>) = sample.features()
            .iter()
            .map(|feat| {
                let (mean, var) = feat.weighted_mean_and_variance(weights);
                let sd = var.sqrt();
                (mean, if sd > 0.0 { sd } else { 1.0 })
            })
            .unzip();

        let keep = (0..sample.shape().0)
            .filter(|&i| weights[i] > 0.0)
            .collect::<Vec<_>>();
        let rows = keep.iter()
            .map(|&i| standardize(&sample.at(i).0, &center, &scale))
            .collect();
        let target = keep.iter().map(|&i| sample.target()[i]).collect();
        let weights = keep.iter().map(|&i| weights[i]).collect();

        Ok(KernelRegressor {
            bandwidth: self.bandwidth, center, scale, rows, target, weights,
        })
    }
}


fn standardize(x: &[f64], center: &[f64], scale: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(center.iter().zip(scale))
        .map(|(v, (c, s))| (v - c) / s)
        .collect()
}


impl Regressor for KernelRegressor {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        let x = standardize(&sample.at(row).0, &self.center, &self.scale);
        let h2 = self.bandwidth.powi(2);

        let log_kernel = self.rows.iter()
            .map(|r| {
                let d2 = r.iter()
                    .zip(&x)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>();
                -0.5 * d2 / h2
            })
            .collect::<Vec<_>>();
        let top = log_kernel.iter().copied().fold(f64::MIN, f64::max);

        let (numer, denom) = log_kernel.iter()
            .zip(self.target.iter().zip(&self.weights))
            .fold((0f64, 0f64), |(n, d), (lk, (y, w))| {
                let k = w * (lk - top).exp();
                (n + k * y, d + k)
            });
        numer / denom
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Feature;

    #[test]
    fn test_small_bandwidth_interpolates() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![5.0, 6.0, 7.0, 8.0];
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", x)], y.clone(),
        ).unwrap();
        let model = KernelSmoother::new()
            .bandwidth(0.01)
            .fit(&sample, &[1.0; 4])
            .unwrap();
        let p = model.predict_all(&sample);
        for (a, b) in p.iter().zip(&y) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_large_bandwidth_is_mean() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![1.0, 2.0, 3.0, 6.0];
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", x)], y,
        ).unwrap();
        let model = KernelSmoother::new()
            .bandwidth(1e6)
            .fit(&sample, &[1.0; 4])
            .unwrap();
        assert!((model.predict(&sample, 0) - 3.0).abs() < 1e-6);
    }
}
