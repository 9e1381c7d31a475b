//! Built-in screens.
use serde::{Serialize, Deserialize};

use crate::{Feature, Sample};
use super::core::Screen;


/// The built-in screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Screening {
    /// Keep every column.
    #[default]
    All,

    /// Keep the named columns that exist in the sample.
    Columns(Vec<String>),

    /// Keep the `top_k` columns with the largest
    /// absolute Pearson correlation with the target.
    Correlation {
        /// Number of columns to keep.
        top_k: usize,
    },

    /// Keep the columns whose absolute Pearson correlation
    /// with the target is at least `min_abs`.
    CorrelationThreshold {
        /// Threshold on `|corr|`.
        min_abs: f64,
    },
}


impl Screen for Screening {
    fn name(&self) -> String {
        match self {
            Self::All => "All".to_string(),
            Self::Columns(names) => format!("Columns[{}]", names.join(",")),
            Self::Correlation { top_k } => format!("Corr(top={top_k})"),
            Self::CorrelationThreshold { min_abs }
                => format!("Corr(min={min_abs})"),
        }
    }


    fn select(&self, sample: &Sample) -> Vec<String> {
        match self {
            Self::All => sample.feature_names(),
            Self::Columns(names) => sample.features()
                .iter()
                .filter(|feat| names.iter().any(|n| n == feat.name()))
                .map(|feat| feat.name().to_string())
                .collect(),
            Self::Correlation { top_k } => {
                let mut scored = correlations(sample);
                scored.sort_by(|a, b| b.1.total_cmp(&a.1));
                let mut keep = scored.into_iter()
                    .take(*top_k)
                    .map(|(k, _)| k)
                    .collect::<Vec<_>>();
                keep.sort_unstable();
                names_at(sample, &keep)
            },
            Self::CorrelationThreshold { min_abs } => {
                let keep = correlations(sample).into_iter()
                    .filter(|(_, c)| *c >= *min_abs)
                    .map(|(k, _)| k)
                    .collect::<Vec<_>>();
                names_at(sample, &keep)
            },
        }
    }
}


fn names_at(sample: &Sample, indices: &[usize]) -> Vec<String> {
    let features = sample.features();
    indices.iter()
        .map(|&k| features[k].name().to_string())
        .collect()
}


/// Returns `(column index, |corr(x, y)|)`.
/// Constant columns get correlation `0`.
fn correlations(sample: &Sample) -> Vec<(usize, f64)> {
    let y = sample.target();
    sample.features()
        .iter()
        .enumerate()
        .map(|(k, feat)| (k, abs_correlation(feat, y)))
        .collect()
}


fn abs_correlation(feat: &Feature, y: &[f64]) -> f64 {
    let n = y.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mx = feat.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let (sxy, sxx, syy) = feat.iter()
        .zip(y)
        .fold((0f64, 0f64, 0f64), |(sxy, sxx, syy), (x, y)| {
            let (dx, dy) = (x - mx, y - my);
            (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
        });
    let denom = (sxx * syy).sqrt();
    if denom > 0.0 && denom.is_finite() { (sxy / denom).abs() } else { 0.0 }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Sample {
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let features = vec![
            Feature::from_values("noise", vec![1.0, -1.0, -1.0, 1.0]),
            Feature::from_values("signal", vec![2.0, 4.1, 5.9, 8.0]),
            Feature::from_values("flat", vec![3.0; 4]),
        ];
        Sample::from_columns(features, y).unwrap()
    }

    #[test]
    fn test_all_and_columns() {
        let sample = toy();
        assert_eq!(Screening::All.select(&sample).len(), 3);

        let screen = Screening::Columns(vec!["flat".into(), "gone".into()]);
        assert_eq!(screen.select(&sample), vec!["flat"]);
    }

    #[test]
    fn test_correlation_screens() {
        let sample = toy();
        let top = Screening::Correlation { top_k: 1 }.select(&sample);
        assert_eq!(top, vec!["signal"]);

        let screen = Screening::CorrelationThreshold { min_abs: 0.99 };
        assert_eq!(screen.select(&sample), vec!["signal"]);

        let screen = Screening::CorrelationThreshold { min_abs: 1.5 };
        assert!(screen.select(&sample).is_empty());
    }
}
