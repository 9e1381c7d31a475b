use crate::Sample;


/// A trait that defines the behavor of a fitted model.
/// You only need to implement `predict` method.
///
/// The columns of `sample` are in the same order as
/// the columns the model was fitted on.
pub trait Regressor {
    /// Predicts the target value of the i'th row of the `sample`.
    fn predict(&self, sample: &Sample, row: usize) -> f64;


    /// Predicts the target values of `sample`.
    fn predict_all(&self, sample: &Sample) -> Vec<f64>
    {
        let n_sample = sample.shape().0;
        (0..n_sample).map(|row| self.predict(sample, row))
            .collect::<Vec<_>>()
    }
}
