use approx::assert_abs_diff_eq;
use rand::prelude::*;
use rand_distr::Normal;
use ministack::prelude::*;


fn linear_sample(n_sample: usize, seed: u64) -> Sample {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let x1 = (0..n_sample).map(|_| normal.sample(&mut rng)).collect::<Vec<f64>>();
    let x2 = (0..n_sample).map(|_| normal.sample(&mut rng)).collect::<Vec<f64>>();
    let y = x1.iter()
        .zip(&x2)
        .map(|(a, b)| 1.0 + 2.0 * a - b + 0.5 * normal.sample(&mut rng))
        .collect::<Vec<_>>();
    let features = vec![
        Feature::from_values("x1", x1),
        Feature::from_values("x2", x2),
    ];
    Sample::from_columns(features, y).unwrap()
}


fn logistic_sample(n_sample: usize, seed: u64) -> Sample {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let x = (0..n_sample).map(|_| normal.sample(&mut rng)).collect::<Vec<f64>>();
    let y = x.iter()
        .map(|a| {
            let p = 1.0 / (1.0 + (-(0.5 + 1.5 * a)).exp());
            if rng.gen::<f64>() < p { 1.0 } else { 0.0 }
        })
        .collect::<Vec<_>>();
    Sample::from_columns(vec![Feature::from_values("x", x)], y).unwrap()
}


fn assert_on_simplex(weights: &[f64]) {
    assert!(weights.iter().all(|&w| w >= 0.0), "negative weight: {weights:?}");
    assert_abs_diff_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
}


/// Predicts the same constant everywhere.
#[derive(Clone, Copy)]
struct ConstantLearner(f64);
struct ConstantModel(f64);

impl Regressor for ConstantModel {
    fn predict(&self, _sample: &Sample, _row: usize) -> f64 { self.0 }
}

impl Learner for ConstantLearner {
    type Model = ConstantModel;
    fn name(&self) -> String { format!("Const({})", self.0) }
    fn fit(&self, _sample: &Sample, _weights: &[f64])
        -> Result<ConstantModel, LearnerError>
    {
        Ok(ConstantModel(self.0))
    }
}


/// Predicts `1` for the ids it was trained on, `0` otherwise.
struct Lookup;
struct LookupModel(Vec<f64>);

impl Regressor for LookupModel {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        let id = sample["id"][row];
        if self.0.contains(&id) { 1.0 } else { 0.0 }
    }
}

impl Learner for Lookup {
    type Model = LookupModel;
    fn name(&self) -> String { "Lookup".to_string() }
    fn fit(&self, sample: &Sample, _weights: &[f64])
        -> Result<LookupModel, LearnerError>
    {
        Ok(LookupModel(sample["id"].values().to_vec()))
    }
}


/// Fails on samples with fewer than `min_rows` rows,
/// predicts `42` otherwise.
struct NeedsRows {
    min_rows: usize,
}

impl Learner for NeedsRows {
    type Model = ConstantModel;
    fn name(&self) -> String { format!("NeedsRows({})", self.min_rows) }
    fn fit(&self, sample: &Sample, _weights: &[f64])
        -> Result<ConstantModel, LearnerError>
    {
        if sample.shape().0 < self.min_rows {
            Err(LearnerError::EmptySample)
        } else {
            Ok(ConstantModel(42.0))
        }
    }
}


/// Tests for `SuperLearner`.
#[cfg(test)]
pub mod super_learner_tests {
    use super::*;

    #[test]
    fn marginal_mean_with_eight_units() {
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0, 8.0, 6.0, 7.0];
        let x = Feature::from_values("x", (0..8).map(|i| i as f64).collect());
        let sample = Sample::from_columns(vec![x], y.clone()).unwrap();

        let library = Library::from_learners(vec![MeanLearner]);
        let model = SuperLearner::init(&sample)
            .n_folds(4)
            .seed(7)
            .fit(&library)
            .unwrap();
        assert_eq!(model.weights(), &[1.0]);

        // Independent computation of the cross-validated risk.
        let folds = CrossValidation::new(8).n_folds(4).seed(7).folds().unwrap();
        assert_eq!(folds.unit_sizes(), &[2, 2, 2, 2]);
        let risk = (0..8)
            .map(|i| {
                let train = folds.training_rows(folds.fold_of(i));
                let mean = train.iter().map(|&j| y[j]).sum::<f64>()
                    / train.len() as f64;
                (y[i] - mean).powi(2)
            })
            .sum::<f64>()
            / 8.0;
        assert_abs_diff_eq!(model.cv_risk()[0], risk, epsilon = 1e-12);

        let full_mean = y.iter().sum::<f64>() / 8.0;
        let predictions = model.predict(&sample).unwrap();
        assert!(predictions.iter().all(|&p| (p - full_mean).abs() < 1e-12));
    }

    #[test]
    fn no_out_of_fold_leakage() {
        let n_sample = 40;
        let id = Feature::from_values("id", (0..n_sample).map(|i| i as f64).collect());
        let y = (0..n_sample).map(|i| (i % 7) as f64).collect();
        let sample = Sample::from_columns(vec![id], y).unwrap();

        let library = Library::from_learners(vec![Lookup]);
        let model = SuperLearner::init(&sample)
            .n_folds(5)
            .fit(&library)
            .unwrap();
        let z = model.cv_predictions();
        assert_eq!(z.shape(), (n_sample, 1));
        assert!(z.column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn weights_are_on_the_simplex() {
        let sample = linear_sample(120, 11);
        let library = Library::from_learners(vec![
            Algorithm::Mean(MeanLearner),
            Algorithm::Linear(LinearRegression::new()),
            Algorithm::Tree(RegressionTree::new().max_depth(3)),
            Algorithm::Kernel(KernelSmoother::new()),
        ]);

        for method in [
            WeightMethod::Nnls,
            WeightMethod::FrankWolfe(FWType::LineSearch),
            WeightMethod::FrankWolfe(FWType::Classic),
        ] {
            let model = SuperLearner::init(&sample)
                .n_folds(5)
                .method(method)
                .fit(&library)
                .unwrap();
            if method != WeightMethod::FrankWolfe(FWType::Classic) {
                assert!(!model.is_degraded());
            }
            assert_on_simplex(model.weights());
            assert_eq!(model.discrete_winner_name(), "Linear_All");

            let blend_risk = Family::Gaussian.eval(&model.cv_blend(), sample.target());
            assert!(blend_risk < model.cv_risk()[0]);

            let predictions = model.predict(&sample).unwrap();
            assert!(predictions.iter().all(|p| p.is_finite()));
        }
    }

    #[test]
    fn binomial_combines_on_the_logit_scale() {
        let sample = logistic_sample(150, 3);
        let library = Library::from_learners(vec![
            Algorithm::Mean(MeanLearner),
            Algorithm::Logistic(LogisticRegression::new()),
        ]);
        let model = SuperLearner::init(&sample)
            .family(Family::Binomial)
            .n_folds(5)
            .fit(&library)
            .unwrap();

        assert_eq!(model.method(), WeightMethod::NnLogLik);
        assert_on_simplex(model.weights());
        let predictions = model.predict(&sample).unwrap();
        assert!(predictions.iter().all(|&p| 0.0 < p && p < 1.0));
    }

    #[test]
    fn failing_candidate_is_excluded() {
        let sample = linear_sample(30, 5);
        // Logistic regression rejects targets outside [0, 1].
        let library = Library::from_learners(vec![
            Algorithm::Mean(MeanLearner),
            Algorithm::Logistic(LogisticRegression::new()),
        ]);
        let model = SuperLearner::init(&sample)
            .n_folds(3)
            .fit(&library)
            .unwrap();

        assert_eq!(model.fold_failures(), &[0, 3]);
        assert_eq!(model.excluded(), &[false, true]);
        assert_eq!(model.weights(), &[1.0, 0.0]);
        assert_eq!(model.discrete_winner(), 0);
    }

    #[test]
    fn empty_screen_excludes_the_candidate() {
        let sample = linear_sample(30, 6);
        let library = Library::new()
            .push(Algorithm::Mean(MeanLearner), Screening::All)
            .push(
                Algorithm::Linear(LinearRegression::new()),
                Screening::CorrelationThreshold { min_abs: 2.0 },
            );
        let model = SuperLearner::init(&sample)
            .n_folds(3)
            .fit(&library)
            .unwrap();
        assert_eq!(model.excluded(), &[false, true]);
        assert_eq!(model.weights()[1], 0.0);
    }

    #[test]
    fn no_viable_candidate() {
        let sample = linear_sample(30, 7);
        let library = Library::from_learners(vec![
            Algorithm::Logistic(LogisticRegression::new()),
        ]);
        let result = SuperLearner::init(&sample).n_folds(3).fit(&library);
        assert!(matches!(
            result,
            Err(StackError::NoViableCandidate { n_candidates: 1 })
        ));
    }

    #[test]
    fn optimizer_failure_falls_back_to_the_discrete_winner() {
        let x = Feature::from_values("x", vec![0.0; 6]);
        let sample = Sample::from_columns(vec![x], vec![-1.0; 6]).unwrap();

        let library = Library::from_learners(vec![
            ConstantLearner(2.0),
            ConstantLearner(1.0),
        ]);
        let model = SuperLearner::init(&sample)
            .n_folds(3)
            .fit(&library)
            .unwrap();

        assert!(model.is_degraded());
        assert_eq!(model.discrete_winner(), 1);
        assert_eq!(model.weights(), &[0.0, 1.0]);
        assert_eq!(model.predict(&sample).unwrap(), vec![1.0; 6]);
    }

    #[test]
    fn configuration_errors_come_first() {
        let sample = linear_sample(10, 8);
        let library = Library::from_learners(vec![Algorithm::Mean(MeanLearner)]);

        let empty: Library<Algorithm> = Library::new();
        let result = SuperLearner::init(&sample).fit(&empty);
        assert!(matches!(result, Err(StackError::EmptyLibrary)));

        let result = SuperLearner::init(&sample).n_folds(11).fit(&library);
        assert!(matches!(result, Err(StackError::TooManyFolds { .. })));

        let result = SuperLearner::init(&sample)
            .n_folds(2)
            .family(Family::Binomial)
            .fit(&library);
        assert!(matches!(result, Err(StackError::InvalidTarget { .. })));

        let result = SuperLearner::init(&sample)
            .n_folds(2)
            .obs_weights(vec![1.0; 9])
            .fit(&library);
        assert!(matches!(result, Err(StackError::LengthMismatch { .. })));

        let mut weights = vec![1.0; 10];
        weights[3] = -1.0;
        let result = SuperLearner::init(&sample)
            .n_folds(2)
            .obs_weights(weights)
            .fit(&library);
        assert!(matches!(result, Err(StackError::InvalidWeights(_))));
    }

    #[test]
    fn clusters_share_folds_in_the_ensemble() {
        let sample = linear_sample(40, 9);
        let clusters = (0..40u64).map(|i| i / 4).collect::<Vec<_>>();
        let library = Library::from_learners(vec![
            Algorithm::Mean(MeanLearner),
            Algorithm::Linear(LinearRegression::new()),
        ]);
        let model = SuperLearner::init(&sample)
            .n_folds(10)
            .clusters(clusters)
            .fit(&library)
            .unwrap();
        assert_on_simplex(model.weights());

        let result = SuperLearner::init(&sample)
            .n_folds(11)
            .clusters((0..40u64).map(|i| i / 4).collect())
            .fit(&library);
        assert!(matches!(
            result,
            Err(StackError::TooManyFolds { n_folds: 11, n_units: 10 })
        ));
    }

    #[test]
    fn json_round_trip_keeps_predictions() {
        let sample = linear_sample(60, 10);
        let library = Library::from_learners(vec![
            Algorithm::Mean(MeanLearner),
            Algorithm::Linear(LinearRegression::new()),
            Algorithm::Tree(RegressionTree::new()),
        ]);
        let model = SuperLearner::init(&sample)
            .n_folds(4)
            .fit(&library)
            .unwrap();

        let json = model.to_json().unwrap();
        let restored = EnsembleModel::<AlgorithmModel>::from_json(&json).unwrap();
        assert_eq!(restored.names(), model.names());
        assert_eq!(restored.discrete_winner(), model.discrete_winner());

        let expected = model.predict(&sample).unwrap();
        let actual = restored.predict(&sample).unwrap();
        for (a, e) in actual.iter().zip(&expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-9);
        }
    }

    #[test]
    fn excluded_candidates_are_still_refitted() {
        let x = Feature::from_values("x", (0..20).map(|i| i as f64).collect());
        let y = (0..20).map(|i| (i % 2) as f64).collect();
        let sample = Sample::from_columns(vec![x], y).unwrap();

        // Training folds have 15 rows, the full sample 20.
        let library = Library::from_learners(vec![
            NeedsRows { min_rows: 1 },
            NeedsRows { min_rows: 20 },
        ]);
        let model = SuperLearner::init(&sample)
            .n_folds(4)
            .fit(&library)
            .unwrap();

        assert_eq!(model.fold_failures(), &[0, 4]);
        assert_eq!(model.excluded(), &[false, true]);
        assert_eq!(model.weights(), &[1.0, 0.0]);
        assert_eq!(model.refit_failed(), &[false, false]);
        assert!(!model.candidates()[1].is_constant());

        let predictions = model.predict_candidates(&sample).unwrap();
        assert_eq!(predictions[1], vec![42.0; 20]);
    }

    #[test]
    fn failed_refit_is_flagged() {
        let sample = linear_sample(30, 12);
        let library = Library::from_learners(vec![
            Algorithm::Mean(MeanLearner),
            Algorithm::Logistic(LogisticRegression::new()),
        ]);
        let model = SuperLearner::init(&sample)
            .n_folds(3)
            .fit(&library)
            .unwrap();

        assert_eq!(model.refit_failed(), &[false, true]);
        assert!(model.candidates()[1].is_constant());
        let mean = sample.target().iter().sum::<f64>() / 30.0;
        let predictions = model.predict_candidates(&sample).unwrap();
        assert!(predictions[1].iter().all(|p| (p - mean).abs() < 1e-12));
    }
}
