use rand::prelude::*;
use ministack::prelude::*;


/// Subjects with larger `x` fail earlier.
fn simulated(n_subjects: usize, seed: u64) -> SurvivalSample {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = (0..n_subjects).map(|_| rng.gen::<f64>()).collect::<Vec<_>>();
    let mut ftime = Vec::with_capacity(n_subjects);
    let mut ftype = Vec::with_capacity(n_subjects);
    for &xi in x.iter() {
        let hazard = 0.1 + 0.3 * xi;
        let censor = rng.gen_range(2..=8);
        let mut t = 1;
        while t < censor && rng.gen::<f64>() >= hazard {
            t += 1;
        }
        ftime.push(t);
        ftype.push(if t < censor { 1 } else { 0 });
    }

    let covariates = Sample::from_features(vec![Feature::from_values("x", x)])
        .unwrap();
    SurvivalSample::new(covariates, ftime, ftype).unwrap()
}


fn library() -> Library<Algorithm> {
    Library::from_learners(vec![
        Algorithm::Mean(MeanLearner),
        Algorithm::Logistic(LogisticRegression::new()),
    ])
}


fn assert_valid_curves(curves: &[Vec<f64>], horizon: usize) {
    for curve in curves {
        assert_eq!(curve.len(), horizon);
        let mut prev = 1.0;
        for &s in curve {
            assert!((0.0..=1.0).contains(&s));
            assert!(s <= prev);
            prev = s;
        }
    }
}


/// Tests for `DiscreteSurvival`.
#[cfg(test)]
pub mod hazard_tests {
    use super::*;

    #[test]
    fn pooled_hazard() {
        let data = simulated(150, 1);
        let model = DiscreteSurvival::init(&data)
            .horizon(5)
            .n_folds(5)
            .fit(&library())
            .unwrap();
        assert_eq!(model.horizon(), 5);
        assert!(matches!(model.model(), HazardModel::Pooled(_)));

        let covariates = data.covariates();
        let curves = model.predict_survival(covariates).unwrap();
        assert_eq!(curves.len(), data.len());
        assert_valid_curves(&curves, 5);

        let at_zero = model.survival_at(covariates, 0).unwrap();
        assert!(at_zero.iter().all(|&s| s == 1.0));

        let at_three = model.survival_at(covariates, 3).unwrap();
        for (s, curve) in at_three.iter().zip(&curves) {
            assert_eq!(*s, curve[2]);
        }

        let result = model.survival_at(covariates, 6);
        assert!(matches!(result, Err(StackError::InvalidHorizon(6))));
    }

    #[test]
    fn per_time_hazard() {
        let data = simulated(200, 2);
        let model = DiscreteSurvival::init(&data)
            .horizon(4)
            .pool_across_time(false)
            .n_folds(3)
            .fit(&library())
            .unwrap();
        match model.model() {
            HazardModel::PerTime(models) => assert_eq!(models.len(), 4),
            HazardModel::Pooled(_) => panic!("expected one model per time"),
        }

        let hazards = model.predict_hazards(data.covariates()).unwrap();
        assert!(hazards.iter().flatten().all(|&h| (0.0..=1.0).contains(&h)));

        let curves = model.predict_survival(data.covariates()).unwrap();
        assert_valid_curves(&curves, 4);
    }

    #[test]
    fn default_horizon_is_the_largest_time() {
        let data = simulated(80, 3);
        let model = DiscreteSurvival::init(&data)
            .n_folds(4)
            .fit(&library())
            .unwrap();
        assert_eq!(model.horizon(), data.max_time());
    }

    #[test]
    fn per_time_checks_run_before_any_fit() {
        let x = Feature::from_values("x", vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let covariates = Sample::from_features(vec![x]).unwrap();
        // Only two subjects are at risk at t = 3.
        let data = SurvivalSample::new(
            covariates, vec![1, 2, 1, 2, 3, 3], vec![1, 1, 0, 1, 1, 0],
        ).unwrap();

        let result = DiscreteSurvival::init(&data)
            .horizon(3)
            .pool_across_time(false)
            .n_folds(3)
            .fit(&library());
        assert!(matches!(
            result,
            Err(StackError::TooManyFolds { n_folds: 3, n_units: 2 })
        ));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let data = simulated(20, 4);
        let result = DiscreteSurvival::init(&data)
            .horizon(0)
            .n_folds(2)
            .fit(&library());
        assert!(matches!(result, Err(StackError::InvalidHorizon(0))));
    }
}
