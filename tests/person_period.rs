use rand::prelude::*;
use ministack::prelude::*;


fn simulated(n_subjects: usize, seed: u64) -> SurvivalSample {
    let mut rng = StdRng::seed_from_u64(seed);
    let age = (0..n_subjects)
        .map(|_| rng.gen_range(20.0..80.0))
        .collect::<Vec<f64>>();
    let ftime = (0..n_subjects).map(|_| rng.gen_range(1..=8)).collect();
    let ftype = (0..n_subjects).map(|_| rng.gen_range(0..=2)).collect();

    let covariates = Sample::from_features(vec![Feature::from_values("age", age)])
        .unwrap();
    SurvivalSample::new(covariates, ftime, ftype).unwrap()
}


/// Tests for the person-period expansion.
#[cfg(test)]
pub mod person_period_tests {
    use super::*;

    #[test]
    fn deterministic_expansion() {
        let x = Feature::from_values("x", vec![0.5, 1.5, 2.5]);
        let covariates = Sample::from_features(vec![x]).unwrap();
        let data = SurvivalSample::new(covariates, vec![2, 1, 5], vec![1, 0, 1])
            .unwrap();

        let pp = Expander::new(3).expand(&data).unwrap();
        assert_eq!(pp.len(), 2 + 1 + 3);
        assert_eq!(pp.n_subjects(), 3);
        assert_eq!(pp.subject(), &[0, 0, 1, 2, 2, 2]);
        assert_eq!(pp.time(), &[1, 2, 1, 1, 2, 3]);
        assert_eq!(pp.sample().target(), &[0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(pp.sample()["x"].values(), &[0.5, 0.5, 1.5, 2.5, 2.5, 2.5]);
        assert_eq!(pp.sample()["time"].values(), &[1.0, 2.0, 1.0, 1.0, 2.0, 3.0]);

        // The event at time 5 lies past the horizon.
        assert_eq!(pp.outcomes(), vec![(2, true), (1, false), (3, false)]);
    }

    #[test]
    fn simulated_round_trip() {
        let data = simulated(200, 5);
        for horizon in [1, 4, 8, 12] {
            let pp = Expander::new(horizon).expand(&data).unwrap();

            let expected_rows = data.ftime()
                .iter()
                .map(|&t| t.min(horizon))
                .sum::<usize>();
            assert_eq!(pp.len(), expected_rows);
            assert_eq!(pp.horizon(), horizon);

            let outcomes = pp.outcomes();
            assert_eq!(outcomes.len(), data.len());
            for (i, &(t, event)) in outcomes.iter().enumerate() {
                let ftime = data.ftime()[i];
                assert_eq!(t, ftime.min(horizon));
                assert_eq!(event, data.ftype()[i] > 0 && ftime <= horizon);
            }

            // At most one event per subject, always on the last row.
            let target = pp.sample().target();
            let n_events = target.iter().filter(|&&y| y == 1.0).count();
            assert_eq!(n_events, outcomes.iter().filter(|o| o.1).count());
        }
    }

    #[test]
    fn cause_specific_events() {
        let data = simulated(100, 6);
        let pp = Expander::new(8).cause(2).expand(&data).unwrap();
        for (i, &(_, event)) in pp.outcomes().iter().enumerate() {
            assert_eq!(event, data.ftype()[i] == 2);
        }
    }

    #[test]
    fn custom_time_column() {
        let data = simulated(10, 7);
        let pp = Expander::new(3).time_column("period").expand(&data).unwrap();
        assert_eq!(pp.sample().feature_names(), vec!["age", "period"]);
        assert!(pp.sample().column("time").is_err());
    }

    #[test]
    fn folds_keep_subjects_together() {
        let data = simulated(60, 8);
        let pp = Expander::new(6).expand(&data).unwrap();

        let folds = CrossValidation::new(pp.len())
            .n_folds(5)
            .clusters(pp.clusters().to_vec())
            .folds()
            .unwrap();
        for r in 1..pp.len() {
            if pp.subject()[r] == pp.subject()[r - 1] {
                assert_eq!(folds.fold_of(r), folds.fold_of(r - 1));
            }
        }
    }

    #[test]
    fn subject_clusters_carry_over() {
        let data = simulated(30, 9)
            .clusters((0..30u64).map(|i| i / 3).collect())
            .unwrap();
        let pp = Expander::new(4).expand(&data).unwrap();
        for (r, &i) in pp.subject().iter().enumerate() {
            assert_eq!(pp.clusters()[r], i as u64 / 3);
        }
    }

    #[test]
    fn prediction_rows_and_collapse() {
        let data = simulated(4, 10);
        let expander = Expander::new(3);
        let pp = expander.expand_for_prediction(data.covariates()).unwrap();
        assert_eq!(pp.len(), 12);
        assert_eq!(pp.time(), &[1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);

        let hazards = vec![0.5; 12];
        let curves = expander.collapse(&pp, &hazards).unwrap();
        assert_eq!(curves.len(), 4);
        for curve in curves {
            assert_eq!(curve, vec![0.5, 0.25, 0.125]);
        }

        let result = expander.collapse(&pp, &hazards[..11]);
        assert!(matches!(result, Err(StackError::LengthMismatch { .. })));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let data = simulated(5, 11);
        let result = Expander::new(0).expand(&data);
        assert!(matches!(result, Err(StackError::InvalidHorizon(0))));
    }
}
