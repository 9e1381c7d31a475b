use polars::prelude::*;
use ministack::prelude::*;


fn survival_frame(ftime: &[i64], ftype: &[i64]) -> DataFrame {
    df!(
        "age"   => &[50.0, 61.5, 47.0],
        "arm"   => &[0i64, 1, 1],
        "ftime" => ftime,
        "ftype" => ftype,
    ).unwrap()
}


/// Tests for reading samples from `polars::DataFrame`.
#[cfg(test)]
pub mod sample_tests {
    use super::*;

    #[test]
    fn sample_from_dataframe() {
        let data = df!(
            "x1" => &[1.0, 2.0, 3.0, 4.0],
            "y"  => &[0.5, 1.5, 2.5, 3.5],
            "x2" => &[1i64, 0, 1, 0],
        ).unwrap();

        let sample = Sample::from_dataframe(&data, "y").unwrap();
        assert_eq!(sample.shape(), (4, 2));
        assert_eq!(sample.feature_names(), vec!["x1", "x2"]);
        assert_eq!(sample.target(), &[0.5, 1.5, 2.5, 3.5]);
        assert_eq!(sample["x2"].values(), &[1.0, 0.0, 1.0, 0.0]);

        let result = Sample::from_dataframe(&data, "z");
        assert!(matches!(result, Err(StackError::Polars(_))));
    }

    #[test]
    fn survival_sample_from_dataframe() {
        let data = survival_frame(&[2, 5, 1], &[1, 0, 2]);
        let survival = SurvivalSample::from_dataframe(&data, "ftime", "ftype")
            .unwrap();

        assert_eq!(survival.len(), 3);
        assert_eq!(survival.ftime(), &[2, 5, 1]);
        assert_eq!(survival.ftype(), &[1, 0, 2]);
        assert_eq!(survival.max_time(), 5);

        let covariates = survival.covariates();
        assert_eq!(covariates.feature_names(), vec!["age", "arm"]);
        assert_eq!(covariates["age"].values(), &[50.0, 61.5, 47.0]);
        assert_eq!(covariates["arm"].values(), &[0.0, 1.0, 1.0]);
    }

    #[test]
    fn invalid_survival_columns_are_rejected() {
        for (ftime, ftype) in [
            ([2, 0, 1], [1, 0, 1]),
            ([2, -3, 1], [1, 0, 1]),
            ([2, 3, 1], [1, -1, 1]),
        ] {
            let data = survival_frame(&ftime, &ftype);
            let result = SurvivalSample::from_dataframe(&data, "ftime", "ftype");
            assert!(
                matches!(result, Err(StackError::InvalidSurvivalData(_))),
                "ftime = {ftime:?}, ftype = {ftype:?}",
            );
        }

        let data = survival_frame(&[1, 2, 3], &[0, 1, 1]);
        let result = SurvivalSample::from_dataframe(&data, "time", "ftype");
        assert!(matches!(result, Err(StackError::Polars(_))));
    }
}
