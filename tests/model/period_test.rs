// tests/model/period_test.rs
#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use vantage::error::ComparisonError;
    use vantage::model::{mapping, Field, Period, PeriodUnit};

    fn all_periods() -> Vec<Period> {
        vec![
            Period::year("y"),
            Period::semester("s", "y"),
            Period::quarter("q", "y"),
            Period::month("m", "y"),
        ]
    }

    #[test]
    fn test_mapping_is_a_bijection() {
        for period in all_periods() {
            let map = mapping(&period);
            let units: HashSet<PeriodUnit> = map.values().copied().collect();

            assert_eq!(map.len(), period.units().len(), "{}", period);
            assert_eq!(units.len(), map.len(), "{} maps two fields to one unit", period);
            assert!(units.contains(&PeriodUnit::Year));
            for unit in period.units() {
                assert!(units.contains(unit));
            }
        }
    }

    #[test]
    fn test_quarter_mapping() {
        let map = mapping(&Period::quarter("quarter_sales", "year_sales"));
        assert_eq!(map[&Field::new("quarter_sales")], PeriodUnit::Quarter);
        assert_eq!(map[&Field::new("year_sales")], PeriodUnit::Year);
    }

    #[test]
    fn test_units_are_coarsest_first() {
        assert_eq!(Period::year("y").units(), &[PeriodUnit::Year]);
        assert_eq!(
            Period::month("m", "y").units(),
            &[PeriodUnit::Year, PeriodUnit::Month]
        );
        assert_eq!(
            Period::semester("s", "y").units(),
            &[PeriodUnit::Year, PeriodUnit::Semester]
        );
    }

    #[test]
    fn test_deserialize_period() {
        let period: Period =
            serde_json::from_str(r#"{"kind": "quarter", "quarter": "q", "year": "y"}"#).unwrap();
        assert_eq!(period, Period::quarter("q", "y"));

        let period: Period = serde_json::from_str(r#"{"kind": "Year", "year": "y"}"#).unwrap();
        assert_eq!(period, Period::year("y"));
    }

    #[test]
    fn test_serialize_round_trips_through_definition() {
        let period = Period::semester("s", "y");
        let json = serde_json::to_value(&period).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "semester", "semester": "s", "year": "y"})
        );
        let back: Period = serde_json::from_value(json).unwrap();
        assert_eq!(back, period);
    }

    #[test]
    fn test_unsupported_period_kind() {
        let result = serde_json::from_str::<Period>(r#"{"kind": "week", "year": "y"}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unsupported period: week"), "{}", err);
    }

    #[test]
    fn test_unsupported_period_via_try_from() {
        let def = vantage::model::PeriodDefinition {
            kind: "day".to_string(),
            year: Some(Field::new("y")),
            ..Default::default()
        };
        assert_eq!(
            Period::try_from(def),
            Err(ComparisonError::UnsupportedPeriod("day".to_string()))
        );
    }

    #[test]
    fn test_period_missing_field() {
        let result = serde_json::from_str::<Period>(r#"{"kind": "month", "year": "y"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Period::quarter("q", "y").to_string(), "Quarter(q, y)");
        assert_eq!(PeriodUnit::Semester.to_string(), "SEMESTER");
    }

    #[test]
    fn test_one_field_for_two_units_is_rejected() {
        let result = serde_json::from_str::<Period>(r#"{"kind":"quarter","quarter":"x","year":"x"}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unsupported period"), "{}", err);

        for period in [
            Period::semester("x", "x"),
            Period::quarter("x", "x"),
            Period::month("x", "x"),
        ] {
            assert!(matches!(
                period.validate(),
                Err(ComparisonError::UnsupportedPeriod(_))
            ));
        }
    }
}
