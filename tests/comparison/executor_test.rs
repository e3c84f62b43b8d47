// tests/comparison/executor_test.rs
#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use vantage::comparison::{execute_all, PeriodComparisonExecutor};
    use vantage::error::ComparisonError;
    use vantage::model::{ComparisonMeasure, ComparisonMethod, Period};
    use vantage::table::{Cell, ColumnType, ColumnarTable, Header, RowTable, Table};

    fn quarterly_sales() -> RowTable {
        let headers = vec![
            Header::dimension("year", ColumnType::Int32),
            Header::dimension("quarter", ColumnType::Int32),
            Header::measure("sales", ColumnType::Float64),
        ];
        let rows = vec![
            vec![Cell::Int32(2023), Cell::Int32(3), Cell::Float64(8.0)],
            vec![Cell::Int32(2023), Cell::Int32(4), Cell::Float64(10.0)],
            vec![Cell::Int32(2024), Cell::Int32(1), Cell::Float64(12.0)],
            vec![Cell::Int32(2024), Cell::Int32(4), Cell::Float64(15.0)],
            vec![Cell::Total, Cell::Total, Cell::Float64(45.0)],
        ];
        RowTable::new(headers, rows).unwrap()
    }

    fn previous_quarter(method: ComparisonMethod) -> ComparisonMeasure {
        ComparisonMeasure::new(
            "sales_vs_prev_quarter",
            "sales",
            method,
            Period::quarter("quarter", "year"),
        )
        .with_reference("quarter", "-1")
    }

    fn same_quarter_last_year() -> ComparisonMeasure {
        ComparisonMeasure::new(
            "sales_yoy",
            "sales",
            ComparisonMethod::AbsoluteDifference,
            Period::quarter("quarter", "year"),
        )
        .with_reference("year", "-1")
    }

    #[test]
    fn test_previous_quarter_absolute_difference() {
        let table = quarterly_sales();
        let executor = PeriodComparisonExecutor::new(previous_quarter(
            ComparisonMethod::AbsoluteDifference,
        ));

        let values = executor.compare(&table).unwrap();
        assert_eq!(
            values,
            vec![
                Cell::Null,
                Cell::Float64(2.0),
                Cell::Float64(2.0),
                Cell::Null,
                Cell::Null,
            ]
        );
    }

    #[test]
    fn test_same_quarter_last_year() {
        let table = quarterly_sales();
        let values = PeriodComparisonExecutor::new(same_quarter_last_year())
            .compare(&table)
            .unwrap();
        assert_eq!(
            values,
            vec![
                Cell::Null,
                Cell::Null,
                Cell::Null,
                Cell::Float64(5.0),
                Cell::Null,
            ]
        );
    }

    #[test]
    fn test_relative_difference_and_divide() {
        let table = quarterly_sales();

        let relative = PeriodComparisonExecutor::new(previous_quarter(
            ComparisonMethod::RelativeDifference,
        ))
        .compare(&table)
        .unwrap();
        assert_eq!(relative[1], Cell::Float64(0.25));
        assert_eq!(relative[2], Cell::Float64(0.2));

        let ratio = PeriodComparisonExecutor::new(previous_quarter(ComparisonMethod::Divide))
            .compare(&table)
            .unwrap();
        assert_eq!(ratio[1], Cell::Float64(1.25));
        assert_eq!(ratio[2], Cell::Float64(1.2));
    }

    #[test]
    fn test_zero_reference_is_null() {
        let headers = vec![
            Header::dimension("year", ColumnType::Int64),
            Header::measure("sales", ColumnType::Int64),
        ];
        let rows = vec![
            vec![Cell::Int64(2023), Cell::Int64(0)],
            vec![Cell::Int64(2024), Cell::Int64(7)],
        ];
        let table = RowTable::new(headers, rows).unwrap();
        let measure = ComparisonMeasure::new(
            "growth",
            "sales",
            ComparisonMethod::RelativeDifference,
            Period::year("year"),
        )
        .with_reference("year", "-1");

        let values = PeriodComparisonExecutor::new(measure).compare(&table).unwrap();
        assert_eq!(values, vec![Cell::Null, Cell::Null]);
    }

    #[test]
    fn test_wide_year_column() {
        let headers = vec![
            Header::dimension("year", ColumnType::Int64),
            Header::measure("sales", ColumnType::Float64),
        ];
        let rows = vec![
            vec![Cell::Int64(2023), Cell::Float64(1.0)],
            vec![Cell::Int64(2024), Cell::Float64(3.0)],
        ];
        let table = RowTable::new(headers, rows).unwrap();
        let measure = ComparisonMeasure::new(
            "yoy",
            "sales",
            ComparisonMethod::AbsoluteDifference,
            Period::year("year"),
        )
        .with_reference("year", "-1");

        let values = PeriodComparisonExecutor::new(measure).compare(&table).unwrap();
        assert_eq!(values, vec![Cell::Null, Cell::Float64(2.0)]);
    }

    #[test]
    fn test_other_dimensions_are_part_of_the_key() {
        let headers = vec![
            Header::dimension("region", ColumnType::Text),
            Header::dimension("year", ColumnType::Int32),
            Header::measure("sales", ColumnType::Float64),
        ];
        let rows = vec![
            vec![Cell::from("EU"), Cell::Int32(2023), Cell::Float64(1.0)],
            vec![Cell::from("US"), Cell::Int32(2023), Cell::Float64(5.0)],
            vec![Cell::from("EU"), Cell::Int32(2024), Cell::Float64(3.0)],
            vec![Cell::from("US"), Cell::Int32(2024), Cell::Float64(6.0)],
            vec![Cell::Total, Cell::Int32(2024), Cell::Float64(9.0)],
        ];
        let table = RowTable::new(headers, rows).unwrap();
        let measure = ComparisonMeasure::new(
            "yoy",
            "sales",
            ComparisonMethod::AbsoluteDifference,
            Period::year("year"),
        )
        .with_reference("year", "-1");

        let values = PeriodComparisonExecutor::new(measure).compare(&table).unwrap();
        assert_eq!(
            values,
            vec![
                Cell::Null,
                Cell::Null,
                Cell::Float64(2.0),
                Cell::Float64(1.0),
                Cell::Null,
            ]
        );
    }

    #[test]
    fn test_other_measures_are_not_part_of_the_key() {
        let headers = vec![
            Header::dimension("year", ColumnType::Int32),
            Header::measure("sales", ColumnType::Float64),
            Header::measure("orders", ColumnType::Int64),
        ];
        let rows = vec![
            vec![Cell::Int32(2023), Cell::Float64(4.0), Cell::Int64(1)],
            vec![Cell::Int32(2024), Cell::Float64(6.0), Cell::Int64(2)],
        ];
        let table = RowTable::new(headers, rows).unwrap();
        let measure = ComparisonMeasure::new(
            "yoy",
            "sales",
            ComparisonMethod::AbsoluteDifference,
            Period::year("year"),
        )
        .with_reference("year", "-1");

        let values = PeriodComparisonExecutor::new(measure).compare(&table).unwrap();
        assert_eq!(values, vec![Cell::Null, Cell::Float64(2.0)]);
    }

    #[test]
    fn test_execute_appends_measure_column() {
        let mut table = quarterly_sales();
        let executor = PeriodComparisonExecutor::new(previous_quarter(
            ComparisonMethod::AbsoluteDifference,
        ));
        executor.execute(&mut table).unwrap();

        assert_eq!(table.column_count(), 4);
        let header = &table.headers()[3];
        assert_eq!(header.name, "sales_vs_prev_quarter");
        assert_eq!(header.column_type, ColumnType::Float64);
        assert!(header.is_measure);
        assert_eq!(table.cell(2, 3), &Cell::Float64(2.0));

        let again = executor.execute(&mut table);
        assert!(matches!(again, Err(ComparisonError::Table(_))));
    }

    #[test]
    fn test_unknown_measure_column() {
        let table = quarterly_sales();
        let measure = ComparisonMeasure::new(
            "x",
            "revenue",
            ComparisonMethod::Divide,
            Period::year("year"),
        );
        let result = PeriodComparisonExecutor::new(measure).compare(&table);
        assert_eq!(
            result,
            Err(ComparisonError::UnknownColumn("revenue".to_string()))
        );
    }

    #[test]
    fn test_non_numeric_measure_column() {
        let headers = vec![
            Header::dimension("year", ColumnType::Int32),
            Header::measure("label", ColumnType::Text),
        ];
        let table = RowTable::new(headers, vec![vec![Cell::Int32(2023), Cell::from("a")]]).unwrap();
        let measure = ComparisonMeasure::new(
            "x",
            "label",
            ComparisonMethod::AbsoluteDifference,
            Period::year("year"),
        );
        let result = PeriodComparisonExecutor::new(measure).compare(&table);
        assert_eq!(
            result,
            Err(ComparisonError::NonNumericMeasure {
                column: "label".to_string(),
                column_type: ColumnType::Text,
            })
        );
    }

    #[test]
    fn test_configuration_errors_come_before_row_work() {
        let mut table = quarterly_sales();
        let measure = ComparisonMeasure::new(
            "x",
            "sales",
            ComparisonMethod::AbsoluteDifference,
            Period::quarter("quarter", "year"),
        )
        .with_reference("month", "-1");

        let result = PeriodComparisonExecutor::new(measure).execute(&mut table);
        assert!(matches!(
            result,
            Err(ComparisonError::UnknownFieldForPeriod { .. })
        ));
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let headers = vec![
            Header::dimension("year", ColumnType::Int64),
            Header::dimension("month", ColumnType::Int32),
            Header::measure("sales", ColumnType::Float64),
        ];
        let mut rows = Vec::new();
        for year in 2000..2010i64 {
            for month in 1..=12 {
                rows.push(vec![
                    Cell::Int64(year),
                    Cell::Int32(month),
                    Cell::Float64((year * 12 + i64::from(month)) as f64),
                ]);
            }
        }
        let table = RowTable::new(headers, rows).unwrap();
        let measure = ComparisonMeasure::new(
            "mom",
            "sales",
            ComparisonMethod::AbsoluteDifference,
            Period::month("month", "year"),
        )
        .with_reference("month", "-1");

        let sequential = PeriodComparisonExecutor::new(measure.clone())
            .with_parallel_threshold(usize::MAX)
            .compare(&table)
            .unwrap();
        let parallel = PeriodComparisonExecutor::new(measure)
            .with_parallel_threshold(1)
            .compare(&table)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential[0], Cell::Null);
        assert!(sequential[1..].iter().all(|c| *c == Cell::Float64(1.0)));
    }

    #[test]
    fn test_columnar_table() {
        let rows = quarterly_sales();
        let mut table = ColumnarTable::from_rows(&rows, &HashSet::new());
        PeriodComparisonExecutor::new(previous_quarter(ComparisonMethod::AbsoluteDifference))
            .execute(&mut table)
            .unwrap();

        assert_eq!(table.column(3)[1], Cell::Float64(2.0));
        assert_eq!(table.column(3)[4], Cell::Null);
    }

    #[test]
    fn test_execute_all_runs_in_order() {
        let mut table = quarterly_sales();
        let measures = vec![
            previous_quarter(ComparisonMethod::AbsoluteDifference),
            same_quarter_last_year(),
        ];
        execute_all(&mut table, &measures, 10_000).unwrap();

        let names: Vec<&str> = table.headers().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["year", "quarter", "sales", "sales_vs_prev_quarter", "sales_yoy"]
        );
        assert_eq!(table.cell(3, 4), &Cell::Float64(5.0));
    }
}
