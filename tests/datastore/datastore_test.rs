// tests/datastore/datastore_test.rs
#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use vantage::comparison::PeriodComparisonExecutor;
    use vantage::datastore::{Datastore, SqliteDatastore};
    use vantage::model::{ComparisonMeasure, ComparisonMethod, Period};
    use vantage::table::{Cell, ColumnType, Table};

    fn sales_datastore() -> SqliteDatastore {
        let ds = SqliteDatastore::in_memory().unwrap();
        ds.execute_batch(
            "CREATE TABLE orders (year INT, quarter INTEGER, region TEXT, amount REAL, units BIGINT);
             INSERT INTO orders VALUES (2023, 4, 'EU', 10.0, 1);
             INSERT INTO orders VALUES (2024, 1, 'EU', 12.0, 2);
             INSERT INTO orders VALUES (2024, 1, 'US', 3.0, 1);",
        )
        .unwrap();
        ds
    }

    #[test]
    fn test_connections_share_the_in_memory_database() {
        let ds = sales_datastore();

        let first = ds.connection().unwrap();
        let second = ds.connection().unwrap();
        drop(first);

        let count: i64 = second
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_in_memory_datastores_are_isolated() {
        let _ds = sales_datastore();
        let other = SqliteDatastore::in_memory().unwrap();
        assert!(other.stores_by_name().unwrap().is_empty());
    }

    #[test]
    fn test_stores_by_name() {
        let ds = sales_datastore();
        let stores = ds.stores_by_name().unwrap();

        let orders = &stores["orders"];
        let types: Vec<(&str, ColumnType)> = orders
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.column_type))
            .collect();
        assert_eq!(
            types,
            vec![
                ("year", ColumnType::Int32),
                ("quarter", ColumnType::Int64),
                ("region", ColumnType::Text),
                ("amount", ColumnType::Float64),
                ("units", ColumnType::Int64),
            ]
        );
        assert!(orders.fields.iter().all(|f| f.store == "orders"));
    }

    #[test]
    fn test_stores_are_memoized_until_refresh() {
        let mut ds = sales_datastore();
        assert_eq!(ds.stores_by_name().unwrap().len(), 1);

        ds.execute_batch("CREATE TABLE returns (year INT, amount REAL)")
            .unwrap();
        assert_eq!(ds.stores_by_name().unwrap().len(), 1);

        ds.refresh_stores();
        assert_eq!(ds.stores_by_name().unwrap().len(), 2);
    }

    #[test]
    fn test_query_keeps_declared_types() {
        let ds = sales_datastore();
        let table = ds
            .query("SELECT year, quarter, region, amount FROM orders ORDER BY year, region")
            .unwrap();

        let types: Vec<ColumnType> = table.headers().iter().map(|h| h.column_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Int32,
                ColumnType::Int64,
                ColumnType::Text,
                ColumnType::Float64
            ]
        );
        assert!(table.headers().iter().all(|h| !h.is_measure));
        assert_eq!(
            table.row(0),
            vec![
                Cell::Int32(2023),
                Cell::Int64(4),
                Cell::from("EU"),
                Cell::Float64(10.0)
            ]
        );

        let stores = ds.stores_by_name().unwrap();
        let year = stores["orders"]
            .fields
            .iter()
            .find(|f| f.name == "year")
            .unwrap();
        assert_eq!(year.column_type, table.headers()[0].column_type);
    }

    #[test]
    fn test_query_infers_expression_types() {
        let ds = sales_datastore();
        let table = ds
            .query("SELECT year + 0 AS y, SUM(amount) AS total, 'x' || region AS label FROM orders GROUP BY 1, 3 ORDER BY 1, 3")
            .unwrap();

        let types: Vec<ColumnType> = table.headers().iter().map(|h| h.column_type).collect();
        assert_eq!(
            types,
            vec![ColumnType::Int64, ColumnType::Float64, ColumnType::Text]
        );
        assert_eq!(
            table.row(0),
            vec![Cell::Int64(2023), Cell::Float64(10.0), Cell::from("xEU")]
        );
    }

    #[test]
    fn test_query_rejects_values_outside_declared_type() {
        let ds = sales_datastore();
        ds.execute_batch("INSERT INTO orders VALUES (5000000000, 1, 'EU', 1.0, 1)")
            .unwrap();
        assert!(ds.query("SELECT year FROM orders").is_err());
    }

    #[test]
    fn test_query_total_marker() {
        let ds = sales_datastore();
        let table = ds
            .query(
                "SELECT * FROM (SELECT year, SUM(amount) AS amount FROM orders GROUP BY year ORDER BY year)
                 UNION ALL
                 SELECT '___total___', SUM(amount) FROM orders",
            )
            .unwrap();

        assert!(table.headers()[0].column_type.is_numeric());
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(2, 0), &Cell::Total);
        assert_eq!(table.cell(2, 1), &Cell::Float64(25.0));
    }

    #[test]
    fn test_query_then_compare() {
        let ds = sales_datastore().with_total_marker("ALL");
        let mut table = ds
            .query(
                "SELECT year, quarter, SUM(amount) AS sales FROM orders GROUP BY year, quarter
                 UNION ALL
                 SELECT 'ALL', 'ALL', SUM(amount) FROM orders",
            )
            .unwrap();
        let measures: HashSet<String> = ["sales".to_string()].into_iter().collect();
        table.mark_measures(&measures);

        let measure = ComparisonMeasure::new(
            "sales_vs_prev_quarter",
            "sales",
            ComparisonMethod::AbsoluteDifference,
            Period::quarter("quarter", "year"),
        )
        .with_reference("quarter", "-1");
        PeriodComparisonExecutor::new(measure)
            .execute(&mut table)
            .unwrap();

        assert_eq!(table.row_count(), 3);
        for row in 0..table.row_count() {
            let expected = match table.cell(row, 0).as_i64() {
                Some(2024) => Cell::Float64(5.0),
                _ => Cell::Null,
            };
            assert_eq!(table.cell(row, 3), &expected);
        }
    }
}
