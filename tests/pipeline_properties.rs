//! Property-based tests for the pipeline invariants.

use proptest::prelude::*;

use data_dashboard::chart::{self, ChartKind, ChartRequest};
use data_dashboard::data::filter::{filter, FilterSpec};
use data_dashboard::data::format::DataFormat;
use data_dashboard::data::loader::load;
use data_dashboard::data::stats::describe;
use data_dashboard::export::export;
use data_dashboard::{CellValue, Column, Table};

/// Text cells that never parse as numbers.
fn word_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None::<String>),
        4 => "w[a-zA-Z ,\"]{0,8}".prop_map(Some),
    ]
}

fn number_strategy() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None::<f64>),
        4 => (-1000i32..1000, 0u8..3).prop_map(|(n, scale)| Some(n as f64 / 10f64.powi(scale as i32))),
    ]
}

/// Tables with one text column and one numeric column, each holding at
/// least one value.
fn table_strategy() -> impl Strategy<Value = Table> {
    (1usize..30)
        .prop_flat_map(|rows| {
            (
                prop::collection::vec(word_strategy(), rows),
                prop::collection::vec(number_strategy(), rows),
            )
        })
        .prop_filter("columns need a value", |(words, numbers)| {
            words.iter().any(Option::is_some) && numbers.iter().any(Option::is_some)
        })
        .prop_map(|(words, numbers)| {
            Table::new(vec![
                Column::text("label", words),
                Column::numeric("amount", numbers),
            ])
            .unwrap()
        })
}

proptest! {
    #[test]
    fn csv_export_round_trips(table in table_strategy()) {
        let buffer = export(&table, DataFormat::Csv).unwrap();
        let back = load(buffer.bytes(), DataFormat::Csv).unwrap();
        prop_assert_eq!(back, table);
    }

    #[test]
    fn filter_only_keeps_matching_rows(table in table_strategy(), pick in 0usize..30) {
        let values = table.unique_values("label").unwrap();
        let target = values[pick % values.len()].clone();
        let out = filter(&table, &FilterSpec::new("label", target.clone())).unwrap();
        prop_assert!(out.num_rows() <= table.num_rows());
        prop_assert!(out.num_rows() > 0);
        prop_assert!(out.column("label").unwrap().values().iter().all(|v| *v == target));
        prop_assert_eq!(out.column_names(), table.column_names());
    }

    #[test]
    fn absent_value_gives_empty_table(table in table_strategy()) {
        let out = filter(&table, &FilterSpec::new("amount", 1.0e9)).unwrap();
        prop_assert_eq!(out.num_rows(), 0);
        prop_assert_eq!(out.column_names(), table.column_names());
    }

    #[test]
    fn describe_orders_min_mean_max(table in table_strategy()) {
        let summary = describe(&table);
        let stats = summary["amount"].as_numeric().unwrap();
        prop_assert!(stats.count > 0);
        let (min, mean, max) = (stats.min.unwrap(), stats.mean.unwrap(), stats.max.unwrap());
        prop_assert!(min <= mean && mean <= max);
    }

    #[test]
    fn grouped_counts_cover_present_values(table in table_strategy()) {
        let present = table.column("amount").unwrap().values().iter().filter(|v| !v.is_missing()).count();
        for kind in [ChartKind::Bar, ChartKind::Pie] {
            let chart = chart::render(&table, &ChartRequest::new(kind, "amount")).unwrap();
            prop_assert_eq!(chart.total(), present);
        }
    }

    #[test]
    fn line_points_follow_row_order(table in table_strategy()) {
        let chart = chart::render(&table, &ChartRequest::new(ChartKind::Line, "amount")).unwrap();
        let data_dashboard::chart::ChartArtifact::Line { points, .. } = chart else {
            panic!("expected a line chart");
        };
        prop_assert!(points.windows(2).all(|w| w[0][0] < w[1][0]));
        for [x, y] in points {
            prop_assert_eq!(&table.column("amount").unwrap().values()[x as usize], &CellValue::Number(y));
        }
    }
}
