//! Property-based tests for the measurement-scale classifier.
//!
//! - any column whose name contains `id` is a nominal identifier, whatever
//!   its declared type;
//! - a dictionary lists exactly the schema's columns, in schema order;
//! - classification is a pure function of (name, type).

use aurelion_analytics::analyzers::{DataDictionary, MeasurementScale, ScaleClassifier};
use datafusion::arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use proptest::prelude::*;

fn data_type() -> impl Strategy<Value = DataType> {
    prop_oneof![
        Just(DataType::Utf8),
        Just(DataType::LargeUtf8),
        Just(DataType::Boolean),
        Just(DataType::Int32),
        Just(DataType::Int64),
        Just(DataType::UInt16),
        Just(DataType::Float32),
        Just(DataType::Float64),
        Just(DataType::Decimal128(12, 2)),
        Just(DataType::Date32),
        Just(DataType::Date64),
        Just(DataType::Timestamp(TimeUnit::Millisecond, None)),
        Just(DataType::Null),
    ]
}

fn affix() -> impl Strategy<Value = String> {
    "[a-z_]{0,8}"
}

proptest! {
    #[test]
    fn names_containing_id_are_identifiers(
        prefix in affix(),
        marker in prop_oneof![Just("id"), Just("ID"), Just("Id")],
        suffix in affix(),
        dt in data_type(),
    ) {
        let name = format!("{prefix}{marker}{suffix}");
        prop_assert_eq!(
            ScaleClassifier::classify(&name, &dt),
            MeasurementScale::NominalIdentifier
        );
    }

    #[test]
    fn dictionary_preserves_schema_order(
        names in prop::collection::btree_set("[a-z]{1,12}", 0..24),
        dt in data_type(),
    ) {
        // Shuffle away from sorted order deterministically.
        let mut names: Vec<String> = names.into_iter().collect();
        names.reverse();
        let schema = Schema::new(
            names
                .iter()
                .map(|n| Field::new(n, dt.clone(), true))
                .collect::<Vec<_>>(),
        );

        let dict = DataDictionary::from_schema("t", &schema);
        let columns: Vec<String> = dict.columns.iter().map(|c| c.column.clone()).collect();
        prop_assert_eq!(columns, names);
    }

    #[test]
    fn classification_is_deterministic(name in "[A-Za-z_]{0,16}", dt in data_type()) {
        prop_assert_eq!(
            ScaleClassifier::classify(&name, &dt),
            ScaleClassifier::classify(&name, &dt)
        );
    }

    #[test]
    fn non_numeric_types_are_never_measured(name in "[a-z_]{0,16}") {
        let scale = ScaleClassifier::classify(&name, &DataType::Utf8);
        prop_assert!(scale != MeasurementScale::Ratio && scale != MeasurementScale::IntervalRatio);
    }
}
