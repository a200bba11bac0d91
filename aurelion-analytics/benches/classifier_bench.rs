//! Benchmarks for measurement-scale classification and dictionary building.

use aurelion_analytics::analyzers::{DataDictionary, ScaleClassifier};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use datafusion::arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use std::hint::black_box;

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let cases = [
        ("identifier", "id_cliente", DataType::Int64),
        ("categorical", "medio_pago", DataType::Utf8),
        ("temporal", "fecha", DataType::Date32),
        ("ratio", "precio_unitario", DataType::Float64),
        (
            "fallback",
            "observaciones_generales",
            DataType::Timestamp(TimeUnit::Nanosecond, None),
        ),
    ];

    for (label, name, data_type) in cases {
        group.bench_with_input(BenchmarkId::new("rule", label), &data_type, |b, dt| {
            b.iter(|| ScaleClassifier::classify(black_box(name), black_box(dt)))
        });
    }
    group.finish();
}

fn bench_dictionary(c: &mut Criterion) {
    let mut group = c.benchmark_group("dictionary");

    for width in [6, 64, 512] {
        let fields: Vec<Field> = (0..width)
            .map(|i| match i % 4 {
                0 => Field::new(format!("id_{i}"), DataType::Int64, false),
                1 => Field::new(format!("importe_{i}"), DataType::Float64, true),
                2 => Field::new(format!("fecha_{i}"), DataType::Date32, true),
                _ => Field::new(format!("nota_{i}"), DataType::Utf8, true),
            })
            .collect();
        let schema = Schema::new(fields);

        group.bench_with_input(BenchmarkId::new("from_schema", width), &schema, |b, s| {
            b.iter(|| DataDictionary::from_schema("bench", black_box(s)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_classify, bench_dictionary);
criterion_main!(benches);
