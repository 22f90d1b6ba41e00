//! Benchmarks for the classification pipeline.
//!
//! Every iteration starts from an empty classifier so the memo cache does not
//! short-circuit the work.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ns_lattice::div::Div;
use ns_lattice::div_set::{m1_classes, m2_classes};
use ns_lattice::Classifier;

// ============================================================================
// Benchmark: class enumeration
// ============================================================================

fn bench_div_sets(c: &mut Criterion) {
    let mut group = c.benchmark_group("div_sets");
    for rank in [5usize, 7, 9] {
        group.bench_with_input(BenchmarkId::new("m1_classes", rank), &rank, |b, &rank| {
            b.iter(|| m1_classes(black_box(rank)))
        });
        group.bench_with_input(BenchmarkId::new("m2_classes", rank), &rank, |b, &rank| {
            b.iter(|| m2_classes(black_box(rank)))
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark: Dynkin typing
// ============================================================================

fn bench_dynkin_type(c: &mut Criterion) {
    let d_lst: Vec<Div> = ["12", "23", "34", "45", "56", "1123"]
        .iter()
        .filter_map(|l| Div::from_label(l, 7).ok())
        .collect();
    let mut classifier = Classifier::default();
    c.bench_function("dynkin_type_e6", |b| {
        b.iter(|| classifier.dynkin_type(black_box(&d_lst)))
    });
}

// ============================================================================
// Benchmark: classification
// ============================================================================

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_cls");
    group.sample_size(10);
    for rank in [3usize, 4, 5] {
        group.bench_with_input(BenchmarkId::new("fast", rank), &rank, |b, &rank| {
            b.iter(|| Classifier::default().get_cls(black_box(rank)))
        });
        group.bench_with_input(BenchmarkId::new("provable", rank), &rank, |b, &rank| {
            b.iter(|| Classifier::default().get_cls_provable(black_box(rank)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_div_sets, bench_dynkin_type, bench_classification);
criterion_main!(benches);
