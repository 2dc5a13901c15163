use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::distr::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use single_recipes::{Column, DataFrame, Pattern, Selector, StepKpca, VarInfo};
use std::time::Duration;

#[derive(Clone)]
pub struct KpcaBenchConfig {
    seed: u64,
    row_counts: Vec<usize>,
    n_features: usize,
    num_comp: usize,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for KpcaBenchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            row_counts: vec![100, 250, 500, 1000],
            n_features: 10,
            num_comp: 5,
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

fn create_test_frame(rows: usize, cols: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let value_dist = Uniform::try_from(0.0..1.0).unwrap();
    let columns = (0..cols)
        .map(|j| {
            let values: Vec<f64> = (0..rows).map(|_| value_dist.sample(&mut rng)).collect();
            Column::double(format!("x{}", j + 1), values)
        })
        .collect();
    DataFrame::new(columns).unwrap()
}

fn bench_fit(c: &mut Criterion, config: &KpcaBenchConfig) {
    let mut group = c.benchmark_group("kpca_fit");
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);

    let step = StepKpca::builder(Selector::from(Pattern::AllNumeric))
        .num_comp(config.num_comp)
        .build()
        .unwrap();

    for &rows in &config.row_counts {
        let df = create_test_frame(rows, config.n_features, config.seed);
        let info = VarInfo::from_frame(&df, &[]);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &df, |b, df| {
            b.iter(|| step.fit(df, &info).unwrap())
        });
    }
    group.finish();
}

fn bench_apply(c: &mut Criterion, config: &KpcaBenchConfig) {
    let mut group = c.benchmark_group("kpca_apply");
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);

    for &rows in &config.row_counts {
        let df = create_test_frame(rows, config.n_features, config.seed);
        let fitted = StepKpca::builder(Selector::from(Pattern::AllNumeric))
            .num_comp(config.num_comp)
            .build()
            .unwrap()
            .fit(&df, &VarInfo::from_frame(&df, &[]))
            .unwrap();
        let new_data = create_test_frame(rows, config.n_features, config.seed + 1);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &new_data, |b, data| {
            b.iter(|| fitted.apply(data).unwrap())
        });
    }
    group.finish();
}

fn kpca_benchmarks(c: &mut Criterion) {
    let config = KpcaBenchConfig::default();
    bench_fit(c, &config);
    bench_apply(c, &config);
}

criterion_group!(benches, kpca_benchmarks);
criterion_main!(benches);
