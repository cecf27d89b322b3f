//! Benchmarks for genome decoding and generation steps.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cartesian_gp::{
    compute::{
        active_path, evaluate,
        evolution::{GenomeRng, OnePlusLambda},
    },
    schema::{Dataset, Geometry, RunConfig},
};

fn samples(count: usize) -> Vec<Vec<f64>> {
    vec![(0..count).map(|i| i as f64 * 0.1).collect()]
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for columns in [10, 50, 200] {
        let geometry = Geometry::new(1, columns);
        let mut rng = GenomeRng::new(0);
        let genome = rng
            .random_genome(geometry)
            .expect("valid geometry");
        let active = active_path(&genome).expect("well-formed genome");
        let inputs = samples(100);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{} columns", columns)),
            &columns,
            |b, _| {
                b.iter(|| evaluate(black_box(&genome), black_box(&active), black_box(&inputs)));
            },
        );
    }

    group.finish();
}

fn bench_active_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("active_path");

    for columns in [10, 50, 200] {
        let mut rng = GenomeRng::new(1);
        let genome = rng
            .random_genome(Geometry::new(2, columns))
            .expect("valid geometry");

        group.bench_with_input(BenchmarkId::from_parameter(columns), &columns, |b, _| {
            b.iter(|| active_path(black_box(&genome)));
        });
    }

    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_plus_lambda_generation");

    for population_size in [5, 20] {
        let inputs = samples(50);
        let dataset =
            Dataset::from_function(inputs, |x| x[0].powi(4) - x[0]).expect("valid dataset");
        let config = RunConfig {
            population_size,
            columns: 20,
            tolerance: 0.0,
            max_evaluations: u64::MAX,
            random_seed: Some(7),
            ..Default::default()
        };
        let mut engine = OnePlusLambda::new(&config, &dataset).expect("valid config");

        group.bench_with_input(
            BenchmarkId::from_parameter(population_size),
            &population_size,
            |b, _| {
                b.iter(|| engine.step_generation());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_active_path, bench_generation);
criterion_main!(benches);
