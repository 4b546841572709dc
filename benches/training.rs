use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kolosal_house_prices::preprocessing::preprocess;
use kolosal_house_prices::training::{k_fold, Adam, LinearRegressor, TrainingConfig};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_regression_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 2.0 - 1.0);

    // Positive target: offset plus sum of features plus noise
    let y = Array1::from_iter(
        x.rows()
            .into_iter()
            .map(|row| 50.0 + row.sum() + rng.gen::<f64>() * 0.1),
    );
    (x, y)
}

fn create_tables(n_rows: usize) -> (DataFrame, DataFrame) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let zones = ["RL", "RM", "FV", "RH"];

    let make = |rng: &mut ChaCha8Rng, start: i64, rows: usize| {
        let ids: Vec<i64> = (start..start + rows as i64).collect();
        let area: Vec<Option<f64>> = (0..rows)
            .map(|_| if rng.gen_bool(0.05) { None } else { Some(rng.gen_range(1000.0..20000.0)) })
            .collect();
        let zone: Vec<Option<&str>> = (0..rows)
            .map(|_| if rng.gen_bool(0.05) { None } else { zones.choose(rng).copied() })
            .collect();
        (ids, area, zone)
    };

    let (ids, area, zone) = make(&mut rng, 1, n_rows);
    let price: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(50000.0..500000.0)).collect();
    let train = df!("Id" => ids, "LotArea" => area, "MSZoning" => zone, "SalePrice" => price).unwrap();

    let (ids, area, zone) = make(&mut rng, n_rows as i64 + 1, n_rows);
    let test = df!("Id" => ids, "LotArea" => area, "MSZoning" => zone).unwrap();
    (train, test)
}

fn bench_k_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("k_fold");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [500, 1460, 5000].iter() {
        let (x, y) = create_regression_data(*n_rows, 64);
        let config = TrainingConfig::new()
            .with_num_epochs(10)
            .with_learning_rate(0.1)
            .with_random_state(0);

        group.bench_with_input(BenchmarkId::new("k_fold", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| k_fold(5, black_box(x), black_box(y), &config).unwrap())
        });
    }

    group.finish();
}

fn bench_fit_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_step");

    for n_features in [32, 330, 1000].iter() {
        let (x, y) = create_regression_data(64, *n_features);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut model = LinearRegressor::new(*n_features, &mut rng).unwrap();
        let mut adam = Adam::new(0.1, 0.0);

        group.bench_with_input(BenchmarkId::new("batch_64", n_features), &(x, y), |b, (x, y)| {
            b.iter(|| model.fit_step(black_box(x), black_box(y), &mut adam).unwrap())
        });
    }

    group.finish();
}

fn bench_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocess");
    group.sample_size(10);

    for n_rows in [1460, 10000].iter() {
        let tables = create_tables(*n_rows);
        group.bench_with_input(BenchmarkId::new("preprocess", n_rows), &tables, |b, (train, test)| {
            b.iter(|| preprocess(black_box(train), black_box(test)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_k_fold, bench_fit_step, bench_preprocess);
criterion_main!(benches);
