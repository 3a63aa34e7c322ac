//! Benchmarks for map accumulation and averaging.
//!
//! Run with: cargo bench --package grid-processor --bench accumulate_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grid_processor::MapAccumulator;
use rand::Rng;

/// Generate a random batch of specular points away from the grid seams.
fn generate_batch(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut rng = rand::thread_rng();
    let mut lats = Vec::with_capacity(n);
    let mut lons = Vec::with_capacity(n);
    let mut vals = Vec::with_capacity(n);
    for _ in 0..n {
        lats.push(rng.gen_range(-80.0..80.0));
        lons.push(rng.gen_range(-175.0..175.0));
        // ~5% missing, like DDM SNR fields
        if rng.gen_bool(0.05) {
            vals.push(f64::NAN);
        } else {
            vals.push(rng.gen_range(-5.0..15.0));
        }
    }
    (lats, lons, vals)
}

fn bench_accumulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulate");

    for size in [1_000, 10_000, 100_000] {
        let (lats, lons, vals) = generate_batch(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut acc = MapAccumulator::with_cell_size(100.0).unwrap();
            b.iter(|| {
                acc.accumulate(black_box(&lats), black_box(&lons), black_box(&vals))
                    .unwrap();
            });
        });
    }

    group.finish();
}

fn bench_average(c: &mut Criterion) {
    let mut group = c.benchmark_group("average");

    for cell_size in [200.0, 50.0, 25.0] {
        let mut acc = MapAccumulator::with_cell_size(cell_size).unwrap();
        let (lats, lons, vals) = generate_batch(50_000);
        acc.accumulate(&lats, &lons, &vals).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}km", cell_size)),
            &acc,
            |b, acc| b.iter(|| black_box(acc.average())),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_accumulate, bench_average);
criterion_main!(benches);
