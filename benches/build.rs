use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stitchann::{Point, VamanaBuilder, VamanaParams};

fn random_points(n: usize, dim: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let coords = (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect();
            Point::new(i as u32, coords)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("vamana_build");
    group.sample_size(10);
    for &n in &[500usize, 2_000] {
        let points = random_points(n, 16, 42);
        let params = VamanaParams {
            max_degree: 16,
            beam_width: 48,
            seed: Some(42),
            ..Default::default()
        };
        group.bench_function(format!("n{n}_d16"), |b| {
            b.iter(|| {
                let builder = VamanaBuilder::new(params.clone());
                black_box(builder.build(points.clone()).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let points = random_points(5_000, 16, 42);
    let params = VamanaParams {
        max_degree: 24,
        beam_width: 64,
        seed: Some(42),
        ..Default::default()
    };
    let graph = VamanaBuilder::new(params).build(points).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let queries: Vec<Vec<f32>> = (0..64)
        .map(|_| (0..16).map(|_| rng.random_range(-1.0..1.0)).collect())
        .collect();

    let mut group = c.benchmark_group("vamana_search");
    for &l in &[32usize, 64, 128] {
        group.bench_function(format!("k10_l{l}"), |b| {
            let mut i = 0;
            b.iter(|| {
                let q = &queries[i % queries.len()];
                i += 1;
                black_box(graph.search(q, 10, l, None).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
