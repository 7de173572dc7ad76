//! Criterion benches for the three orientation embedding modes.
//! Focus sizes: n in {8, 32, 128} transforms, dim = 64.
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use randfeat::orientation::{Graph, RandomOrientationFeatures};
use randfeat::rigid::rand::{draw_rigid, RigidSampleCfg};

fn bench_embed(c: &mut Criterion) {
    let mut group = c.benchmark_group("orientation");
    let mut rng = StdRng::seed_from_u64(42);
    let feats = RandomOrientationFeatures::with_rng(64, 1.0, &mut rng).unwrap();
    for &n in &[8usize, 32, 128] {
        let t = draw_rigid(RigidSampleCfg::default(), &[n], &mut rng).unwrap();
        group.bench_with_input(BenchmarkId::new("aligned", n), &n, |b, _| {
            b.iter(|| feats.embed_single(&t).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("pairwise", n), &n, |b, _| {
            b.iter(|| feats.embed_pairwise_single(&t, 1).unwrap())
        });
        // ~10% edge density, the typical sparse-neighbourhood case.
        let adj = Array2::from_shape_simple_fn((n, n), || rng.gen_bool(0.1));
        let g = Graph::from_adjacency(adj.view()).unwrap();
        group.bench_with_input(BenchmarkId::new("graph_sparse", n), &n, |b, _| {
            b.iter(|| feats.embed_graph_single(&t, &g).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_embed);
criterion_main!(benches);
