//! Pairwise vs graph-restricted timing probe.
//!
//! Draws `n` random rigid transforms, evaluates the dense pairwise embedding and
//! the complete-graph embedding, checks they agree bit for bit, and prints
//! timings. Useful as a quick sanity run outside the test suite.

use std::time::Instant;

use rand::{rngs::StdRng, SeedableRng};
use randfeat::prelude::*;

fn main() {
    let n = 64;
    let mut rng = StdRng::seed_from_u64(2024);
    let feats = RandomOrientationFeatures::with_rng(32, 0.5, &mut rng).expect("valid params");
    let t = draw_rigid(RigidSampleCfg::default(), &[n], &mut rng).expect("sample transforms");

    let dense_start = Instant::now();
    let dense = feats
        .embed_pairwise_single(&t, DEFAULT_PAIR_AXIS)
        .expect("pairwise embedding");
    let dense_ms = dense_start.elapsed().as_secs_f64() * 1e3;

    let graph = Graph::complete(n);
    let sparse_start = Instant::now();
    let sparse = feats.embed_graph_single(&t, &graph).expect("graph embedding");
    let sparse_ms = sparse_start.elapsed().as_secs_f64() * 1e3;

    let flat = dense
        .into_shape_with_order((feats.dim(), n * n))
        .expect("dense is (dim, n, n)");
    let identical = flat
        .iter()
        .zip(sparse.iter())
        .all(|(a, b)| a.to_bits() == b.to_bits());

    println!("dim={} n={n} edges={}", feats.dim(), graph.num_edges());
    println!("pairwise_time_ms={dense_ms:.3} graph_time_ms={sparse_ms:.3}");
    println!("bit_identical={identical}");
}
