//! Random orientation features: rigid transforms → distance embeddings.
//!
//! Purpose
//! - Embed a rigid transform (or a relation between two) as per-feature
//!   distances between two fixed random point clouds `FA`, `FB` carried along
//!   by the transforms.
//!
//! Model
//! - `FA`, `FB ∈ R^{3×dim}` with i.i.d. `N(0, σ²)` entries, drawn once, FA first.
//! - Aligned: `dist[f, b] = ‖(T1·FA)[:, f, b] − (T2·FB)[:, f, b]‖₂`.
//! - Pairwise: same distance after inserting a singleton axis into each side so
//!   that one batch axis pairs all-against-all.
//! - Graph: same distance for the `(source, destination)` pairs a graph reports;
//!   the source side always uses `FA`, the destination side `FB`.
//!
//! The two clouds are independent draws, so `embed(T, T)` is generally not zero
//! and `embed(T1, T2) ≠ embed(T2, T1)`.
//!
//! All three modes share `batch::distance3`, which makes the graph mode on a
//! complete graph bit-identical to the reshaped pairwise result.

mod graph;

pub use graph::{Edge, EdgeGather, Graph};

use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::batch::{batch_of, broadcast_batch, distance3, expand_flat, unflatten, LEAD};
use crate::cfg::FeatureCfg;
use crate::error::EmbedError;
use crate::rigid::RigidTransform;

/// Fixed random point clouds and the embeddings built on them.
///
/// Immutable after construction; safe to share across threads.
#[derive(Clone, Debug)]
pub struct RandomOrientationFeatures {
    points_a: Array2<f64>,
    points_b: Array2<f64>,
    sigma: f64,
}

impl RandomOrientationFeatures {
    /// Draw `FA`, `FB` from the thread RNG.
    pub fn new(dim: usize, sigma: f64) -> Result<Self, EmbedError> {
        Self::with_rng(dim, sigma, &mut rand::thread_rng())
    }

    /// Draw `FA`, then `FB`, from `rng`.
    pub fn with_rng<R: Rng>(dim: usize, sigma: f64, rng: &mut R) -> Result<Self, EmbedError> {
        FeatureCfg { dim, sigma }.validate()?;
        let points_a = gaussian_points(dim, sigma, rng);
        let points_b = gaussian_points(dim, sigma, rng);
        tracing::debug!(dim, sigma, "drew random orientation point sets");
        Ok(Self {
            points_a,
            points_b,
            sigma,
        })
    }

    /// Reproducible construction from a config and seed.
    pub fn from_cfg(cfg: &FeatureCfg, seed: u64) -> Result<Self, EmbedError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::with_rng(cfg.dim, cfg.sigma, &mut rng)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.points_a.ncols()
    }

    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// `FA`, shape `(3, dim)`.
    #[inline]
    pub fn points_a(&self) -> ArrayView2<'_, f64> {
        self.points_a.view()
    }

    /// `FB`, shape `(3, dim)`.
    #[inline]
    pub fn points_b(&self) -> ArrayView2<'_, f64> {
        self.points_b.view()
    }

    /// Aligned embedding, shape `(dim, *broadcast(batch1, batch2))`.
    pub fn embed(
        &self,
        t1: &RigidTransform,
        t2: &RigidTransform,
    ) -> Result<ArrayD<f64>, EmbedError> {
        let (p1, p2) = self.transformed(t1, t2)?;
        pointwise_distances(p1.view(), p2.view())
    }

    /// `embed(t, t)`.
    pub fn embed_single(&self, t: &RigidTransform) -> Result<ArrayD<f64>, EmbedError> {
        self.embed(t, t)
    }

    /// All pairs along output axis `axis` (batch axis `axis - 1`).
    ///
    /// The lower-rank batch is first padded with trailing singleton axes so
    /// both batches are counted from the left. A singleton is then inserted at
    /// output position `axis + 1` on the `t1` side and at `axis` on the `t2`
    /// side; with batches `(.., n1, ..)` and `(.., n2, ..)` the result is
    /// `(dim, .., n1, n2, ..)` and the other batch axes broadcast.
    pub fn embed_pairwise(
        &self,
        t1: &RigidTransform,
        t2: &RigidTransform,
        axis: usize,
    ) -> Result<ArrayD<f64>, EmbedError> {
        let (r1, r2) = (t1.batch_shape().len(), t2.batch_shape().len());
        if axis == 0 || axis > r1 || axis > r2 {
            return Err(EmbedError::shape(format!(
                "pair axis {axis} outside 1..={} for batch ranks {r1} and {r2}",
                r1.min(r2)
            )));
        }
        let (p1, p2) = self.transformed(t1, t2)?;
        let rank = r1.max(r2);
        let (p1, p2) = (pad_batch(p1, rank), pad_batch(p2, rank));
        // Output axis k sits at point-tensor axis k + 1.
        let p1 = p1.insert_axis(Axis(axis + LEAD));
        let p2 = p2.insert_axis(Axis(axis + LEAD - 1));
        pointwise_distances(p1.view(), p2.view())
    }

    /// `embed_pairwise(t, t, axis)`.
    pub fn embed_pairwise_single(
        &self,
        t: &RigidTransform,
        axis: usize,
    ) -> Result<ArrayD<f64>, EmbedError> {
        self.embed_pairwise(t, t, axis)
    }

    /// Distances only for the graph's edges, shape `(dim, num_edges)`.
    ///
    /// `t1` and `t2` must each hold exactly one transform per node (batch `(n,)`).
    /// Column `e` is `‖(t2·FB)[:, f, dst] − (t1·FA)[:, f, src]‖₂` for edge `e`.
    pub fn embed_graph<G: EdgeGather>(
        &self,
        t1: &RigidTransform,
        t2: &RigidTransform,
        graph: &G,
    ) -> Result<Array2<f64>, EmbedError> {
        let n = graph.num_nodes();
        for t in [t1, t2] {
            match t.batch_shape() {
                [len] if *len == n => {}
                [len] => {
                    return Err(EmbedError::DimensionMismatch {
                        expected: n,
                        found: *len,
                    })
                }
                other => {
                    return Err(EmbedError::shape(format!(
                        "graph embedding needs batch ({n},), got {other:?}"
                    )))
                }
            }
        }
        let (p1, p2) = self.transformed(t1, t2)?;
        let p1 = expand_flat(p1.view(), &[n])?;
        let p2 = expand_flat(p2.view(), &[n])?;
        let src: Vec<ArrayView2<'_, f64>> = p1.axis_iter(Axis(2)).collect();
        let dst: Vec<ArrayView2<'_, f64>> = p2.axis_iter(Axis(2)).collect();
        let pairs = graph.gather(&src, &dst)?;
        let dim = self.dim();
        let mut out = Array2::zeros((dim, pairs.len()));
        for (e, (a, b)) in pairs.into_iter().enumerate() {
            for f in 0..dim {
                out[[f, e]] = distance3(column3(a, f), column3(b, f));
            }
        }
        tracing::trace!(nodes = n, edges = out.ncols(), "graph-restricted embedding");
        Ok(out)
    }

    /// `embed_graph(t, t, graph)`.
    pub fn embed_graph_single<G: EdgeGather>(
        &self,
        t: &RigidTransform,
        graph: &G,
    ) -> Result<Array2<f64>, EmbedError> {
        self.embed_graph(t, t, graph)
    }

    fn transformed(
        &self,
        t1: &RigidTransform,
        t2: &RigidTransform,
    ) -> Result<(ArrayD<f64>, ArrayD<f64>), EmbedError> {
        let p1 = t1.apply(self.points_a.view().into_dyn())?;
        let p2 = t2.apply(self.points_b.view().into_dyn())?;
        Ok((p1, p2))
    }
}

fn gaussian_points<R: Rng>(dim: usize, sigma: f64, rng: &mut R) -> Array2<f64> {
    Array2::from_shape_simple_fn((3, dim), || {
        let z: f64 = rng.sample(StandardNormal);
        sigma * z
    })
}

/// Append singleton axes until the batch part of `p` has rank `rank`.
fn pad_batch(mut p: ArrayD<f64>, rank: usize) -> ArrayD<f64> {
    while p.ndim() < rank + LEAD {
        let last = p.ndim();
        p = p.insert_axis(Axis(last));
    }
    p
}

#[inline]
fn column3(p: &ArrayView2<'_, f64>, f: usize) -> [f64; 3] {
    [p[[0, f]], p[[1, f]], p[[2, f]]]
}

/// `(3, m, *b1)` × `(3, m, *b2)` → `(m, *broadcast(b1, b2))`.
fn pointwise_distances(
    p1: ArrayViewD<'_, f64>,
    p2: ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, EmbedError> {
    let m = p1.shape()[1];
    let batch = broadcast_batch(batch_of(p1.shape()), batch_of(p2.shape()))?;
    let a = expand_flat(p1, &batch)?;
    let b = expand_flat(p2, &batch)?;
    let len = a.shape()[2];
    let mut out = Vec::with_capacity(m * len);
    for f in 0..m {
        for k in 0..len {
            out.push(distance3(
                [a[[0, f, k]], a[[1, f, k]], a[[2, f, k]]],
                [b[[0, f, k]], b[[1, f, k]], b[[2, f, k]]],
            ));
        }
    }
    unflatten(&[m], &batch, out)
}
