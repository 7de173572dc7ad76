//! Directed graphs consumed by the graph-restricted embedding.
//!
//! The embedding only needs the node count and a stable edge order; `EdgeGather`
//! captures exactly that and provides the gather primitive on top of it.

use ndarray::ArrayView2;

use crate::error::EmbedError;

/// Ordered node pair `src → dst`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub src: usize,
    pub dst: usize,
}

/// Read-only view of a directed graph over `num_nodes()` nodes.
///
/// Invariants:
/// - Every edge endpoint is `< num_nodes()`.
/// - `edges()` returns the same order on every call; that order becomes the
///   trailing axis of graph-restricted embeddings.
pub trait EdgeGather {
    fn num_nodes(&self) -> usize;

    fn edges(&self) -> &[Edge];

    #[inline]
    fn num_edges(&self) -> usize {
        self.edges().len()
    }

    /// Per-edge `(source value, destination value)` pairs from per-node tables.
    fn gather<'t, T>(&self, src: &'t [T], dst: &'t [T]) -> Result<Vec<(&'t T, &'t T)>, EmbedError> {
        let n = self.num_nodes();
        for table in [src.len(), dst.len()] {
            if table != n {
                return Err(EmbedError::DimensionMismatch {
                    expected: n,
                    found: table,
                });
            }
        }
        Ok(self
            .edges()
            .iter()
            .map(|e| (&src[e.src], &dst[e.dst]))
            .collect())
    }
}

/// Edge-list graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    n: usize,
    edges: Vec<Edge>,
}

impl Graph {
    /// Graph from an explicit edge list, kept in the given order.
    pub fn from_edges(n: usize, edges: Vec<Edge>) -> Result<Self, EmbedError> {
        if let Some(e) = edges.iter().find(|e| e.src >= n || e.dst >= n) {
            return Err(EmbedError::invalid(format!(
                "edge {} -> {} out of range for {n} nodes",
                e.src, e.dst
            )));
        }
        Ok(Self { n, edges })
    }

    /// All `n²` ordered pairs including self-loops, source-major.
    pub fn complete(n: usize) -> Self {
        let edges = (0..n)
            .flat_map(|src| (0..n).map(move |dst| Edge { src, dst }))
            .collect();
        Self { n, edges }
    }

    /// Edges at the `true` entries of a square boolean adjacency, row-major
    /// (row = source, column = destination).
    pub fn from_adjacency(adj: ArrayView2<'_, bool>) -> Result<Self, EmbedError> {
        let (rows, cols) = adj.dim();
        if rows != cols {
            return Err(EmbedError::shape(format!(
                "adjacency must be square, got {rows}x{cols}"
            )));
        }
        let edges = adj
            .indexed_iter()
            .filter(|(_, &on)| on)
            .map(|((src, dst), _)| Edge { src, dst })
            .collect();
        Ok(Self { n: rows, edges })
    }
}

impl EdgeGather for Graph {
    #[inline]
    fn num_nodes(&self) -> usize {
        self.n
    }

    #[inline]
    fn edges(&self) -> &[Edge] {
        &self.edges
    }
}
