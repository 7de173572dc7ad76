//! Fixed random feature embeddings.
//!
//! Two families of non-trainable embeddings live here:
//! - `orientation`: rigid transforms → distances between two random point
//!   clouds carried along by the transform (aligned, pairwise, graph modes).
//! - `fourier`: flat vectors → random Fourier / triangle-wave projections.
//!
//! Conventions
//! - Tensors are `ndarray::ArrayD<f64>` with leading component axes and
//!   trailing batch axes, e.g. rotations `(3, 3, *batch)`, points `(3, n, *batch)`.
//! - Batch axes broadcast right-aligned (equal, 1, or missing).
//! - All operations are pure and return freshly allocated tensors.

pub mod batch;
pub mod cfg;
pub mod error;
pub mod fourier;
pub mod orientation;
pub mod rigid;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dynamic-rank real tensor used throughout the crate.
pub type Tensor = ndarray::ArrayD<f64>;

pub use cfg::{FeatureCfg, DEFAULT_PAIR_AXIS};
pub use error::EmbedError;
pub use orientation::{Edge, EdgeGather, Graph, RandomOrientationFeatures};
pub use rigid::RigidTransform;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::{FeatureCfg, DEFAULT_PAIR_AXIS};
    pub use crate::error::EmbedError;
    pub use crate::fourier::{RandomFourierFeatures, RandomTriangleFeatures};
    pub use crate::orientation::{Edge, EdgeGather, Graph, RandomOrientationFeatures};
    pub use crate::rigid::rand::{draw_rigid, draw_rigid_replay, ReplayToken, RigidSampleCfg};
    pub use crate::rigid::RigidTransform;
    pub use crate::Tensor;
}
