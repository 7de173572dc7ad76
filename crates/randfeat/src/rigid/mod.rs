//! Batched rigid transforms (rotation then translation) acting on 3D point sets.
//!
//! Purpose
//! - Normalize raw rotation/translation arrays into one `RigidTransform` type
//!   before any embedding call.
//! - Apply `x ↦ R·x + t` over arbitrary trailing batch axes, contracting only
//!   the leading coordinate axis.
//!
//! Conventions
//! - Rotations `(3, 3, *batch)`, translations `(3, *batch)` or `(3, 1, *batch)`,
//!   points `(3, n, *batch)`. Batches broadcast right-aligned (see `crate::batch`).
//! - Rotation matrices are not checked for orthonormality; `apply` is a plain
//!   affine map and works for any 3×3 linear part.
//!
//! Code cross-refs: `batch::{broadcast_batch, expand_flat}`, `orientation`.

pub mod rand;
mod types;

pub use types::RigidTransform;
