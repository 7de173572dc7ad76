//! `RigidTransform`: storage, normalization, application, composition.

use nalgebra::Isometry3;
use ndarray::{Array, Array2, ArrayD, ArrayViewD, Axis};

use crate::batch::{batch_of, broadcast_batch, expand_flat, unflatten, LEAD};
use crate::error::EmbedError;

/// Batched rigid transform `x ↦ R·x + t`.
///
/// Invariants:
/// - `rotation` has shape `(3, 3, *rbatch)`, `translation` has `(3, 1, *tbatch)`.
/// - `rbatch` and `tbatch` broadcast to `batch`.
#[derive(Clone, Debug)]
pub struct RigidTransform {
    rotation: ArrayD<f64>,
    translation: ArrayD<f64>,
    batch: Vec<usize>,
}

impl RigidTransform {
    /// Build from raw arrays.
    ///
    /// A translation whose axis 1 has length 1 and whose rank is at least the
    /// rotation's rank is read as `(3, 1, *batch)`; anything else as `(3, *batch)`.
    pub fn new(rotation: ArrayD<f64>, translation: ArrayD<f64>) -> Result<Self, EmbedError> {
        if rotation.ndim() < LEAD || rotation.shape()[0] != 3 || rotation.shape()[1] != 3 {
            return Err(EmbedError::shape(format!(
                "rotation must be (3, 3, *batch), got {:?}",
                rotation.shape()
            )));
        }
        if translation.ndim() < 1 || translation.shape()[0] != 3 {
            return Err(EmbedError::shape(format!(
                "translation must be (3, *batch) or (3, 1, *batch), got {:?}",
                translation.shape()
            )));
        }
        let column = translation.ndim() >= LEAD
            && translation.ndim() >= rotation.ndim()
            && translation.shape()[1] == 1;
        let translation = if column {
            translation
        } else {
            translation.insert_axis(Axis(1))
        };
        let batch = broadcast_batch(batch_of(rotation.shape()), batch_of(translation.shape()))?;
        Ok(Self {
            rotation,
            translation,
            batch,
        })
    }

    /// Unbatched identity.
    pub fn identity() -> Self {
        Self {
            rotation: Array2::eye(3).into_dyn(),
            translation: Array::zeros((3, 1)).into_dyn(),
            batch: Vec::new(),
        }
    }

    /// Pure rotation `x ↦ R·x` (zero translation).
    pub fn from_rotation(rotation: ArrayD<f64>) -> Result<Self, EmbedError> {
        Self::new(rotation, Array::zeros((3, 1)).into_dyn())
    }

    /// Pure translation `x ↦ x + t`; `t` is `(3, *batch)` or `(3, 1, *batch)`.
    pub fn from_translation(translation: ArrayD<f64>) -> Result<Self, EmbedError> {
        Self::new(Array2::eye(3).into_dyn(), translation)
    }

    /// One transform per isometry; batch shape `(n,)`.
    pub fn from_isometries(isos: &[Isometry3<f64>]) -> Self {
        let n = isos.len();
        let rots: Vec<_> = isos.iter().map(|iso| iso.rotation.to_rotation_matrix()).collect();
        let rotation = Array::from_shape_fn((3, 3, n), |(r, c, b)| rots[b].matrix()[(r, c)]);
        let translation =
            Array::from_shape_fn((3, 1, n), |(r, _, b)| isos[b].translation.vector[r]);
        Self {
            rotation: rotation.into_dyn(),
            translation: translation.into_dyn(),
            batch: vec![n],
        }
    }

    #[inline]
    pub fn rotation(&self) -> ArrayViewD<'_, f64> {
        self.rotation.view()
    }

    /// Translation in column form `(3, 1, *tbatch)`.
    #[inline]
    pub fn translation(&self) -> ArrayViewD<'_, f64> {
        self.translation.view()
    }

    /// Broadcast batch shape of rotation and translation.
    #[inline]
    pub fn batch_shape(&self) -> &[usize] {
        &self.batch
    }

    /// Number of transforms in the (broadcast) batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.batch.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply to points of shape `(3, n, *pbatch)`.
    ///
    /// Result shape `(3, n, *broadcast(batch, pbatch))`. Each coordinate is
    /// `((R₀·x₀ + R₁·x₁) + R₂·x₂) + t` in exactly that order.
    pub fn apply(&self, points: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>, EmbedError> {
        if points.ndim() < LEAD || points.shape()[0] != 3 {
            return Err(EmbedError::shape(format!(
                "points must be (3, n, *batch), got {:?}",
                points.shape()
            )));
        }
        let n = points.shape()[1];
        let batch = broadcast_batch(&self.batch, batch_of(points.shape()))?;
        let r = expand_flat(self.rotation.view(), &batch)?;
        let t = expand_flat(self.translation.view(), &batch)?;
        let x = expand_flat(points, &batch)?;
        let len = r.shape()[2];
        let mut out = vec![0.0; 3 * n * len];
        for row in 0..3 {
            for j in 0..n {
                for b in 0..len {
                    out[(row * n + j) * len + b] = r[[row, 0, b]] * x[[0, j, b]]
                        + r[[row, 1, b]] * x[[1, j, b]]
                        + r[[row, 2, b]] * x[[2, j, b]]
                        + t[[row, 0, b]];
                }
            }
        }
        unflatten(&[3, n], &batch, out)
    }

    /// `outer ∘ inner`: first `inner`, then `outer`.
    ///
    /// `R = R_o·R_i`, `t = R_o·t_i + t_o`; batches broadcast.
    pub fn compose(outer: &Self, inner: &Self) -> Result<Self, EmbedError> {
        let outer_linear = Self {
            rotation: outer.rotation.clone(),
            translation: Array::zeros((3, 1)).into_dyn(),
            batch: batch_of(outer.rotation.shape()).to_vec(),
        };
        let rotation = outer_linear.apply(inner.rotation.view())?;
        let translation = outer.apply(inner.translation.view())?;
        Self::new(rotation, translation)
    }

    /// Inverse transform `x ↦ Rᵀ·(x − t)`; exact only for orthonormal `R`.
    pub fn inverse(&self) -> Result<Self, EmbedError> {
        let mut rt = self.rotation.clone();
        rt.swap_axes(0, 1);
        let rt = rt.as_standard_layout().into_owned();
        let linear = Self::from_rotation(rt)?;
        let neg_t = self.translation.mapv(|v| -v);
        let translation = linear.apply(neg_t.view())?;
        Self::new(linear.rotation, translation)
    }
}
