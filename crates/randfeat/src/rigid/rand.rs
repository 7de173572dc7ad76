//! Random rigid transforms for tests, benches, and the CLI.
//!
//! Model
//! - Rotations are uniform on SO(3): normalize a 4D standard Gaussian into a
//!   unit quaternion (rejecting near-zero draws) and take its matrix.
//! - Translations are i.i.d. `N(0, translation_std²)` per coordinate.
//! - Batch elements are drawn in row-major order of the batch shape, so a
//!   fixed RNG state always yields the same tensor.

use nalgebra::{Quaternion, UnitQuaternion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use super::RigidTransform;
use crate::batch::unflatten;
use crate::error::EmbedError;

/// Sampler configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidSampleCfg {
    /// Standard deviation of each translation coordinate; 0 gives pure rotations.
    pub translation_std: f64,
}

impl Default for RigidSampleCfg {
    fn default() -> Self {
        Self {
            translation_std: 1.0,
        }
    }
}

impl RigidSampleCfg {
    pub fn validate(&self) -> Result<(), EmbedError> {
        if !self.translation_std.is_finite() || self.translation_std < 0.0 {
            return Err(EmbedError::invalid(
                "translation_std must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// `(seed, index)` address of one reproducible draw.
///
/// Different indices under the same seed key independent ChaCha streams, so a
/// run can replay any single draw without replaying the ones before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    /// Deterministic RNG keyed by this token.
    pub fn rng(self) -> StdRng {
        let mut key = <StdRng as SeedableRng>::Seed::default();
        key[..8].copy_from_slice(&self.seed.to_le_bytes());
        key[8..16].copy_from_slice(&self.index.to_le_bytes());
        key[16..24].copy_from_slice(b"rigid-tf");
        StdRng::from_seed(key)
    }
}

/// Draw a batch of random rigid transforms with batch shape `batch`.
pub fn draw_rigid<R: Rng>(
    cfg: RigidSampleCfg,
    batch: &[usize],
    rng: &mut R,
) -> Result<RigidTransform, EmbedError> {
    cfg.validate()?;
    let len: usize = batch.iter().product();
    let mut rot = vec![0.0; 9 * len];
    let mut trans = vec![0.0; 3 * len];
    for b in 0..len {
        let m = sample_rotation(rng);
        for r in 0..3 {
            for c in 0..3 {
                rot[(r * 3 + c) * len + b] = m[(r, c)];
            }
        }
        for r in 0..3 {
            let z: f64 = rng.sample(StandardNormal);
            trans[r * len + b] = cfg.translation_std * z;
        }
    }
    let rotation = unflatten(&[3, 3], batch, rot)?;
    let translation = unflatten(&[3, 1], batch, trans)?;
    RigidTransform::new(rotation, translation)
}

/// Replayable variant of `draw_rigid`.
pub fn draw_rigid_replay(
    cfg: RigidSampleCfg,
    batch: &[usize],
    tok: ReplayToken,
) -> Result<RigidTransform, EmbedError> {
    let mut rng = tok.rng();
    draw_rigid(cfg, batch, &mut rng)
}

fn sample_rotation<R: Rng>(rng: &mut R) -> nalgebra::Matrix3<f64> {
    loop {
        let q = Quaternion::<f64>::new(
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
            rng.sample(StandardNormal),
        );
        if let Some(u) = UnitQuaternion::try_new(q, 1e-12) {
            return u.to_rotation_matrix().into_inner();
        }
    }
}
