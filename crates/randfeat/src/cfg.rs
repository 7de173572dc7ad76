//! Defaults and validated construction parameters.
//!
//! Policy
//! - Fixed constants stay constants; only parameters that callers genuinely
//!   vary (feature width, scale) go into a small `Copy` config.

use crate::error::EmbedError;

/// Output axis paired by `embed_pairwise` when the caller has no preference.
///
/// Axis 0 is the feature axis, so 1 is the first batch axis.
pub const DEFAULT_PAIR_AXIS: usize = 1;

/// Construction parameters for `RandomOrientationFeatures`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureCfg {
    /// Number of random points per cloud (embedding width).
    pub dim: usize,
    /// Standard deviation of the Gaussian point coordinates.
    pub sigma: f64,
}

impl Default for FeatureCfg {
    fn default() -> Self {
        Self {
            dim: 64,
            sigma: 1.0,
        }
    }
}

impl FeatureCfg {
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.dim == 0 {
            return Err(EmbedError::invalid("dim must be > 0"));
        }
        validate_sigma(self.sigma)
    }
}

pub(crate) fn validate_sigma(sigma: f64) -> Result<(), EmbedError> {
    if !sigma.is_finite() {
        return Err(EmbedError::invalid("sigma must be finite"));
    }
    if sigma <= 0.0 {
        return Err(EmbedError::invalid("sigma must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cfg_is_valid() {
        assert!(FeatureCfg::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_sigma_and_dim() {
        for sigma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = FeatureCfg { dim: 4, sigma };
            assert!(matches!(
                cfg.validate(),
                Err(EmbedError::InvalidArgument { .. })
            ));
        }
        let cfg = FeatureCfg { dim: 0, sigma: 1.0 };
        assert!(matches!(
            cfg.validate(),
            Err(EmbedError::InvalidArgument { .. })
        ));
    }
}
