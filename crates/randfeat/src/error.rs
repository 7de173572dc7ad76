//! Error type shared by every embedding operation.

use std::fmt;

/// Contract violations raised synchronously by constructors and embeddings.
///
/// No operation returns a partial result: either the full tensor or one of these.
#[derive(Clone, Debug, PartialEq)]
pub enum EmbedError {
    /// Bad scalar parameter (dimension, standard deviation, node index).
    InvalidArgument { reason: String },
    /// Leading axes of the wrong size or batch shapes that do not broadcast.
    ShapeError { reason: String },
    /// Graph node count disagrees with the number of transforms.
    DimensionMismatch { expected: usize, found: usize },
}

impl EmbedError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        Self::ShapeError {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::ShapeError { reason } => write!(f, "shape error: {reason}"),
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected} nodes, found {found}")
            }
        }
    }
}

impl std::error::Error for EmbedError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind() {
        let e = EmbedError::invalid("sigma must be > 0");
        assert_eq!(e.to_string(), "invalid argument: sigma must be > 0");
        let e = EmbedError::DimensionMismatch {
            expected: 8,
            found: 7,
        };
        assert!(e.to_string().contains("expected 8"));
    }
}
