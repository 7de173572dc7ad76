//! Batch-shape bookkeeping: broadcasting and explicit expansion.
//!
//! Every tensor in the crate has two leading component axes (`(3, 3)` for
//! rotations, `(3, 1)` for translations, `(3, n)` for point sets) followed by
//! any number of batch axes. Batches broadcast right-aligned: a missing axis
//! or an axis of length 1 stretches to match the other side.
//!
//! Expansion is done explicitly here (insert singleton axes after the leading
//! pair, then broadcast and copy into a flat `(a, b, batch_len)` array) so the
//! kernels in `rigid` and `orientation` only ever see one flat batch axis.

use ndarray::{Array3, ArrayD, ArrayViewD, Axis, IxDyn};

use crate::error::EmbedError;

/// Number of leading component axes on every batched tensor.
pub(crate) const LEAD: usize = 2;

/// Right-aligned broadcast of two batch shapes.
pub fn broadcast_batch(a: &[usize], b: &[usize]) -> Result<Vec<usize>, EmbedError> {
    let rank = a.len().max(b.len());
    let mut out = Vec::with_capacity(rank);
    for k in 0..rank {
        let da = dim_from_right(a, rank, k);
        let db = dim_from_right(b, rank, k);
        let d = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => {
                return Err(EmbedError::shape(format!(
                    "batch shapes {a:?} and {b:?} do not broadcast"
                )))
            }
        };
        out.push(d);
    }
    Ok(out)
}

#[inline]
fn dim_from_right(shape: &[usize], rank: usize, k: usize) -> usize {
    let pad = rank - shape.len();
    if k < pad {
        1
    } else {
        shape[k - pad]
    }
}

/// Batch part of a tensor shape (everything after the leading pair).
#[inline]
pub(crate) fn batch_of(shape: &[usize]) -> &[usize] {
    &shape[LEAD.min(shape.len())..]
}

/// Expand `a` (shape `(p, q, *own)`) to `(p, q, *batch)` and flatten the batch.
///
/// `own` must broadcast to `batch` and may have lower rank; missing axes are
/// inserted directly after the leading pair.
pub(crate) fn expand_flat(
    a: ArrayViewD<'_, f64>,
    batch: &[usize],
) -> Result<Array3<f64>, EmbedError> {
    if a.ndim() < LEAD {
        return Err(EmbedError::shape(format!(
            "expected at least {LEAD} leading axes, got shape {:?}",
            a.shape()
        )));
    }
    let own = a.ndim() - LEAD;
    if own > batch.len() {
        return Err(EmbedError::shape(format!(
            "batch {:?} cannot expand to {batch:?}",
            batch_of(a.shape())
        )));
    }
    let (p, q) = (a.shape()[0], a.shape()[1]);
    let mut view = a;
    for _ in own..batch.len() {
        view = view.insert_axis(Axis(LEAD));
    }
    let mut target = vec![p, q];
    target.extend_from_slice(batch);
    let expanded = view.broadcast(target.as_slice()).ok_or_else(|| {
        EmbedError::shape(format!(
            "shape {:?} does not broadcast to {target:?}",
            view.shape()
        ))
    })?;
    let len: usize = batch.iter().product();
    let data: Vec<f64> = expanded.iter().copied().collect();
    Array3::from_shape_vec((p, q, len), data).map_err(|e| EmbedError::shape(e.to_string()))
}

/// Inverse of the flattening in `expand_flat`: `(p, q, len)` data → `(p, q, *batch)`.
pub(crate) fn unflatten(
    lead: &[usize],
    batch: &[usize],
    data: Vec<f64>,
) -> Result<ArrayD<f64>, EmbedError> {
    let mut shape = lead.to_vec();
    shape.extend_from_slice(batch);
    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|e| EmbedError::shape(e.to_string()))
}

/// Euclidean distance between two 3-vectors with a fixed summation order.
///
/// All embedding modes go through this kernel so that equal inputs give
/// bit-identical outputs regardless of mode.
#[inline]
pub(crate) fn distance3(a: [f64; 3], b: [f64; 3]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    (d0 * d0 + d1 * d1 + d2 * d2).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    #[test]
    fn broadcast_rules() {
        assert_eq!(broadcast_batch(&[4, 2], &[4, 2]).unwrap(), vec![4, 2]);
        assert_eq!(broadcast_batch(&[4, 1, 2], &[1, 3, 2]).unwrap(), vec![4, 3, 2]);
        assert_eq!(broadcast_batch(&[], &[5]).unwrap(), vec![5]);
        assert_eq!(broadcast_batch(&[2], &[3, 2]).unwrap(), vec![3, 2]);
        assert!(matches!(
            broadcast_batch(&[4], &[3]),
            Err(EmbedError::ShapeError { .. })
        ));
    }

    #[test]
    fn expand_inserts_missing_axes_after_lead() {
        // (3, 1, 2) expanded to batch (4, 2): the new axis lands before the existing one.
        let a = Array::from_shape_fn((3, 1, 2), |(r, _, b)| (10 * r + b) as f64).into_dyn();
        let flat = expand_flat(a.view(), &[4, 2]).unwrap();
        assert_eq!(flat.shape(), &[3, 1, 8]);
        for r in 0..3 {
            for i in 0..4 {
                for b in 0..2 {
                    assert_eq!(flat[[r, 0, i * 2 + b]], (10 * r + b) as f64);
                }
            }
        }
    }

    #[test]
    fn expand_rejects_incompatible_batch() {
        let a = Array::<f64, _>::zeros((3, 3, 5)).into_dyn();
        assert!(expand_flat(a.view(), &[4]).is_err());
        assert!(expand_flat(a.view(), &[]).is_err());
    }

    #[test]
    fn distance_is_symmetric_bitwise() {
        let a = [0.1, -2.5, 3.75];
        let b = [1.0 / 3.0, 0.2, -0.7];
        assert_eq!(distance3(a, b).to_bits(), distance3(b, a).to_bits());
        assert!((distance3([0.0; 3], [3.0, 4.0, 0.0]) - 5.0).abs() < 1e-15);
    }
}
