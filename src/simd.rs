//! Batch reductions over contiguous `f64` buffers.
//! Relying on auto-vectorization by LLVM.

use crate::data_types::Extent;

/// Min and max of a slice, NaN skipped. Empty or all-NaN input gives
/// [`Extent::EMPTY`].
pub fn extent_f64(data: &[f64]) -> Extent {
    let chunks = data.chunks_exact(8);
    let rem = chunks.remainder();

    let mut min_val = f64::INFINITY;
    let mut max_val = f64::NEG_INFINITY;

    // f64::min/max ignore a NaN operand, which is what lets this skip gaps.
    for c in chunks {
        let lo = c[0].min(c[1]).min(c[2]).min(c[3]).min(c[4]).min(c[5]).min(c[6]).min(c[7]);
        let hi = c[0].max(c[1]).max(c[2]).max(c[3]).max(c[4]).max(c[5]).max(c[6]).max(c[7]);
        min_val = min_val.min(lo);
        max_val = max_val.max(hi);
    }

    for &val in rem {
        min_val = min_val.min(val);
        max_val = max_val.max(val);
    }
    Extent::new(min_val, max_val)
}

/// Sums values in a slice, NaN skipped.
pub fn sum_f64(data: &[f64]) -> f64 {
    #[inline(always)]
    fn z(v: f64) -> f64 {
        if v.is_nan() {
            0.0
        } else {
            v
        }
    }

    let chunks = data.chunks_exact(8);
    let rem = chunks.remainder();
    let mut total = 0.0;

    for c in chunks {
        total += z(c[0]) + z(c[1]) + z(c[2]) + z(c[3]) + z(c[4]) + z(c[5]) + z(c[6]) + z(c[7]);
    }

    for &val in rem {
        total += z(val);
    }
    total
}

/// Counts non-NaN values.
pub fn count_present(data: &[f64]) -> usize {
    data.iter().filter(|v| !v.is_nan()).count()
}

/// Index of the point `(x0 + i, y[i])` forming the largest triangle with `a`
/// and `c`, NaN skipped. Returns `None` when every value is NaN.
pub fn find_max_area_index(y: &[f64], x0: f64, a: (f64, f64), c: (f64, f64)) -> Option<usize> {
    let (ax, ay) = a;
    let (cx, cy) = c;
    let mut max_area = -1.0;
    let mut best = None;

    for (i, &by) in y.iter().enumerate() {
        if by.is_nan() {
            continue;
        }
        let bx = x0 + i as f64;
        let area = ((ax - cx) * (by - ay) - (ax - bx) * (cy - ay)).abs();
        if area > max_area {
            max_area = area;
            best = Some(i);
        }
    }
    best
}
