use crate::simd::{count_present, find_max_area_index, sum_f64};

/// Largest-Triangle-Three-Buckets selection over a value sequence whose x
/// coordinate is the position itself.
///
/// Returns ascending positions. The first and last positions are always
/// kept. A bucket that mixes NaN and numbers contributes its first NaN
/// position too, so gaps in the series survive the sampling; an all-NaN
/// bucket contributes its first position.
pub fn lttb_indices(values: &[f64], frame_size: usize) -> Vec<usize> {
    let len = values.len();
    if len <= 2 || frame_size <= 1 {
        return (0..len).collect();
    }

    let mut output = Vec::with_capacity(len / frame_size + 3);
    output.push(0);

    let mut a_idx = 0;
    let mut a_y = if values[0].is_nan() { 0.0 } else { values[0] };

    let mut i = 1;
    while i < len - 1 {
        let frame_end = (i + frame_size).min(len - 1);
        let next_start = frame_end;
        let next_end = (frame_end + frame_size).min(len);

        // Point C is the average of the next bucket.
        let next = &values[next_start..next_end];
        let present = count_present(next);
        let c_x = (next_start + next_end - 1) as f64 / 2.0;
        let c_y = if present > 0 {
            sum_f64(next) / present as f64
        } else {
            a_y
        };

        let frame = &values[i..frame_end];
        let best = find_max_area_index(frame, i as f64, (a_idx as f64, a_y), (c_x, c_y));
        let first_nan = frame.iter().position(|v| v.is_nan());

        match (best, first_nan) {
            (Some(b), Some(n)) => {
                output.push(i + b.min(n));
                output.push(i + b.max(n));
                a_idx = i + b;
                a_y = frame[b];
            }
            (Some(b), None) => {
                output.push(i + b);
                a_idx = i + b;
                a_y = frame[b];
            }
            (None, _) => output.push(i),
        }
        i = frame_end;
    }

    output.push(len - 1);
    output
}
