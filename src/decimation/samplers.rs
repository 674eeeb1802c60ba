use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data_types::MISSING;
use crate::simd::{count_present, extent_f64, sum_f64};

/// Built-in frame aggregators for [`SeriesData::down_sample`](crate::SeriesData::down_sample).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampler {
    #[default]
    Average,
    Sum,
    Min,
    Max,
    /// First value of the frame.
    Nearest,
}

impl Sampler {
    pub fn aggregate(self, frame: &[f64]) -> f64 {
        match self {
            Sampler::Average => average(frame),
            Sampler::Sum => sum(frame),
            Sampler::Min => min(frame),
            Sampler::Max => max(frame),
            Sampler::Nearest => nearest(frame),
        }
    }
}

impl FromStr for Sampler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(Sampler::Average),
            "sum" => Ok(Sampler::Sum),
            "min" => Ok(Sampler::Min),
            "max" => Ok(Sampler::Max),
            "nearest" => Ok(Sampler::Nearest),
            other => Err(format!("unknown sampler `{other}`")),
        }
    }
}

/// Mean of the non-NaN values; NaN when there are none.
pub fn average(frame: &[f64]) -> f64 {
    let n = count_present(frame);
    if n == 0 {
        MISSING
    } else {
        sum_f64(frame) / n as f64
    }
}

pub fn sum(frame: &[f64]) -> f64 {
    if count_present(frame) == 0 {
        MISSING
    } else {
        sum_f64(frame)
    }
}

pub fn min(frame: &[f64]) -> f64 {
    let e = extent_f64(frame);
    if e.is_empty() {
        MISSING
    } else {
        e.min
    }
}

pub fn max(frame: &[f64]) -> f64 {
    let e = extent_f64(frame);
    if e.is_empty() {
        MISSING
    } else {
        e.max
    }
}

pub fn nearest(frame: &[f64]) -> f64 {
    frame.first().copied().unwrap_or(MISSING)
}

/// Index pickers: choose which row of a frame carries the aggregate.
///
/// Middle of the frame, `round(len / 2)`.
pub fn pick_middle(frame: &[f64], _value: f64) -> usize {
    (frame.len() as f64 / 2.0).round() as usize
}

pub fn pick_first(_frame: &[f64], _value: f64) -> usize {
    0
}

/// Row whose value is closest to the aggregate; first row when nothing compares.
pub fn pick_nearest(frame: &[f64], value: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, v) in frame.iter().enumerate() {
        let d = (v - value).abs();
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Indices of the minimum and maximum of a frame, NaN skipped.
#[inline(always)]
pub fn find_extrema_indices(frame: &[f64]) -> (usize, usize) {
    let n = frame.len();
    if n == 0 {
        return (0, 0);
    }

    let Some(start) = frame.iter().position(|v| !v.is_nan()) else {
        return (0, 0);
    };
    let mut min_idx = start;
    let mut max_idx = start;

    for i in start + 1..n {
        let val = frame[i];
        if val.is_nan() {
            continue;
        }
        if val < frame[min_idx] {
            min_idx = i;
        } else if val > frame[max_idx] {
            max_idx = i;
        }
    }
    (min_idx, max_idx)
}

pub fn pick_min(frame: &[f64], _value: f64) -> usize {
    find_extrema_indices(frame).0
}

pub fn pick_max(frame: &[f64], _value: f64) -> usize {
    find_extrema_indices(frame).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregates_skip_nan() {
        let frame = [1.0, f64::NAN, 3.0, 8.0];
        assert_eq!(average(&frame), 4.0);
        assert_eq!(sum(&frame), 12.0);
        assert_eq!(min(&frame), 1.0);
        assert_eq!(max(&frame), 8.0);
        assert_eq!(nearest(&frame), 1.0);
        assert!(average(&[f64::NAN, f64::NAN]).is_nan());
        assert!(max(&[]).is_nan());
    }

    #[test]
    fn test_pickers() {
        let frame = [5.0, 1.0, f64::NAN, 9.0, 4.0];
        assert_eq!(pick_middle(&frame, 0.0), 3);
        assert_eq!(pick_nearest(&frame, 4.2), 4);
        assert_eq!(pick_min(&frame, 0.0), 1);
        assert_eq!(pick_max(&frame, 0.0), 3);
        assert_eq!(find_extrema_indices(&[f64::NAN, 2.0]), (1, 1));
    }

    #[test]
    fn test_sampler_from_str() {
        assert_eq!("max".parse::<Sampler>(), Ok(Sampler::Max));
        assert!("median".parse::<Sampler>().is_err());
        assert_eq!(Sampler::Average.aggregate(&[2.0, 4.0]), 3.0);
    }
}
