use serde::{Deserialize, Serialize};

/// A `[min, max]` pair over a set of values.
///
/// The empty extent is `[+inf, -inf]`, so folding any number into it yields a
/// proper extent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Extent {
    pub const EMPTY: Extent = Extent {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Widens the extent to cover `v`. NaN never widens it.
    #[inline(always)]
    pub fn fold(&mut self, v: f64) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    pub fn merge(&mut self, other: Extent) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Closed-interval membership. NaN is never contained.
    #[inline(always)]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.min, self.max]
    }
}

impl From<[f64; 2]> for Extent {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<(f64, f64)> for Extent {
    fn from(v: (f64, f64)) -> Self {
        Self::new(v.0, v.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_skips_nan() {
        let mut e = Extent::EMPTY;
        assert!(e.is_empty());
        e.fold(3.0);
        e.fold(f64::NAN);
        e.fold(-1.0);
        assert_eq!(e.as_array(), [-1.0, 3.0]);
        assert!(e.contains(3.0));
        assert!(!e.contains(3.5));
        assert!(!e.contains(f64::NAN));
    }
}
