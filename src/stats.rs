//! Summary statistics of temperature fields.
use std::ops::AddAssign;

use ndarray::Array2;
use serde_derive::*;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.,
        }
    }
}

impl Stats {
    pub fn from_field(field: &Array2<f64>) -> Self {
        field.fold(Stats::default(), |mut acc, &val| {
            acc += val;
            acc
        })
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl AddAssign<f64> for Stats {
    fn add_assign(&mut self, val: f64) {
        self.count += 1;
        self.min = self.min.min(val);
        self.max = self.max.max(val);
        self.mean += (val - self.mean) / self.count as f64;
    }
}

impl AddAssign<&Stats> for Stats {
    fn add_assign(&mut self, other: &Stats) {
        if other.count == 0 {
            return;
        }
        let count = self.count + other.count;
        self.mean += (other.mean - self.mean) * other.count as f64 / count as f64;
        self.count = count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn summarises_field() {
        let field = arr2(&[[20.5, 31.], [18., 22.5]]);
        let stats = Stats::from_field(&field);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 18.);
        assert_eq!(stats.max, 31.);
        assert!((stats.mean - 23.).abs() < 1e-12);
    }

    #[test]
    fn merge_matches_single_pass() {
        let values = [3., -1., 7.5, 2., 9., 0.25, 4.];
        let mut whole = Stats::default();
        for &v in values.iter() {
            whole += v;
        }

        let mut left = Stats::default();
        let mut right = Stats::default();
        for &v in values[..3].iter() {
            left += v;
        }
        for &v in values[3..].iter() {
            right += v;
        }
        left += &right;
        left += &Stats::default();

        assert_eq!(left.count, whole.count);
        assert_eq!((left.min, left.max), (whole.min, whole.max));
        assert!((left.mean - whole.mean).abs() < 1e-12);
    }

    #[test]
    fn empty_stats() {
        let stats = Stats::default();
        assert!(stats.is_empty());
        let mut merged = Stats::default();
        merged += &stats;
        assert!(merged.is_empty());
        assert_eq!(merged.mean, 0.);
    }
}
