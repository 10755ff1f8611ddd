//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * value[t] + (1 - alpha) * EMA[t-1]
//! with alpha = 2 / (period + 1), seeded with the first value.
//!
//! Seeding with the first value (rather than an SMA of the first window)
//! matches adjust-free exponential weighting, so the EMA is defined from
//! index 0 and needs no warmup fill.

/// Compute an EMA over an arbitrary series. Defined for every index.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "EMA period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let mut prev = values[0];
    result[0] = prev;
    for i in 1..n {
        let smoothed = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = smoothed;
        prev = smoothed;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_input() {
        let result = ema(&[100.0, 200.0, 300.0], 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 2/(3+1) = 0.5, seed = 10
        // EMA[1] = 0.5*11 + 0.5*10 = 10.5
        // EMA[2] = 0.5*12 + 0.5*10.5 = 11.25
        // EMA[3] = 0.5*13 + 0.5*11.25 = 12.125
        let result = ema(&[10.0, 11.0, 12.0, 13.0], 3);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_defined_from_first_index() {
        let result = ema(&[42.0; 5], 200);
        assert!(result.iter().all(|v| !v.is_nan()));
        assert_approx(result[4], 42.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_tracks_constant_series() {
        let result = ema(&[7.5; 30], 20);
        for &v in &result {
            assert_approx(v, 7.5, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn ema_empty_input() {
        assert!(ema(&[], 14).is_empty());
    }
}
