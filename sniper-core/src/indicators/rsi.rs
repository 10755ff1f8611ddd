//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Warmup: `period` candles (first value at index `period`).
//! Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0;
//! both zero (no movement) → RSI = 50.

/// Compute RSI over a close-price series. NaN during warmup.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "RSI period must be >= 1");
    let n = closes.len();
    let mut result = vec![f64::NAN; n];

    if n < period + 1 {
        return result;
    }

    // Seed: average gain and average loss over the first `period` changes
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    result[period] = rsi_value(avg_gain, avg_loss);

    // Wilder smoothing for subsequent values
    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let change = closes[i] - closes[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

        result[i] = rsi_value(avg_gain, avg_loss);
    }

    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn rsi_all_gains() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        let result = rsi(&closes, 3);
        assert_approx(result[3], 100.0, 1e-6);
        assert_approx(result[5], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let closes = [105.0, 104.0, 103.0, 102.0, 101.0, 100.0];
        let result = rsi(&closes, 3);
        assert_approx(result[3], 0.0, 1e-6);
        assert_approx(result[5], 0.0, 1e-6);
    }

    #[test]
    fn rsi_flat_series_is_neutral() {
        let closes = [100.0; 20];
        let result = rsi(&closes, 14);
        assert_approx(result[19], 50.0, 1e-9);
    }

    #[test]
    fn rsi_warmup_is_nan() {
        let closes = [44.0, 44.34, 44.09, 43.61, 44.33];
        let result = rsi(&closes, 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert!(result[3] > 0.0 && result[3] < 100.0);
    }

    #[test]
    fn rsi_bounds() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0];
        let result = rsi(&closes, 3);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v),
                    "RSI out of bounds at candle {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn rsi_rising_series_converges_high() {
        // Strictly increasing closes push RSI toward 100
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&closes, 14);
        let last = *result.last().unwrap();
        assert!(last > 95.0, "RSI should converge toward 100, got {last}");
    }

    #[test]
    fn rsi_falling_series_converges_low() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let result = rsi(&closes, 14);
        let last = *result.last().unwrap();
        assert!(last < 5.0, "RSI should converge toward 0, got {last}");
    }
}
