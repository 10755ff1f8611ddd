//! Simple Moving Average (SMA).
//!
//! Rolling mean over a lookback window. First valid value at index
//! `period - 1`; NaN before that. Used for the volume moving average and as
//! the rolling mean inside ATR.

/// Compute a rolling mean over an arbitrary series. NaN during warmup.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "SMA period must be >= 1");
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period {
        return result;
    }

    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = sum / period as f64;

    for i in period..n {
        sum = sum - values[i - period] + values[i];
        result[i] = sum / period as f64;
    }

    result
}
