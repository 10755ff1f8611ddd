//! Per-candle indicator snapshots with the neutral-default policy.
//!
//! [`annotate`] computes every configured indicator over the full series and
//! zips the results into one [`IndicatorSnapshot`] per candle. Warmup NaN is
//! replaced here: RSI falls back to 50 (neutral), ATR / volume MA / ADX fall
//! back to 0. Insufficient history is a policy, not an error — short series
//! simply produce conservative snapshots that no signal tier can act on.

use crate::domain::CandleSeries;
use crate::indicators::{adx, atr, ema, rsi, sma};
use serde::{Deserialize, Serialize};

/// Indicator periods. Defaults mirror the classic parameter set:
/// RSI(14), EMA(20/50/200), ATR(14), volume MA(20), ADX(14).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub ema_trend_period: usize,
    pub atr_period: usize,
    pub volume_ma_period: usize,
    pub adx_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_fast_period: 20,
            ema_slow_period: 50,
            ema_trend_period: 200,
            atr_period: 14,
            volume_ma_period: 20,
            adx_period: 14,
        }
    }
}

/// Derived values for one candle. Every field is finite; warmup defaults have
/// already been applied. Values at index `i` depend only on candles `<= i`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: f64,
    pub atr: f64,
    pub volume_ma: f64,
    pub adx: f64,
}

/// Annotate a candle series with one snapshot per candle.
pub fn annotate(series: &CandleSeries, cfg: &IndicatorConfig) -> Vec<IndicatorSnapshot> {
    let candles = series.candles();
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

    let rsi_series = rsi(&closes, cfg.rsi_period);
    let ema_fast = ema(&closes, cfg.ema_fast_period);
    let ema_slow = ema(&closes, cfg.ema_slow_period);
    let ema_trend = ema(&closes, cfg.ema_trend_period);
    let atr_series = atr(candles, cfg.atr_period);
    let volume_ma = sma(&volumes, cfg.volume_ma_period);
    let adx_series = adx(candles, cfg.adx_period);

    (0..candles.len())
        .map(|i| IndicatorSnapshot {
            rsi: or_default(rsi_series[i], 50.0),
            // EMA is seeded with the first value, so it is always defined.
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            ema_trend: ema_trend[i],
            atr: or_default(atr_series[i], 0.0),
            volume_ma: or_default(volume_ma[i], 0.0),
            adx: or_default(adx_series[i], 0.0),
        })
        .collect()
}

fn or_default(value: f64, default: f64) -> f64 {
    if value.is_nan() {
        default
    } else {
        value
    }
}
