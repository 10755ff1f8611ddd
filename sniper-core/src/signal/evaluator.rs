//! The tiered rule engine.
//!
//! Tiers are evaluated strictest first and are mutually exclusive: the first
//! predicate that matches wins and no later tier is consulted. Later tiers
//! are intentionally looser, so the ordering is a deliberate tie-break and
//! must not be rearranged.
//!
//! A market-active gate (ADX floor) runs before any tier; a flat market
//! forces NEUTRAL even when a momentum condition would have matched.

use crate::domain::{Candle, CandleSeries, Direction, Signal, Trend, Verdict};
use crate::indicators::IndicatorSnapshot;
use crate::risk::{self, RiskConfig};
use crate::signal::SignalConfig;

/// A tier match before risk levels are attached.
struct TierMatch {
    direction: Direction,
    strength: u8,
    rationale: String,
}

/// Everything a tier predicate may look at.
struct TierContext<'a> {
    last: &'a Candle,
    prev: &'a Candle,
    snap: &'a IndicatorSnapshot,
    snap_prev: &'a IndicatorSnapshot,
    trend: Trend,
    volume_ok: bool,
}

/// Evaluate the rule tiers over the latest two candles and snapshots.
///
/// Always returns a signal; failures of the risk engine or the market-active
/// gate degrade to a NEUTRAL verdict with an explanatory rationale.
pub fn evaluate(
    series: &CandleSeries,
    snapshots: &[IndicatorSnapshot],
    cfg: &SignalConfig,
    risk_cfg: &RiskConfig,
) -> Signal {
    debug_assert_eq!(series.len(), snapshots.len());

    let price = series.last().close;
    let min_candles = cfg.min_candles.max(2);
    if series.len() < min_candles {
        return Signal::neutral(
            format!(
                "insufficient history: {} candles, need {min_candles}",
                series.len()
            ),
            price,
        );
    }

    let last = series.last();
    let prev = series.prev().expect("length checked above");
    let snap = &snapshots[snapshots.len() - 1];
    let snap_prev = &snapshots[snapshots.len() - 2];

    // Market-active gate: flat/ranging market forces NEUTRAL.
    if let Some(floor) = cfg.adx_floor {
        if snap.adx < floor {
            return Signal::neutral(
                format!("market inactive: ADX {:.1} below floor {floor:.1}", snap.adx),
                price,
            );
        }
    }

    let trend = if last.close > snap.ema_trend {
        Trend::Bullish
    } else {
        Trend::Bearish
    };
    // Warmup volume MA of 0 counts as confirmed, matching the neutral-default
    // policy for short history.
    let volume_ok = !cfg.require_volume || snap.volume_ma == 0.0 || last.volume > snap.volume_ma;

    let ctx = TierContext {
        last,
        prev,
        snap,
        snap_prev,
        trend,
        volume_ok,
    };

    let matched = extreme_override(&ctx, cfg)
        .or_else(|| momentum_exhaustion(&ctx, cfg))
        .or_else(|| momentum_reversal(&ctx, cfg))
        .or_else(|| pullback_reclaim(&ctx))
        .or_else(|| ema_crossover(&ctx))
        .or_else(|| trend_momentum(&ctx, cfg));

    let Some(tier) = matched else {
        return Signal::neutral(
            format!(
                "no setup: trend {trend}, RSI {:.1}, ADX {:.1}",
                snap.rsi, snap.adx
            ),
            price,
        );
    };

    match risk::plan(tier.direction, price, snap.atr, series, risk_cfg) {
        Ok(levels) => Signal {
            verdict: match tier.direction {
                Direction::Long => Verdict::Long,
                Direction::Short => Verdict::Short,
            },
            strength: tier.strength,
            rationale: tier.rationale,
            entry: price,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
        },
        Err(err) => Signal::neutral(format!("{} — but {err}", tier.rationale), price),
    }
}

/// Tier 1: extreme-momentum override. Fires regardless of trend.
fn extreme_override(ctx: &TierContext, cfg: &SignalConfig) -> Option<TierMatch> {
    if ctx.snap.rsi <= cfg.rsi_extreme_low && ctx.last.is_green() {
        return Some(TierMatch {
            direction: Direction::Long,
            strength: 90,
            rationale: format!(
                "extreme oversold: RSI {:.1} at or below {:.0} with green candle",
                ctx.snap.rsi, cfg.rsi_extreme_low
            ),
        });
    }
    if ctx.snap.rsi >= cfg.rsi_extreme_high && ctx.last.is_red() {
        return Some(TierMatch {
            direction: Direction::Short,
            strength: 90,
            rationale: format!(
                "extreme overbought: RSI {:.1} at or above {:.0} with red candle",
                ctx.snap.rsi, cfg.rsi_extreme_high
            ),
        });
    }
    None
}

/// Tier 2: strong trend-aligned momentum exhaustion with body and volume
/// confirmation.
fn momentum_exhaustion(ctx: &TierContext, cfg: &SignalConfig) -> Option<TierMatch> {
    if !ctx.volume_ok {
        return None;
    }
    let body_ok = ctx.last.body() >= cfg.body_atr_ratio * ctx.snap.atr;
    if !body_ok {
        return None;
    }
    match ctx.trend {
        Trend::Bullish if ctx.snap.rsi <= cfg.rsi_pullback_long && ctx.last.is_green() => {
            Some(TierMatch {
                direction: Direction::Long,
                strength: 75,
                rationale: format!(
                    "bullish exhaustion: RSI {:.1} pullback in uptrend, strong green body",
                    ctx.snap.rsi
                ),
            })
        }
        Trend::Bearish if ctx.snap.rsi >= cfg.rsi_pullback_short && ctx.last.is_red() => {
            Some(TierMatch {
                direction: Direction::Short,
                strength: 75,
                rationale: format!(
                    "bearish exhaustion: RSI {:.1} rally in downtrend, strong red body",
                    ctx.snap.rsi
                ),
            })
        }
        _ => None,
    }
}

/// Tier 3: momentum-reversal confirmation — RSI crossing back out of an
/// extreme zone into the middle band.
fn momentum_reversal(ctx: &TierContext, cfg: &SignalConfig) -> Option<TierMatch> {
    if ctx.snap_prev.rsi < cfg.rsi_reversal_low
        && ctx.snap.rsi >= cfg.rsi_reversal_low
        && ctx.snap.rsi <= cfg.rsi_middle_low
    {
        return Some(TierMatch {
            direction: Direction::Long,
            strength: 60,
            rationale: format!(
                "oversold reversal: RSI recovered {:.1} → {:.1}",
                ctx.snap_prev.rsi, ctx.snap.rsi
            ),
        });
    }
    if ctx.snap_prev.rsi > cfg.rsi_reversal_high
        && ctx.snap.rsi <= cfg.rsi_reversal_high
        && ctx.snap.rsi >= cfg.rsi_middle_high
    {
        return Some(TierMatch {
            direction: Direction::Short,
            strength: 60,
            rationale: format!(
                "overbought reversal: RSI faded {:.1} → {:.1}",
                ctx.snap_prev.rsi, ctx.snap.rsi
            ),
        });
    }
    None
}

/// Tier 4: trend-continuation pullback — price reclaiming the fast EMA after
/// dipping below it, volume confirmed.
fn pullback_reclaim(ctx: &TierContext) -> Option<TierMatch> {
    if !ctx.volume_ok {
        return None;
    }
    match ctx.trend {
        Trend::Bullish
            if ctx.prev.close < ctx.snap_prev.ema_fast && ctx.last.close > ctx.snap.ema_fast =>
        {
            Some(TierMatch {
                direction: Direction::Long,
                strength: 55,
                rationale: "pullback reclaim: close back above fast EMA in uptrend".to_string(),
            })
        }
        Trend::Bearish
            if ctx.prev.close > ctx.snap_prev.ema_fast && ctx.last.close < ctx.snap.ema_fast =>
        {
            Some(TierMatch {
                direction: Direction::Short,
                strength: 55,
                rationale: "pullback rejection: close back below fast EMA in downtrend".to_string(),
            })
        }
        _ => None,
    }
}

/// Tier 5: fast EMA crossing the slow EMA between the previous and latest
/// snapshot.
fn ema_crossover(ctx: &TierContext) -> Option<TierMatch> {
    let crossed_up =
        ctx.snap_prev.ema_fast <= ctx.snap_prev.ema_slow && ctx.snap.ema_fast > ctx.snap.ema_slow;
    let crossed_down =
        ctx.snap_prev.ema_fast >= ctx.snap_prev.ema_slow && ctx.snap.ema_fast < ctx.snap.ema_slow;
    if crossed_up {
        Some(TierMatch {
            direction: Direction::Long,
            strength: 50,
            rationale: "golden cross: fast EMA crossed above slow EMA".to_string(),
        })
    } else if crossed_down {
        Some(TierMatch {
            direction: Direction::Short,
            strength: 50,
            rationale: "death cross: fast EMA crossed below slow EMA".to_string(),
        })
    } else {
        None
    }
}

/// Tier 6: generic trend-aligned momentum in the neutral RSI band with
/// adequate volume.
fn trend_momentum(ctx: &TierContext, cfg: &SignalConfig) -> Option<TierMatch> {
    if !ctx.volume_ok {
        return None;
    }
    let in_band = ctx.snap.rsi >= cfg.rsi_middle_low && ctx.snap.rsi <= cfg.rsi_middle_high;
    if !in_band {
        return None;
    }
    match ctx.trend {
        Trend::Bullish if ctx.last.is_green() => Some(TierMatch {
            direction: Direction::Long,
            strength: 40,
            rationale: format!(
                "trend continuation: green candle in uptrend, RSI {:.1} neutral",
                ctx.snap.rsi
            ),
        }),
        Trend::Bearish if ctx.last.is_red() => Some(TierMatch {
            direction: Direction::Short,
            strength: 40,
            rationale: format!(
                "trend continuation: red candle in downtrend, RSI {:.1} neutral",
                ctx.snap.rsi
            ),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;
    use chrono::{Duration, TimeZone, Utc};

    /// Build a series of `count` candles where only the last two matter:
    /// `prev` and `last` are supplied, earlier candles are flat filler.
    fn series_with_tail(count: usize, prev: (f64, f64), last: (f64, f64)) -> CandleSeries {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut candles: Vec<Candle> = (0..count - 2)
            .map(|i| Candle {
                timestamp: base + Duration::minutes(i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1000.0,
            })
            .collect();
        for (offset, (open, close)) in [(count - 2, prev), (count - 1, last)] {
            candles.push(Candle {
                timestamp: base + Duration::minutes(offset as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 2000.0,
            });
        }
        CandleSeries::new(candles).unwrap()
    }

    fn snapshot(rsi: f64, adx: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi,
            ema_fast: 100.0,
            ema_slow: 100.0,
            ema_trend: 90.0, // below price → bullish by default
            atr: 2.0,
            volume_ma: 1500.0,
            adx,
        }
    }

    /// Snapshots where only the last two entries matter.
    fn snapshots_with_tail(
        count: usize,
        prev: IndicatorSnapshot,
        last: IndicatorSnapshot,
    ) -> Vec<IndicatorSnapshot> {
        let mut snaps = vec![snapshot(50.0, 25.0); count - 2];
        snaps.push(prev);
        snaps.push(last);
        snaps
    }

    fn cfg() -> SignalConfig {
        SignalConfig {
            min_candles: 10,
            ..SignalConfig::default()
        }
    }

    #[test]
    fn insufficient_history_is_neutral() {
        let series = series_with_tail(5, (100.0, 99.0), (99.0, 100.0));
        let snaps = snapshots_with_tail(5, snapshot(50.0, 25.0), snapshot(50.0, 25.0));
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Neutral);
        assert!(signal.rationale.contains("insufficient history"));
    }

    #[test]
    fn adx_gate_forces_neutral_even_on_extreme_setup() {
        // Tier 1 conditions hold (RSI 15, green candle) but ADX is flat
        let series = series_with_tail(20, (100.0, 99.0), (99.0, 100.0));
        let snaps = snapshots_with_tail(20, snapshot(16.0, 5.0), snapshot(15.0, 5.0));
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Neutral);
        assert!(signal.rationale.contains("market inactive"));
    }

    #[test]
    fn adx_gate_disabled_lets_tier_fire() {
        let series = series_with_tail(20, (100.0, 99.0), (99.0, 100.0));
        let snaps = snapshots_with_tail(20, snapshot(16.0, 5.0), snapshot(15.0, 5.0));
        let mut config = cfg();
        config.adx_floor = None;
        let signal = evaluate(&series, &snaps, &config, &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Long);
        assert_eq!(signal.strength, 90);
    }

    #[test]
    fn extreme_oversold_fires_long_against_trend() {
        // Bearish trend (price below trend EMA) but RSI extreme + green candle
        let series = series_with_tail(20, (100.0, 99.0), (99.0, 100.0));
        let mut prev = snapshot(18.0, 30.0);
        let mut last = snapshot(15.0, 30.0);
        prev.ema_trend = 150.0;
        last.ema_trend = 150.0;
        let snaps = snapshots_with_tail(20, prev, last);
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Long);
        assert_eq!(signal.strength, 90);
        assert!(signal.rationale.contains("extreme oversold"));
    }

    #[test]
    fn strictest_tier_wins_when_several_match() {
        // RSI 20 with a green candle in an uptrend with volume satisfies both
        // the extreme override (tier 1) and the exhaustion tier (tier 2);
        // the override must win.
        let series = series_with_tail(20, (100.0, 98.0), (98.0, 101.0));
        let snaps = snapshots_with_tail(20, snapshot(22.0, 30.0), snapshot(20.0, 30.0));
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Long);
        assert_eq!(signal.strength, 90, "tier 1 must shadow tier 2");
    }

    #[test]
    fn exhaustion_tier_fires_in_uptrend() {
        // RSI 40 (below pullback threshold 45), green candle, body 3 >= 0.5*ATR
        let series = series_with_tail(20, (100.0, 98.0), (98.0, 101.0));
        let snaps = snapshots_with_tail(20, snapshot(42.0, 30.0), snapshot(40.0, 30.0));
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Long);
        assert_eq!(signal.strength, 75);
    }

    #[test]
    fn exhaustion_requires_volume_when_configured() {
        let series = series_with_tail(20, (100.0, 98.0), (98.0, 101.0));
        let mut prev = snapshot(42.0, 30.0);
        let mut last = snapshot(40.0, 30.0);
        // Volume MA above the candle volume of 2000 → not confirmed
        prev.volume_ma = 5000.0;
        last.volume_ma = 5000.0;
        let snaps = snapshots_with_tail(20, prev, last);
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Neutral);
    }

    #[test]
    fn reversal_tier_fires_on_rsi_recovery() {
        // Prev RSI 25 (below 30), now 35 (inside 30..45), red candle so the
        // exhaustion tier cannot fire first
        let series = series_with_tail(20, (100.0, 101.0), (101.0, 100.5));
        let snaps = snapshots_with_tail(20, snapshot(25.0, 30.0), snapshot(35.0, 30.0));
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Long);
        assert_eq!(signal.strength, 60);
        assert!(signal.rationale.contains("oversold reversal"));
    }

    #[test]
    fn ema_crossover_tier_fires() {
        // RSI far from every momentum tier; fast EMA crosses above slow
        let series = series_with_tail(20, (100.0, 101.0), (101.0, 102.0));
        let mut prev = snapshot(60.0, 30.0);
        let mut last = snapshot(60.0, 30.0);
        prev.ema_fast = 99.0;
        prev.ema_slow = 100.0;
        last.ema_fast = 101.0;
        last.ema_slow = 100.0;
        let snaps = snapshots_with_tail(20, prev, last);
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Long);
        assert_eq!(signal.strength, 50);
        assert!(signal.rationale.contains("golden cross"));
    }

    #[test]
    fn generic_trend_tier_is_last_resort() {
        // Neutral RSI band, green candle, uptrend, volume ok; no stricter tier
        // matches because the body is small relative to ATR
        let mut prev = snapshot(50.0, 30.0);
        let mut last = snapshot(50.0, 30.0);
        prev.atr = 10.0;
        last.atr = 10.0;
        let series = series_with_tail(20, (100.0, 100.5), (100.5, 101.0));
        let snaps = snapshots_with_tail(20, prev, last);
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Long);
        assert_eq!(signal.strength, 40);
    }

    #[test]
    fn no_tier_yields_neutral_with_context() {
        // Bearish candle in an uptrend, neutral RSI → nothing matches
        let series = series_with_tail(20, (100.0, 101.0), (101.0, 100.0));
        let mut prev = snapshot(60.0, 30.0);
        let mut last = snapshot(60.0, 30.0);
        prev.atr = 10.0;
        last.atr = 10.0;
        let snaps = snapshots_with_tail(20, prev, last);
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Neutral);
        assert_eq!(signal.strength, 0);
        assert!(signal.rationale.contains("no setup"));
    }

    #[test]
    fn invalid_risk_levels_degrade_to_neutral() {
        // The reversal tier has no candle-color requirement, so a doji series
        // whose lows never dip below the close leaves zero stop distance when
        // ATR is also zero.
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let candles: Vec<Candle> = (0..20)
            .map(|i| Candle {
                timestamp: base + Duration::minutes(i as i64),
                open: 100.0,
                high: 100.5,
                low: 100.0,
                close: 100.0,
                volume: 1000.0,
            })
            .collect();
        let series = CandleSeries::new(candles).unwrap();
        let mut prev = snapshot(25.0, 30.0);
        let mut last = snapshot(35.0, 30.0);
        prev.atr = 0.0;
        last.atr = 0.0;
        let snaps = snapshots_with_tail(20, prev, last);
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Neutral);
        assert!(signal.rationale.contains("invalid levels"));
    }

    #[test]
    fn short_side_mirrors_long() {
        // Downtrend, RSI 60 above pullback threshold, red candle with volume
        let series = series_with_tail(20, (100.0, 102.0), (102.0, 99.0));
        let mut prev = snapshot(62.0, 30.0);
        let mut last = snapshot(60.0, 30.0);
        prev.ema_trend = 150.0;
        last.ema_trend = 150.0;
        let snaps = snapshots_with_tail(20, prev, last);
        let signal = evaluate(&series, &snaps, &cfg(), &RiskConfig::default());
        assert_eq!(signal.verdict, Verdict::Short);
        assert_eq!(signal.strength, 75);
        assert!(signal.stop_loss > signal.entry);
        assert!(signal.take_profit < signal.entry);
    }
}
