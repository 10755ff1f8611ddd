//! The engine: wires the pure core to the network collaborators and runs
//! the two cycles (analysis and trade monitoring).
//!
//! All mutable state lives behind one mutex. Network calls are made before
//! the lock is taken, so a slow provider never blocks the other threads'
//! view of the tracker.

use crate::config::BotConfig;
use crate::report;
use chrono::{Duration, Utc};
use sniper_core::cooldown::{CooldownGate, GateDecision};
use sniper_core::domain::{CandleSeries, Signal, Trend, Verdict};
use sniper_core::indicators::{annotate, IndicatorSnapshot};
use sniper_core::signal::evaluate;
use sniper_core::sources::{
    AdvisoryScorer, MarketDataSource, Notifier, PriceSource, SignalContext,
};
use sniper_core::stats::StatsReport;
use sniper_core::tracker::TradeTracker;
use std::sync::{Arc, Mutex};

/// Everything the threads share. One lock, short critical sections.
pub struct EngineState {
    pub tracker: TradeTracker,
    pub cooldown: CooldownGate,
    pub last_snapshot: Option<IndicatorSnapshot>,
    pub last_price: Option<f64>,
    pub analysis_cycles: u64,
}

pub struct SniperEngine<M, P, S, N> {
    market: M,
    price_source: P,
    scorer: Option<S>,
    notifier: N,
    config: BotConfig,
    state: Arc<Mutex<EngineState>>,
}

impl<M, P, S, N> SniperEngine<M, P, S, N>
where
    M: MarketDataSource,
    P: PriceSource,
    S: AdvisoryScorer,
    N: Notifier,
{
    pub fn new(market: M, price_source: P, scorer: Option<S>, notifier: N, config: BotConfig) -> Self {
        let state = EngineState {
            tracker: TradeTracker::new(config.starting_balance),
            cooldown: CooldownGate::new(Duration::seconds(config.cooldown_secs as i64)),
            last_snapshot: None,
            last_price: None,
            analysis_cycles: 0,
        };
        Self {
            market,
            price_source,
            scorer,
            notifier,
            config,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Shared state handle for the health endpoint.
    pub fn state_handle(&self) -> Arc<Mutex<EngineState>> {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// One full analysis cycle. Every outcome, including failure to fetch
    /// data, produces exactly one notification. `force` bypasses the
    /// cooldown gate (manual /analyse).
    pub fn analysis_cycle(&self, force: bool) {
        let now = Utc::now();

        let (series, snapshots) = match self.fetch_and_annotate() {
            Ok(pair) => pair,
            Err(error) => {
                tracing::warn!(%error, "analysis cycle skipped");
                self.notifier.publish(&report::data_error(&error));
                return;
            }
        };

        let signal = evaluate(&series, &snapshots, &self.config.signal, &self.config.risk);
        let snapshot = snapshots[snapshots.len() - 1];
        let price = series.last().close;
        let trend = trend_of(price, &snapshot);
        let volume_ok = snapshot.volume_ma == 0.0 || series.last().volume > snapshot.volume_ma;

        {
            let mut state = self.state.lock().expect("engine state poisoned");
            state.last_snapshot = Some(snapshot);
            state.last_price = Some(price);
            state.analysis_cycles += 1;
        }

        tracing::info!(
            verdict = %signal.verdict,
            strength = signal.strength,
            price,
            rsi = snapshot.rsi,
            adx = snapshot.adx,
            "analysis complete"
        );

        if signal.verdict == Verdict::Neutral {
            self.notifier.publish(&report::no_signal(
                price,
                trend,
                snapshot.rsi,
                snapshot.adx,
                volume_ok,
            ));
            return;
        }

        // Cooldown gate before paying for the advisory call.
        {
            let state = self.state.lock().expect("engine state poisoned");
            if let GateDecision::Suppressed { remaining } = state.cooldown.check(now, force) {
                drop(state);
                self.notifier
                    .publish(&report::cooldown_suppressed(&signal, remaining.num_seconds()));
                return;
            }
        }

        // Advisory gate. Unavailability degrades to the engine's own
        // strength instead of blocking the signal.
        let advisory = match &self.scorer {
            Some(scorer) => {
                let context = SignalContext {
                    symbol: self.config.symbol.clone(),
                    price,
                    trend,
                    rsi: snapshot.rsi,
                    adx: snapshot.adx,
                    volume_confirmed: volume_ok,
                    verdict: signal.verdict.to_string(),
                };
                match scorer.score(&context) {
                    Ok(advice) => {
                        if advice.score < self.config.min_advisory_score {
                            self.notifier.publish(&report::advisory_rejected(
                                &signal,
                                advice.score,
                                self.config.min_advisory_score,
                                &advice.rationale,
                            ));
                            return;
                        }
                        Some(advice)
                    }
                    Err(error) => {
                        tracing::warn!(%error, "advisory scorer failed, degrading");
                        self.notifier
                            .publish(&report::advisory_unavailable(&signal, &error.to_string()));
                        None
                    }
                }
            }
            None => None,
        };

        self.accept_signal(&signal, advisory, now);
    }

    fn accept_signal(
        &self,
        signal: &Signal,
        advisory: Option<sniper_core::sources::AdvisoryScore>,
        now: chrono::DateTime<Utc>,
    ) {
        let mut state = self.state.lock().expect("engine state poisoned");
        let opened = match state.tracker.open_trade(signal, now) {
            Ok(trade) => trade.clone(),
            Err(sniper_core::tracker::TrackerError::PositionOpen { open_id }) => {
                drop(state);
                self.notifier
                    .publish(&report::position_already_open(signal, open_id));
                return;
            }
            Err(error) => {
                // Directional verdicts are the only path here
                drop(state);
                tracing::error!(%error, "failed to open trade");
                return;
            }
        };
        state.cooldown.arm(now);
        drop(state);

        tracing::info!(trade_id = opened.id, verdict = %signal.verdict, "trade opened");
        let mut message = report::signal_validated(
            signal,
            advisory.as_ref().map(|a| a.score),
            advisory.as_ref().map(|a| a.rationale.as_str()),
        );
        message.push_str("\n\n");
        message.push_str(&report::trade_opened(&opened));
        self.notifier.publish(&message);
    }

    /// One monitor tick: fetch the live price and check the open trade
    /// against its levels. No-op when nothing is open.
    pub fn monitor_cycle(&self) {
        let has_open = {
            let state = self.state.lock().expect("engine state poisoned");
            state.tracker.has_open_trade()
        };
        if !has_open {
            return;
        }

        let price = match self.price_source.fetch_price(&self.config.symbol) {
            Ok(price) => price,
            Err(error) => {
                tracing::warn!(%error, "monitor tick skipped");
                return;
            }
        };

        let closed = {
            let mut state = self.state.lock().expect("engine state poisoned");
            state.last_price = Some(price);
            state.tracker.tick(price, Utc::now())
        };

        if let Some(trade) = closed {
            tracing::info!(trade_id = trade.id, status = ?trade.status, "trade closed");
            self.notifier.publish(&report::trade_closed(&trade));
        }
    }

    /// Fresh status snapshot for the /status command.
    pub fn status_message(&self) -> String {
        let (series, snapshots) = match self.fetch_and_annotate() {
            Ok(pair) => pair,
            Err(error) => return report::data_error(&error),
        };
        let snapshot = snapshots[snapshots.len() - 1];
        let price = series.last().close;
        let volume_ok = snapshot.volume_ma == 0.0 || series.last().volume > snapshot.volume_ma;

        let state = self.state.lock().expect("engine state poisoned");
        report::status(price, &snapshot, volume_ok, state.tracker.open_trade_view())
    }

    /// Stats over closed trades for the /stats command.
    pub fn stats_message(&self) -> String {
        let state = self.state.lock().expect("engine state poisoned");
        let stats = StatsReport::from_history(state.tracker.history(), state.tracker.account());
        report::stats(stats.as_ref())
    }

    fn fetch_and_annotate(&self) -> Result<(CandleSeries, Vec<IndicatorSnapshot>), String> {
        let candles = self
            .market
            .fetch_candles(
                &self.config.symbol,
                &self.config.interval,
                self.config.candle_limit,
            )
            .map_err(|e| e.to_string())?;
        let series = CandleSeries::new(candles).map_err(|e| e.to_string())?;
        let snapshots = annotate(&series, &self.config.indicators);
        Ok((series, snapshots))
    }
}

fn trend_of(price: f64, snapshot: &IndicatorSnapshot) -> Trend {
    if price > snapshot.ema_trend {
        Trend::Bullish
    } else {
        Trend::Bearish
    }
}
