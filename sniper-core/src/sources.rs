//! Collaborator traits — the seams between the engine and the outside world.
//!
//! The runtime crate provides real implementations (Binance, Groq, Telegram);
//! tests substitute mocks. All calls are blocking with bounded timeouts and
//! must be made BEFORE taking the engine state lock.

use crate::domain::{Candle, Trend};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for external collaborators.
///
/// A failure is always distinguishable from "empty but valid" data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("source error: {0}")]
    Other(String),
}

/// Fetches candle series for the instrument under analysis.
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the most recent `count` candles for `symbol` at `interval`
    /// (e.g. "15m"), strictly time-ascending.
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        count: usize,
    ) -> Result<Vec<Candle>, SourceError>;
}

/// Fetches the latest traded price, used by the trade monitor tick.
pub trait PriceSource: Send + Sync {
    fn fetch_price(&self, symbol: &str) -> Result<f64, SourceError>;
}

/// Context handed to the advisory scorer: the technical picture behind a
/// directional signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalContext {
    pub symbol: String,
    pub price: f64,
    pub trend: Trend,
    pub rsi: f64,
    pub adx: f64,
    pub volume_confirmed: bool,
    pub verdict: String,
}

/// Advisory verdict from the external scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryScore {
    /// Confidence 0-100.
    pub score: u8,
    pub rationale: String,
}

/// Optional second opinion on a directional signal. Unavailability must not
/// block the engine; callers fall back to the signal's own strength.
pub trait AdvisoryScorer: Send + Sync {
    fn score(&self, context: &SignalContext) -> Result<AdvisoryScore, SourceError>;
}

/// Fire-and-forget delivery of human-readable reports. Delivery failure is
/// logged by implementations and never fatal to the engine loop.
pub trait Notifier: Send + Sync {
    fn publish(&self, message: &str);
}
