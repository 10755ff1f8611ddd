//! Bot configuration: TOML file for tunables, environment for secrets.
//!
//! Secrets (Telegram token/chat id, Groq API key) never live in the TOML
//! file. A missing Groq key disables the advisory gate; a missing Telegram
//! token is an error only when the bot actually needs to deliver messages.

use serde::{Deserialize, Serialize};
use sniper_core::indicators::IndicatorConfig;
use sniper_core::risk::RiskConfig;
use sniper_core::signal::SignalConfig;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the whole bot. Every field has a default mirroring the
/// classic parameter set, so an empty file (or no file) is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BotConfig {
    /// Instrument to analyse, e.g. "BTCUSDT".
    pub symbol: String,
    /// Candle interval, e.g. "15m".
    pub interval: String,
    /// Candles fetched per analysis cycle.
    pub candle_limit: usize,
    /// Seconds between scheduled analysis cycles.
    pub analysis_interval_secs: u64,
    /// Seconds between open-trade monitor ticks.
    pub monitor_interval_secs: u64,
    /// Advisory score below this rejects a directional signal.
    pub min_advisory_score: u8,
    /// Simulated account starting balance.
    pub starting_balance: f64,
    /// Minimum seconds between accepted signals; 0 disables the gate.
    pub cooldown_secs: u64,
    /// Port for the liveness HTTP endpoint.
    pub health_port: u16,
    /// Model name for the advisory scorer.
    pub groq_model: String,

    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
    pub risk: RiskConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: "15m".to_string(),
            candle_limit: 100,
            analysis_interval_secs: 1500,
            monitor_interval_secs: 60,
            min_advisory_score: 75,
            starting_balance: 10_000.0,
            cooldown_secs: 0,
            health_port: 10_000,
            groq_model: "llama-3.3-70b-versatile".to_string(),
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load from a TOML file. A missing file yields the defaults; a present
    /// but malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: display,
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if self.candle_limit < 2 {
            return Err(ConfigError::Invalid(
                "candle_limit must be at least 2".into(),
            ));
        }
        if self.analysis_interval_secs == 0 || self.monitor_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "analysis and monitor intervals must be positive".into(),
            ));
        }
        if self.min_advisory_score > 100 {
            return Err(ConfigError::Invalid(
                "min_advisory_score must be at most 100".into(),
            ));
        }
        if !(self.starting_balance > 0.0) {
            return Err(ConfigError::Invalid(
                "starting_balance must be positive".into(),
            ));
        }
        if self.candle_limit < self.signal.min_candles {
            return Err(ConfigError::Invalid(format!(
                "candle_limit {} is below signal.min_candles {}; every cycle would be neutral",
                self.candle_limit, self.signal.min_candles
            )));
        }
        Ok(())
    }
}

/// Secrets read from the environment. All optional at this level; the
/// caller decides which ones its mode of operation requires.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub groq_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            telegram_token: read_env("TG_TOKEN"),
            telegram_chat_id: read_env("TG_CHAT_ID"),
            groq_api_key: read_env("GROQ_API_KEY"),
        }
    }
}

fn read_env(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}
