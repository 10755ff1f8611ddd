//! Binance market data feed.
//!
//! Fetches OHLCV klines and the latest traded price from the public REST
//! API (no authentication). Kline rows arrive as heterogeneous JSON arrays
//! with prices encoded as strings; error responses are JSON objects with a
//! numeric `code` and a `msg`.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sniper_core::domain::Candle;
use sniper_core::sources::{MarketDataSource, PriceSource, SourceError};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

pub struct BinanceFeed {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BinanceFeed {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?;
        let status = resp.status();
        let body: Value = resp
            .json()
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;

        // Binance reports API errors as {"code": ..., "msg": ...}, sometimes
        // with a 200 status.
        if let Some(err) = api_error(&body) {
            return Err(err);
        }
        if !status.is_success() {
            return Err(SourceError::ProviderRejected(format!("HTTP {status}")));
        }
        Ok(body)
    }
}

impl Default for BinanceFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataSource for BinanceFeed {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        count: usize,
    ) -> Result<Vec<Candle>, SourceError> {
        let url = format!(
            "{}/api/v3/klines?symbol={symbol}&interval={interval}&limit={count}",
            self.base_url
        );
        tracing::debug!(symbol, interval, count, "fetching klines");
        let body = self.get_json(&url)?;
        parse_klines(&body)
    }
}

impl PriceSource for BinanceFeed {
    fn fetch_price(&self, symbol: &str) -> Result<f64, SourceError> {
        let url = format!("{}/api/v3/ticker/price?symbol={symbol}", self.base_url);
        let body = self.get_json(&url)?;
        parse_ticker_price(&body)
    }
}

fn api_error(body: &Value) -> Option<SourceError> {
    let obj = body.as_object()?;
    let code = obj.get("code")?.as_i64()?;
    let msg = obj
        .get("msg")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    Some(SourceError::ProviderRejected(format!("code {code}: {msg}")))
}

/// Parse a klines response: an array of rows
/// `[open_time_ms, "open", "high", "low", "close", "volume", ...]`.
/// Rows must be strictly time-ascending.
pub fn parse_klines(body: &Value) -> Result<Vec<Candle>, SourceError> {
    let rows = body
        .as_array()
        .ok_or_else(|| SourceError::ResponseFormatChanged("klines is not an array".into()))?;

    let mut candles: Vec<Candle> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let fields = row.as_array().ok_or_else(|| {
            SourceError::ResponseFormatChanged(format!("kline {i} is not an array"))
        })?;
        if fields.len() < 6 {
            return Err(SourceError::ResponseFormatChanged(format!(
                "kline {i} has {} fields, expected at least 6",
                fields.len()
            )));
        }

        let open_time_ms = fields[0].as_i64().ok_or_else(|| {
            SourceError::ResponseFormatChanged(format!("kline {i} open time is not an integer"))
        })?;
        let timestamp = DateTime::<Utc>::from_timestamp_millis(open_time_ms).ok_or_else(|| {
            SourceError::ResponseFormatChanged(format!("kline {i} open time out of range"))
        })?;

        let candle = Candle {
            timestamp,
            open: string_price(&fields[1], i, "open")?,
            high: string_price(&fields[2], i, "high")?,
            low: string_price(&fields[3], i, "low")?,
            close: string_price(&fields[4], i, "close")?,
            volume: string_price(&fields[5], i, "volume")?,
        };

        if let Some(prev) = candles.last() {
            if candle.timestamp <= prev.timestamp {
                return Err(SourceError::ResponseFormatChanged(format!(
                    "kline {i} is not time-ascending"
                )));
            }
        }
        candles.push(candle);
    }

    if candles.is_empty() {
        return Err(SourceError::ResponseFormatChanged("no klines returned".into()));
    }
    Ok(candles)
}

/// Parse a `/ticker/price` response: `{"symbol": ..., "price": "65000.00"}`.
pub fn parse_ticker_price(body: &Value) -> Result<f64, SourceError> {
    body.get("price")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| SourceError::ResponseFormatChanged("ticker has no usable price".into()))
}

fn string_price(field: &Value, index: usize, name: &str) -> Result<f64, SourceError> {
    field
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            SourceError::ResponseFormatChanged(format!(
                "kline {index} field {name} is not a numeric string"
            ))
        })
}
