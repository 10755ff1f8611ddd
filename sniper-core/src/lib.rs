//! Sniper Core — indicator engine, tiered signal evaluator, risk levels,
//! and the single-position paper-trade tracker.
//!
//! This crate contains everything with real invariants:
//! - Candle domain types with validated, time-ascending series
//! - Causal indicators (RSI, EMA, ATR, ADX, volume MA) with the
//!   insufficient-history → neutral-default policy
//! - Ordered, mutually exclusive signal tiers (first match wins)
//! - Stop/target derivation from structural extremes and ATR
//! - Cooldown gate over accepted signals
//! - Trade tracker state machine (OPEN → WIN | LOSS, stop wins on gaps)
//! - Stats aggregation over closed trades
//!
//! Everything that talks to the network lives behind the traits in
//! [`sources`] and is implemented by the runtime crate.

pub mod cooldown;
pub mod domain;
pub mod indicators;
pub mod risk;
pub mod signal;
pub mod sources;
pub mod stats;
pub mod tracker;
