//! Sniper Bot — the runtime around the core engine.
//!
//! Implements the collaborator traits against real services (Binance
//! market data, Groq advisory scoring, Telegram delivery), formats the
//! outbound reports, and hosts the scheduler threads plus the liveness
//! HTTP endpoint.

pub mod binance;
pub mod config;
pub mod engine;
pub mod groq;
pub mod health;
pub mod report;
pub mod telegram;
