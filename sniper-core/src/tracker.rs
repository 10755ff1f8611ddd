//! Trade tracker — the single-position paper-trade state machine.
//!
//! At most one trade is OPEN at any time. A trade transitions exactly once,
//! OPEN → WIN or OPEN → LOSS, when live price crosses its target or stop.
//! When price has gapped through both levels in one tick, the stop wins: a
//! realistic fill would have hit the stop first.

use crate::domain::{Account, Direction, Signal, Trade, TradeStatus, Verdict};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("a trade is already open (id {open_id}); single-position policy")]
    PositionOpen { open_id: u64 },

    #[error("cannot open a trade from a neutral signal")]
    NotDirectional,
}

/// Owns the open trade, the closed-trade history, and the simulated account.
/// All mutation goes through [`TradeTracker::open_trade`] and
/// [`TradeTracker::tick`]; callers serialize access through one lock.
#[derive(Debug)]
pub struct TradeTracker {
    next_id: u64,
    open: Option<Trade>,
    history: Vec<Trade>,
    account: Account,
}

impl TradeTracker {
    pub fn new(starting_balance: f64) -> Self {
        Self {
            next_id: 1,
            open: None,
            history: Vec::new(),
            account: Account::new(starting_balance),
        }
    }

    pub fn open_trade(
        &mut self,
        signal: &Signal,
        now: DateTime<Utc>,
    ) -> Result<&Trade, TrackerError> {
        if let Some(open) = &self.open {
            return Err(TrackerError::PositionOpen { open_id: open.id });
        }

        let direction = match signal.verdict {
            Verdict::Long => Direction::Long,
            Verdict::Short => Direction::Short,
            Verdict::Neutral => return Err(TrackerError::NotDirectional),
        };

        let trade = Trade {
            id: self.next_id,
            direction,
            entry: signal.entry,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            opened_at: now,
            status: TradeStatus::Open,
            close_price: None,
            closed_at: None,
            pnl_pct: None,
            balance_after: None,
        };
        self.next_id += 1;
        Ok(self.open.insert(trade))
    }

    /// Check the open trade against the latest price. Returns the closed
    /// trade when a level was reached, None otherwise. Boundary hits close
    /// (price exactly at target is a WIN, exactly at stop a LOSS); the stop
    /// takes precedence when both levels were gapped through.
    pub fn tick(&mut self, price: f64, now: DateTime<Utc>) -> Option<Trade> {
        let trade = self.open.as_ref()?;

        let (stop_hit, target_hit) = match trade.direction {
            Direction::Long => (price <= trade.stop_loss, price >= trade.take_profit),
            Direction::Short => (price >= trade.stop_loss, price <= trade.take_profit),
        };

        let status = if stop_hit {
            TradeStatus::Loss
        } else if target_hit {
            TradeStatus::Win
        } else {
            return None;
        };

        let mut trade = self.open.take().expect("open trade checked above");
        // Settle at the level that was crossed, not the raw tick price
        let close_price = match status {
            TradeStatus::Loss => trade.stop_loss,
            TradeStatus::Win => trade.take_profit,
            TradeStatus::Open => unreachable!(),
        };
        let pnl_pct = trade.pnl_pct_at(close_price);
        let balance_after = self.account.settle(pnl_pct);

        trade.status = status;
        trade.close_price = Some(close_price);
        trade.closed_at = Some(now);
        trade.pnl_pct = Some(pnl_pct);
        trade.balance_after = Some(balance_after);

        self.history.push(trade.clone());
        Some(trade)
    }

    pub fn open_trade_view(&self) -> Option<&Trade> {
        self.open.as_ref()
    }

    pub fn has_open_trade(&self) -> bool {
        self.open.is_some()
    }

    pub fn history(&self) -> &[Trade] {
        &self.history
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}
