//! Account — the simulated balance, mutated only by trade settlement.

use serde::{Deserialize, Serialize};

/// Simulated account state. Lives for the duration of the process; the only
/// mutation path is [`Account::settle`], called by the trade tracker when a
/// trade reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    starting_balance: f64,
    balance: f64,
}

impl Account {
    pub fn new(starting_balance: f64) -> Self {
        assert!(
            starting_balance > 0.0,
            "starting balance must be positive"
        );
        Self {
            starting_balance,
            balance: starting_balance,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn starting_balance(&self) -> f64 {
        self.starting_balance
    }

    /// Percent growth since the starting balance, signed.
    pub fn growth_pct(&self) -> f64 {
        (self.balance - self.starting_balance) / self.starting_balance * 100.0
    }

    /// Apply a realized P&L percentage: balance *= 1 + pnl_pct/100.
    /// Returns the balance after settlement.
    pub fn settle(&mut self, pnl_pct: f64) -> f64 {
        self.balance *= 1.0 + pnl_pct / 100.0;
        self.balance
    }
}
