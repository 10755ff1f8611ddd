//! Cooldown gate — rate-limits accepted signals.
//!
//! Tracks the timestamp of the last accepted signal. A fresh qualifying
//! signal inside the cooldown window is suppressed (reported distinctly from
//! "no signal") unless the caller forces the evaluation, e.g. a manual
//! `/analyse` command.

use chrono::{DateTime, Duration, Utc};

/// Outcome of checking the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accepted,
    Suppressed { remaining: Duration },
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateDecision::Accepted)
    }
}

/// Rate limiter over accepted signals. A zero window disables the gate.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    window: Duration,
    last_accepted: Option<DateTime<Utc>>,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Check whether a signal at `now` may be accepted. `force` bypasses the
    /// window without clearing it.
    pub fn check(&self, now: DateTime<Utc>, force: bool) -> GateDecision {
        if force || self.window.is_zero() {
            return GateDecision::Accepted;
        }
        match self.last_accepted {
            Some(last) => {
                let elapsed = now - last;
                if elapsed < self.window {
                    GateDecision::Suppressed {
                        remaining: self.window - elapsed,
                    }
                } else {
                    GateDecision::Accepted
                }
            }
            None => GateDecision::Accepted,
        }
    }

    /// Record an accepted signal at `now`.
    pub fn arm(&mut self, now: DateTime<Utc>) {
        self.last_accepted = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn first_signal_is_accepted() {
        let gate = CooldownGate::new(Duration::minutes(30));
        assert!(gate.check(ts(0), false).is_accepted());
    }

    #[test]
    fn second_signal_inside_window_is_suppressed() {
        let mut gate = CooldownGate::new(Duration::minutes(30));
        gate.arm(ts(0));
        let decision = gate.check(ts(10), false);
        match decision {
            GateDecision::Suppressed { remaining } => {
                assert_eq!(remaining, Duration::minutes(20));
            }
            GateDecision::Accepted => panic!("expected suppression"),
        }
    }

    #[test]
    fn signal_after_window_is_accepted() {
        let mut gate = CooldownGate::new(Duration::minutes(30));
        gate.arm(ts(0));
        assert!(gate.check(ts(30), false).is_accepted());
        assert!(gate.check(ts(45), false).is_accepted());
    }

    #[test]
    fn force_bypasses_window() {
        let mut gate = CooldownGate::new(Duration::minutes(30));
        gate.arm(ts(0));
        assert!(gate.check(ts(1), true).is_accepted());
        // Forcing does not clear the window for non-forced checks
        assert!(!gate.check(ts(1), false).is_accepted());
    }

    #[test]
    fn zero_window_disables_gate() {
        let mut gate = CooldownGate::new(Duration::zero());
        gate.arm(ts(0));
        assert!(gate.check(ts(0), false).is_accepted());
    }
}
