//! Circuit breaker for halting entries after risk violations.
//!
//! The breaker is a two-state machine. Once tripped it stays tripped until
//! an explicit reset; the daily rollover resets only daily-loss trips, so a
//! consecutive-loss trip survives into the next simulated day.

use serde::{Deserialize, Serialize};

/// Why the breaker tripped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BreakerReason {
    DailyLossLimit { loss_pct: f64 },
    ConsecutiveLosses { count: u32 },
}

impl std::fmt::Display for BreakerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreakerReason::DailyLossLimit { loss_pct } => {
                write!(f, "daily loss limit reached ({loss_pct:.2}%)")
            }
            BreakerReason::ConsecutiveLosses { count } => {
                write!(f, "{count} consecutive losing trades")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BreakerState {
    Armed,
    Tripped { reason: BreakerReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreaker {
    state: BreakerState,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self {
            state: BreakerState::Armed,
        }
    }

    /// Trip the breaker. A second trip while already tripped keeps the
    /// original reason.
    pub fn trip(&mut self, reason: BreakerReason) {
        if let BreakerState::Armed = self.state {
            self.state = BreakerState::Tripped { reason };
        }
    }

    pub fn reset(&mut self) {
        self.state = BreakerState::Armed;
    }

    /// Re-arm only if the trip was for the daily loss limit. Called at the
    /// simulated day rollover.
    pub fn reset_daily(&mut self) {
        if let BreakerState::Tripped {
            reason: BreakerReason::DailyLossLimit { .. },
        } = self.state
        {
            self.state = BreakerState::Armed;
        }
    }

    pub fn is_tripped(&self) -> bool {
        matches!(self.state, BreakerState::Tripped { .. })
    }

    pub fn reason(&self) -> Option<BreakerReason> {
        match self.state {
            BreakerState::Armed => None,
            BreakerState::Tripped { reason } => Some(reason),
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }
}
