//! Risk manager: pre-trade gating, position sizing, and loss tracking.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Symbol;
use crate::risk::breaker::{BreakerReason, CircuitBreaker};
use crate::risk::config::RiskConfig;
use crate::risk::report::RiskReport;

/// Side of a tracked position, for stop/take-profit checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Long,
    Short,
}

/// A position as the risk manager sees it. Stop and take-profit levels are
/// fixed at insertion time from the entry price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPosition {
    pub quantity: f64,
    pub entry_price: f64,
    pub side: PositionSide,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// A sized order: how much to buy and what it is worth at the quoted price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub quantity: f64,
    pub notional: f64,
}

impl PositionSize {
    pub const ZERO: PositionSize = PositionSize {
        quantity: 0.0,
        notional: 0.0,
    };
}

/// Why an entry was denied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeDenied {
    #[error("risk manager not initialized")]
    NotInitialized,
    #[error("circuit breaker tripped: {0}")]
    CircuitBreaker(BreakerReason),
    #[error("emergency stop engaged")]
    EmergencyStop,
    #[error("balance {balance:.2} at or below minimum {minimum:.2}")]
    BalanceAtMinimum { balance: f64, minimum: f64 },
    #[error("daily loss {loss_pct:.2}% reached limit {limit_pct:.2}%")]
    DailyLossLimit { loss_pct: f64, limit_pct: f64 },
}

/// Gating state machine between strategy signals and the engine.
///
/// Balances and dates come from the replay, never from the wall clock:
/// `update_balance` is fed the account's mark-to-market value and the
/// current bar's date, and day rollover happens when that date advances.
#[derive(Debug, Clone)]
pub struct RiskManager {
    config: RiskConfig,
    initialized: bool,
    balance: f64,
    /// Mark-to-market account value; the exposure cap is measured on this.
    equity: f64,
    daily_start_balance: f64,
    /// Fractional loss since the daily start, clamped at zero.
    daily_loss: f64,
    /// Realized PnL recorded since the daily anchor.
    daily_pnl: f64,
    day: Option<NaiveDate>,
    consecutive_losses: u32,
    positions: HashMap<Symbol, TrackedPosition>,
    breaker: CircuitBreaker,
    emergency_stop: bool,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        let emergency_stop = config.emergency_stop;
        Self {
            config,
            initialized: false,
            balance: 0.0,
            equity: 0.0,
            daily_start_balance: 0.0,
            daily_loss: 0.0,
            daily_pnl: 0.0,
            day: None,
            consecutive_losses: 0,
            positions: HashMap::new(),
            breaker: CircuitBreaker::new(),
            emergency_stop,
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn set_emergency_stop(&mut self, engaged: bool) {
        self.emergency_stop = engaged;
    }

    /// Arm the manager with the starting balance. The daily anchor is pinned
    /// by the first `update_balance`, which also supplies the first date.
    pub fn initialize(&mut self, balance: f64) {
        self.initialized = true;
        self.balance = balance;
        self.equity = balance;
        self.daily_start_balance = balance;
        self.daily_loss = 0.0;
        self.daily_pnl = 0.0;
        self.day = None;
        self.consecutive_losses = 0;
        self.positions.clear();
        self.breaker.reset();
    }

    /// Gate an entry. Checks run in severity order; hitting the daily loss
    /// limit here trips the breaker, so later calls deny on the breaker arm.
    pub fn check_trade_allowed(&mut self) -> Result<(), TradeDenied> {
        if !self.initialized {
            return Err(TradeDenied::NotInitialized);
        }
        if let Some(reason) = self.breaker.reason() {
            return Err(TradeDenied::CircuitBreaker(reason));
        }
        if self.emergency_stop {
            return Err(TradeDenied::EmergencyStop);
        }
        if self.balance <= self.config.min_account_balance {
            return Err(TradeDenied::BalanceAtMinimum {
                balance: self.balance,
                minimum: self.config.min_account_balance,
            });
        }
        if self.daily_loss >= self.config.max_daily_loss {
            let loss_pct = self.daily_loss * 100.0;
            self.breaker
                .trip(BreakerReason::DailyLossLimit { loss_pct });
            return Err(TradeDenied::DailyLossLimit {
                loss_pct,
                limit_pct: self.config.max_daily_loss * 100.0,
            });
        }
        Ok(())
    }

    /// Size an entry at the quoted price.
    ///
    /// Notional is `balance * max_position_size * strength` (strength
    /// clamped to [0, 1]). Sizing short-circuits to zero when the manager is
    /// uninitialized, the breaker is tripped, the emergency stop is engaged,
    /// the balance sits at the minimum, the price is not positive, or open
    /// exposure already meets the equity cap.
    pub fn calculate_position_size(&self, price: f64, strength: f64) -> PositionSize {
        if !self.initialized
            || self.breaker.is_tripped()
            || self.emergency_stop
            || self.balance <= self.config.min_account_balance
            || !(price > 0.0)
        {
            return PositionSize::ZERO;
        }
        if self.current_exposure() >= self.config.max_total_exposure * self.equity {
            return PositionSize::ZERO;
        }
        let strength = strength.clamp(0.0, 1.0);
        let notional = self.balance * self.config.max_position_size * strength;
        if notional <= 0.0 {
            return PositionSize::ZERO;
        }
        PositionSize {
            quantity: notional / price,
            notional,
        }
    }

    /// Summed entry value of tracked positions.
    pub fn current_exposure(&self) -> f64 {
        self.positions
            .values()
            .map(|p| p.quantity * p.entry_price)
            .sum()
    }

    /// Exposure as a fraction of equity; zero on zero equity.
    pub fn exposure_fraction(&self) -> f64 {
        if self.equity > 0.0 {
            self.current_exposure() / self.equity
        } else {
            0.0
        }
    }

    /// Track an opened position, fixing its stop and take-profit levels
    /// from the entry price.
    pub fn add_position(&mut self, symbol: &str, quantity: f64, entry_price: f64, side: PositionSide) {
        self.positions.insert(
            symbol.to_string(),
            TrackedPosition {
                quantity,
                entry_price,
                side,
                stop_loss: self.calculate_stop_loss(entry_price, side),
                take_profit: self.calculate_take_profit(entry_price, side),
            },
        );
    }

    pub fn remove_position(&mut self, symbol: &str) -> Option<TrackedPosition> {
        self.positions.remove(symbol)
    }

    pub fn get_position(&self, symbol: &str) -> Option<&TrackedPosition> {
        self.positions.get(symbol)
    }

    pub fn open_positions(&self) -> usize {
        self.positions.len()
    }

    /// Record a realized trade result. Losses (pnl < 0) extend the streak;
    /// anything else resets it. Reaching the configured streak length trips
    /// the breaker.
    pub fn record_trade_result(&mut self, pnl: f64) {
        self.daily_pnl += pnl;
        if pnl < 0.0 {
            self.consecutive_losses += 1;
            if self.consecutive_losses >= self.config.max_consecutive_losses {
                self.breaker.trip(BreakerReason::ConsecutiveLosses {
                    count: self.consecutive_losses,
                });
            }
        } else {
            self.consecutive_losses = 0;
        }
    }

    /// Feed the current balance and equity, with the simulated date.
    ///
    /// The first call pins the daily anchor. When `as_of` moves past the
    /// pinned day the anchor resets to the current balance, the daily loss
    /// and pnl clear, and daily-loss breaker trips re-arm. The loss ratio
    /// is measured on the balance.
    pub fn update_balance(&mut self, balance: f64, equity: Option<f64>, as_of: NaiveDate) {
        if !self.initialized {
            return;
        }
        self.balance = balance;
        self.equity = equity.unwrap_or(balance);

        match self.day {
            None => {
                self.day = Some(as_of);
                self.daily_start_balance = balance;
            }
            Some(day) if as_of > day => {
                self.day = Some(as_of);
                self.daily_start_balance = balance;
                self.daily_loss = 0.0;
                self.daily_pnl = 0.0;
                self.breaker.reset_daily();
                return;
            }
            Some(_) => {}
        }

        self.daily_loss = if self.daily_start_balance > 0.0 {
            ((self.daily_start_balance - balance) / self.daily_start_balance).max(0.0)
        } else {
            0.0
        };
    }

    /// Daily loss since the anchor, in percent.
    pub fn daily_loss_pct(&self) -> f64 {
        self.daily_loss * 100.0
    }

    /// Realized PnL recorded since the daily anchor.
    pub fn daily_pnl(&self) -> f64 {
        self.daily_pnl
    }

    /// Stop level for an entry at the given price.
    pub fn calculate_stop_loss(&self, entry_price: f64, side: PositionSide) -> f64 {
        match side {
            PositionSide::Long => entry_price * (1.0 - self.config.stop_loss_pct),
            PositionSide::Short => entry_price * (1.0 + self.config.stop_loss_pct),
        }
    }

    /// Take-profit level for an entry at the given price.
    pub fn calculate_take_profit(&self, entry_price: f64, side: PositionSide) -> f64 {
        match side {
            PositionSide::Long => entry_price * (1.0 + self.config.take_profit_pct),
            PositionSide::Short => entry_price * (1.0 - self.config.take_profit_pct),
        }
    }

    /// True when price has moved against the entry to the stop level.
    pub fn check_stop_loss(&self, entry_price: f64, current_price: f64, side: PositionSide) -> bool {
        let stop = self.calculate_stop_loss(entry_price, side);
        match side {
            PositionSide::Long => current_price <= stop,
            PositionSide::Short => current_price >= stop,
        }
    }

    /// True when price has reached the take-profit level.
    pub fn check_take_profit(
        &self,
        entry_price: f64,
        current_price: f64,
        side: PositionSide,
    ) -> bool {
        let target = self.calculate_take_profit(entry_price, side);
        match side {
            PositionSide::Long => current_price >= target,
            PositionSide::Short => current_price <= target,
        }
    }

    /// Manual re-arm after operator review.
    pub fn reset_circuit_breaker(&mut self) {
        self.breaker.reset();
        self.consecutive_losses = 0;
    }

    pub fn report(&self) -> RiskReport {
        RiskReport {
            initialized: self.initialized,
            balance: self.balance,
            daily_start_balance: self.daily_start_balance,
            daily_loss_pct: self.daily_loss_pct(),
            daily_pnl: self.daily_pnl,
            consecutive_losses: self.consecutive_losses,
            open_positions: self.positions.len(),
            exposure_pct: self.exposure_fraction() * 100.0,
            circuit_breaker_tripped: self.breaker.is_tripped(),
            circuit_breaker_reason: self.breaker.reason().map(|r| r.to_string()),
            emergency_stop: self.emergency_stop,
        }
    }
}
