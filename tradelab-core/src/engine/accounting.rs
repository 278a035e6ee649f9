//! Cash-accounted trade execution.
//!
//! The engine is a two-state machine (flat or long) over a single symbol.
//! Entries debit cash for quantity at the slipped price plus commission;
//! exits credit the slipped proceeds net of commission and realize PnL
//! against the recorded entry cost including entry commission.

use chrono::NaiveDateTime;

use crate::domain::{Bar, EquityPoint, OpenPosition, Trade, TradeSide};
use crate::engine::metrics::{self, PerformanceMetrics};
use crate::strategy::Signal;

/// Outcome of offering a signal to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// A long position was opened; the recorded entry fill.
    Entered(Trade),
    /// The open position was closed; the recorded exit fill with realized PnL.
    Exited(Trade),
    /// A long signal arrived but cash could not cover cost plus fee.
    InsufficientFunds { required: f64, available: f64 },
    /// Signal did not change position state (hold, long-while-long,
    /// close-while-flat, short).
    NoOp,
}

/// Single-symbol, long-only execution and accounting state.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    initial_capital: f64,
    commission: f64,
    slippage: f64,
    cash: f64,
    position: Option<OpenPosition>,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
    closed_trades: u32,
    winning_trades: u32,
    losing_trades: u32,
}

impl BacktestEngine {
    /// Commission and slippage are fractional rates, e.g. `0.001` is 0.1%.
    pub fn new(initial_capital: f64, commission: f64, slippage: f64) -> Self {
        Self {
            initial_capital,
            commission,
            slippage,
            cash: initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            closed_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Completed round trips (exits), and their win/loss split.
    pub fn closed_trades(&self) -> u32 {
        self.closed_trades
    }

    pub fn winning_trades(&self) -> u32 {
        self.winning_trades
    }

    pub fn losing_trades(&self) -> u32 {
        self.losing_trades
    }

    /// Mark-to-market equity at the given price.
    pub fn equity_at(&self, price: f64) -> f64 {
        let position_value = self.position.map_or(0.0, |p| p.value_at(price));
        self.cash + position_value
    }

    /// Offer a signal at the given market price.
    ///
    /// Only two transitions move state: `Long` while flat opens a position,
    /// `Close` while long liquidates it. Everything else is a no-op. The
    /// caller decides `quantity` (typically via the risk manager); it is
    /// ignored on exits, which always liquidate the full position.
    pub fn execute(
        &mut self,
        timestamp: NaiveDateTime,
        signal: Signal,
        price: f64,
        quantity: f64,
    ) -> Execution {
        match (signal, self.position) {
            (Signal::Long, None) => self.open_long(timestamp, price, quantity),
            (Signal::Close, Some(pos)) => self.close_long(timestamp, price, pos),
            _ => Execution::NoOp,
        }
    }

    fn open_long(&mut self, timestamp: NaiveDateTime, price: f64, quantity: f64) -> Execution {
        if quantity <= 0.0 {
            return Execution::NoOp;
        }
        // Buys slip against us: fill above the quoted price.
        let exec_price = price * (1.0 + self.slippage);
        let cost = quantity * exec_price;
        let fee = cost * self.commission;
        let total_cost = cost + fee;

        if total_cost > self.cash {
            return Execution::InsufficientFunds {
                required: total_cost,
                available: self.cash,
            };
        }

        self.cash -= total_cost;
        self.position = Some(OpenPosition {
            quantity,
            entry_price: exec_price,
        });

        let trade = Trade {
            timestamp,
            side: TradeSide::Buy,
            price: exec_price,
            quantity,
            fee,
            cash_after: self.cash,
            pnl: None,
            pnl_pct: None,
        };
        self.trades.push(trade.clone());
        Execution::Entered(trade)
    }

    fn close_long(
        &mut self,
        timestamp: NaiveDateTime,
        price: f64,
        pos: OpenPosition,
    ) -> Execution {
        // Sells slip against us: fill below the quoted price.
        let exec_price = price * (1.0 - self.slippage);
        let gross = exec_price * pos.quantity;
        let fee = gross * self.commission;
        let net_revenue = gross - fee;

        // Entry cost includes the entry-side commission.
        let entry_cost = pos.entry_price * pos.quantity * (1.0 + self.commission);
        let pnl = net_revenue - entry_cost;
        let pnl_pct = pnl / (pos.entry_price * pos.quantity) * 100.0;

        self.cash += net_revenue;
        self.position = None;
        self.closed_trades += 1;
        if pnl > 0.0 {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }

        let trade = Trade {
            timestamp,
            side: TradeSide::Sell,
            price: exec_price,
            quantity: pos.quantity,
            fee,
            cash_after: self.cash,
            pnl: Some(pnl),
            pnl_pct: Some(pnl_pct),
        };
        self.trades.push(trade.clone());
        Execution::Exited(trade)
    }

    /// Record an equity sample at the bar's close and return it.
    pub fn update_equity(&mut self, bar: &Bar) -> EquityPoint {
        let position_value = self.position.map_or(0.0, |p| p.value_at(bar.close));
        let point = EquityPoint {
            timestamp: bar.timestamp,
            cash: self.cash,
            position_value,
            total_equity: self.cash + position_value,
        };
        self.equity_curve.push(point);
        point
    }

    /// Performance metrics over the run so far.
    ///
    /// `None` until the run has recorded at least one trade and one equity
    /// sample; there is nothing to summarize before that.
    pub fn performance(&self) -> Option<PerformanceMetrics> {
        if self.trades.is_empty() || self.equity_curve.is_empty() {
            return None;
        }
        Some(metrics::compute(
            self.initial_capital,
            &self.trades,
            &self.equity_curve,
        ))
    }
}
