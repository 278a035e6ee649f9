//! Trading monitor: an event sink that logs and counts.
//!
//! The monitor observes; it never influences the replay. Logging goes
//! through `tracing`, and the info-level trade alert rate limit is keyed on
//! simulated event timestamps so a replayed run logs the same alerts every
//! time.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use tradelab_core::domain::TradeSide;
use tradelab_core::events::{EngineEvent, EventSink};
use tradelab_core::risk::RiskReport;

use crate::config::MonitorConfig;

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSummary {
    pub trades_executed: u32,
    pub trade_alerts: u32,
    pub risk_denials: u32,
    pub insufficient_funds: u32,
    pub breaker_trips: u32,
}

#[derive(Debug)]
pub struct TradingMonitor {
    config: MonitorConfig,
    summary: MonitorSummary,
    last_trade_alert: Option<NaiveDateTime>,
    daily_loss_alerted: bool,
    streak_alerted: bool,
    last_report: Option<RiskReport>,
}

impl TradingMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            summary: MonitorSummary::default(),
            last_trade_alert: None,
            daily_loss_alerted: false,
            streak_alerted: false,
            last_report: None,
        }
    }

    pub fn summary(&self) -> MonitorSummary {
        self.summary
    }

    pub fn last_report(&self) -> Option<&RiskReport> {
        self.last_report.as_ref()
    }

    fn trade_alert_due(&self, at: NaiveDateTime) -> bool {
        match self.last_trade_alert {
            None => true,
            Some(last) => at - last >= Duration::seconds(self.config.info_alert_interval_secs),
        }
    }
}

impl EventSink for TradingMonitor {
    fn on_event(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::TradeExecuted { symbol, trade } => {
                self.summary.trades_executed += 1;
                if self.config.alert_on_trade && self.trade_alert_due(trade.timestamp) {
                    self.summary.trade_alerts += 1;
                    self.last_trade_alert = Some(trade.timestamp);
                    match trade.side {
                        TradeSide::Buy => tracing::info!(
                            symbol = %symbol,
                            price = trade.price,
                            quantity = trade.quantity,
                            fee = trade.fee,
                            "opened long position"
                        ),
                        TradeSide::Sell => tracing::info!(
                            symbol = %symbol,
                            price = trade.price,
                            quantity = trade.quantity,
                            pnl = trade.pnl.unwrap_or(0.0),
                            "closed position"
                        ),
                    }
                }
            }
            EngineEvent::RiskDenied {
                symbol,
                timestamp,
                reason,
            } => {
                self.summary.risk_denials += 1;
                tracing::warn!(
                    symbol = %symbol,
                    at = %timestamp,
                    reason = %reason,
                    "entry denied by risk manager"
                );
            }
            EngineEvent::InsufficientFunds {
                symbol,
                timestamp,
                required,
                available,
            } => {
                self.summary.insufficient_funds += 1;
                tracing::warn!(
                    symbol = %symbol,
                    at = %timestamp,
                    required,
                    available,
                    "entry skipped: insufficient funds"
                );
            }
            EngineEvent::BreakerTripped { timestamp, reason } => {
                self.summary.breaker_trips += 1;
                if self.config.alert_on_breaker {
                    tracing::error!(at = %timestamp, reason = %reason, "circuit breaker tripped");
                }
            }
        }
    }

    fn on_risk_report(&mut self, report: &RiskReport) {
        if report.daily_loss_pct >= self.config.daily_loss_alert_pct {
            if !self.daily_loss_alerted {
                self.daily_loss_alerted = true;
                tracing::warn!(
                    daily_loss_pct = report.daily_loss_pct,
                    "daily loss approaching limit"
                );
            }
        } else {
            self.daily_loss_alerted = false;
        }

        if report.consecutive_losses >= self.config.consecutive_loss_alert {
            if !self.streak_alerted {
                self.streak_alerted = true;
                tracing::warn!(
                    consecutive_losses = report.consecutive_losses,
                    "losing streak building"
                );
            }
        } else {
            self.streak_alerted = false;
        }

        self.last_report = Some(report.clone());
    }
}
