//! Structured events emitted by the replay loop.
//!
//! Core performs no logging of its own. Hosts inject an [`EventSink`] and
//! decide what to do with each event: the bundled runner logs them through
//! `tracing`, tests capture them with [`RecordingSink`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Trade;
use crate::risk::{BreakerReason, RiskReport};

/// Something noteworthy that happened during a replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    TradeExecuted {
        symbol: String,
        trade: Trade,
    },
    /// The risk manager denied an entry.
    RiskDenied {
        symbol: String,
        timestamp: NaiveDateTime,
        reason: String,
    },
    /// The engine rejected an entry for lack of cash.
    InsufficientFunds {
        symbol: String,
        timestamp: NaiveDateTime,
        required: f64,
        available: f64,
    },
    /// Rising edge of the circuit breaker.
    BreakerTripped {
        timestamp: NaiveDateTime,
        reason: BreakerReason,
    },
}

/// Receiver for replay events. Implementations must not assume wall-clock
/// ordering; timestamps are simulated time.
pub trait EventSink {
    fn on_event(&mut self, event: &EngineEvent);

    /// Called once per bar with the post-bar risk snapshot.
    fn on_risk_report(&mut self, _report: &RiskReport) {}
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &EngineEvent) {}
}

/// Captures events and reports for inspection, mainly in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<EngineEvent>,
    pub reports: Vec<RiskReport>,
}

impl EventSink for RecordingSink {
    fn on_event(&mut self, event: &EngineEvent) {
        self.events.push(event.clone());
    }

    fn on_risk_report(&mut self, report: &RiskReport) {
        self.reports.push(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn events_tag_by_kind() {
        let event = EngineEvent::BreakerTripped {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            reason: BreakerReason::ConsecutiveLosses { count: 3 },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"breaker_tripped\""));
        assert!(json.contains("\"count\":3"));
    }

    #[test]
    fn recording_sink_captures_in_order() {
        let mut sink = RecordingSink::default();
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        sink.on_event(&EngineEvent::RiskDenied {
            symbol: "BTC/USDT".into(),
            timestamp: ts,
            reason: "emergency stop engaged".into(),
        });
        sink.on_event(&EngineEvent::InsufficientFunds {
            symbol: "BTC/USDT".into(),
            timestamp: ts,
            required: 100.0,
            available: 50.0,
        });
        assert_eq!(sink.events.len(), 2);
        assert!(matches!(sink.events[0], EngineEvent::RiskDenied { .. }));
    }
}
