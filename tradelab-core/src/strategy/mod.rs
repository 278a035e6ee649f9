//! Strategy contract and the bundled strategies.
//!
//! A strategy is a stateful object fed a growing bar history and asked for
//! one decision per bar. Strategies never touch cash or positions; sizing
//! and gating belong to the risk manager, execution to the engine.

pub mod grid;
pub mod ma_crossover;
pub mod rsi_reversion;

pub use grid::GridTrading;
pub use ma_crossover::{MaCrossover, MaType};
pub use rsi_reversion::RsiReversion;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Bar;

/// Trading intent for the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Long,
    Short,
    Close,
    Hold,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Signal::Long => "long",
            Signal::Short => "short",
            Signal::Close => "close",
            Signal::Hold => "hold",
        };
        f.write_str(s)
    }
}

/// A signal with conviction and free-form diagnostics.
///
/// `strength` scales position sizing and is clamped to [0, 1] by the risk
/// manager. `info` carries strategy-specific values (indicator readings,
/// trigger descriptions) for logs and artifacts; nothing downstream
/// branches on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDecision {
    pub signal: Signal,
    pub strength: f64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub info: Map<String, Value>,
}

impl SignalDecision {
    pub fn new(signal: Signal, strength: f64) -> Self {
        Self {
            signal,
            strength,
            info: Map::new(),
        }
    }

    pub fn hold() -> Self {
        Self::new(Signal::Hold, 0.0)
    }

    pub fn with_info(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.info.insert(key.to_string(), value.into());
        self
    }
}

/// A signal generator replayed over a bar series.
///
/// `generate_signal` takes `&mut self` so strategies can carry state across
/// bars (last crossover side, grid slots). The replay only calls it once
/// history reaches `min_history`, but implementations still guard their own
/// indexing.
pub trait Strategy {
    fn name(&self) -> &str;

    /// Bars required before the first meaningful decision.
    fn min_history(&self) -> usize;

    fn generate_signal(&mut self, history: &[Bar]) -> SignalDecision;
}
