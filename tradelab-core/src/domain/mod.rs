//! Domain types shared by the engine and the risk manager.

pub mod bar;
pub mod equity;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use equity::EquityPoint;
pub use position::OpenPosition;
pub use trade::{Trade, TradeSide};

/// Symbol type alias
pub type Symbol = String;
