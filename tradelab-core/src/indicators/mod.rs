//! Full-series indicator kernels.
//!
//! Each function maps a close series to an output of the same length,
//! filling the warmup region with NaN so indices stay aligned with the
//! input bars.

pub mod ema;
pub mod rsi;
pub mod sma;
pub mod wma;

pub use ema::ema;
pub use rsi::rsi;
pub use sma::sma;
pub use wma::wma;
