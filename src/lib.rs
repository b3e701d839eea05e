//! Breakout Trader
//!
//! A signal engine that turns a rolling window of OHLC bars into a
//! long/short/none decision, and a live loop that places one market order per
//! signalled bar on Binance spot.
//!
//! The decision pipeline is pure:
//! bars -> indicators (EMA, ATR) -> breakout levels -> combiner -> signal.
//!
//! ```no_run
//! use breakout_trader::strategies::three_bar_breakout::{
//!     ThreeBarBreakoutConfig, ThreeBarBreakoutStrategy,
//! };
//! use breakout_trader::strategies::Strategy;
//! use breakout_trader::Candle;
//!
//! fn decide(candles: &[Candle]) -> anyhow::Result<()> {
//!     let strategy = ThreeBarBreakoutStrategy::new(ThreeBarBreakoutConfig::default());
//!     let eval = strategy.evaluate_latest(candles)?;
//!     println!("{} (close {:.2}, atr {:.2})", eval.signal, eval.close, eval.atr);
//!     Ok(())
//! }
//! ```

pub mod binance;
pub mod config;
pub mod error;
pub mod exchange;
pub mod indicators;
pub mod live;
pub mod notify;
pub mod paper;
pub mod strategies;
pub mod types;

pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use strategies::Strategy;
pub use types::*;

pub use binance::BinanceClient;
