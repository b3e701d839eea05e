//! Trading Strategies Module
//!
//! The `Strategy` trait is the seam between the live loop and a decision
//! engine. Implementations are pure: the same window and index always give
//! the same evaluation.

pub mod three_bar_breakout;

use serde::Serialize;

use crate::error::EngineResult;
use crate::{Candle, Signal};
use three_bar_breakout::BreakoutLevels;

/// Decision for one bar plus the values that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub index: usize,
    pub signal: Signal,
    /// Breakout direction before pattern confirmation
    pub raw: Signal,
    /// Pattern label, `None` when the filter is disabled or the gate fired first
    pub pattern: Option<Signal>,
    pub close: f64,
    pub atr: f64,
    pub ema: f64,
    pub levels: Option<BreakoutLevels>,
}

/// Trading strategy trait
pub trait Strategy: Send + Sync {
    /// Strategy identifier
    fn name(&self) -> &'static str;

    /// Shortest candle window `evaluate_at` accepts
    fn min_bars(&self) -> usize;

    /// Evaluate the bar at `index` of `candles`
    fn evaluate_at(&self, candles: &[Candle], index: usize) -> EngineResult<Evaluation>;

    /// Evaluate the most recent bar of the window
    fn evaluate_latest(&self, candles: &[Candle]) -> EngineResult<Evaluation> {
        self.evaluate_at(candles, candles.len().saturating_sub(1))
    }
}
