//! Breakout levels
//!
//! `upper(i) = max(high[i-lookback..i]) + mult * atr[i-1]`
//! `lower(i) = min(low[i-lookback..i]) - mult * atr[i-1]`
//!
//! Both the range and the ATR are shifted one bar back, so bar `i` never
//! contributes to its own levels. Indices below `lookback` are undefined.

use serde::Serialize;

/// Upper/lower breakout level pair for one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreakoutLevels {
    pub upper: f64,
    pub lower: f64,
}

/// Levels for a single index, `None` when `i < lookback` or out of range
pub fn breakout_levels_at(
    i: usize,
    high: &[f64],
    low: &[f64],
    atr: &[f64],
    lookback: usize,
    mult: f64,
) -> Option<BreakoutLevels> {
    if lookback == 0 || i < lookback || i >= high.len() || i >= low.len() || i > atr.len() {
        return None;
    }

    let start = i - lookback;
    let highest = high[start..i].iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = low[start..i].iter().copied().fold(f64::INFINITY, f64::min);
    let prev_atr = atr[i - 1];

    Some(BreakoutLevels {
        upper: highest + mult * prev_atr,
        lower: lowest - mult * prev_atr,
    })
}

/// Level series aligned with the input bars
pub fn breakout_thresholds(
    high: &[f64],
    low: &[f64],
    atr: &[f64],
    lookback: usize,
    mult: f64,
) -> Vec<Option<BreakoutLevels>> {
    (0..high.len())
        .map(|i| breakout_levels_at(i, high, low, atr, lookback, mult))
        .collect()
}
