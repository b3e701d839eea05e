//! Technical indicators
//!
//! Recursive smoothers used by the breakout engine. Every output series is
//! aligned index-for-index with its input and value `i` depends only on inputs
//! `0..=i`. Nothing is masked during warm-up: early values are low-confidence
//! and callers must tolerate that.

use ta::indicators::ExponentialMovingAverage;
use ta::Next;

/// Default ATR smoothing period
pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Calculate Exponential Moving Average (span-based)
///
/// Smoothing factor is `2 / (period + 1)`, seeded with the first value and
/// without bias adjustment.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return vec![];
    }

    let mut indicator = match ExponentialMovingAverage::new(period) {
        Ok(i) => i,
        Err(_) => return vec![],
    };

    values.iter().map(|&v| indicator.next(v)).collect()
}

/// Calculate True Range
///
/// Bar 0 has no previous close, so its range falls back to `high - low`.
/// Callers never rely on index 0 for a decision.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(high.len());

    for i in 0..high.len() {
        let tr_value = if i == 0 {
            high[i] - low[i]
        } else {
            let hl = high[i] - low[i];
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            hl.max(hc).max(lc)
        };
        tr.push(tr_value);
    }

    tr
}

/// Calculate Average True Range (ATR) using Wilder's smoothing
///
/// ATR = ATR_prev + (TR - ATR_prev) / period, seeded with the first TR.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    if high.is_empty() || period == 0 || high.len() != low.len() || high.len() != close.len() {
        return vec![];
    }

    let alpha = 1.0 / period as f64;
    let tr = true_range(high, low, close);
    let mut result = Vec::with_capacity(tr.len());
    let mut atr_value = tr[0];

    for (i, &value) in tr.iter().enumerate() {
        if i > 0 {
            atr_value = alpha * value + (1.0 - alpha) * atr_value;
        }
        result.push(atr_value);
    }

    result
}
