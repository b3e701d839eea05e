//! Three-bar reversal pattern
//!
//! Bull-bear-bull confirms a long, bear-bull-bear confirms a short.
//! A bar with close == open is neither bull nor bear.

use crate::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BarColor {
    Bull,
    Bear,
    Doji,
}

fn color(open: f64, close: f64) -> BarColor {
    if close > open {
        BarColor::Bull
    } else if close < open {
        BarColor::Bear
    } else {
        BarColor::Doji
    }
}

/// Classify bars `(i-2, i-1, i)`. Returns `None` when `i < 2` or out of range.
pub fn match_three_bar_pattern(i: usize, open: &[f64], close: &[f64]) -> Option<Signal> {
    if i < 2 || i >= open.len() || i >= close.len() {
        return None;
    }

    let shape = (
        color(open[i - 2], close[i - 2]),
        color(open[i - 1], close[i - 1]),
        color(open[i], close[i]),
    );

    let label = match shape {
        (BarColor::Bull, BarColor::Bear, BarColor::Bull) => Signal::Long,
        (BarColor::Bear, BarColor::Bull, BarColor::Bear) => Signal::Short,
        _ => Signal::Flat,
    };
    Some(label)
}
