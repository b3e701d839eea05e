//! Three-Bar Breakout Configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::binance::is_valid_interval;
use crate::indicators::DEFAULT_ATR_PERIOD;

/// Which bar prices are compared against the breakout levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BreakoutMode {
    /// Close must reach the level
    Close,
    /// Either the wick or the close may reach the level
    Either,
    /// High reaches the upper level, low reaches the lower level
    #[default]
    HighLow,
}

impl BreakoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakoutMode::Close => "close",
            BreakoutMode::Either => "either",
            BreakoutMode::HighLow => "high_low",
        }
    }
}

// Any unrecognised mode string means high/low.
impl From<String> for BreakoutMode {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "close" => BreakoutMode::Close,
            "either" => BreakoutMode::Either,
            _ => BreakoutMode::HighLow,
        }
    }
}

impl From<BreakoutMode> for String {
    fn from(mode: BreakoutMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Resolution when both breakout directions fire on the same bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Short is assigned last and overwrites long
    #[default]
    ShortWins,
    LongWins,
    /// Treat the ambiguous bar as no signal
    Flat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreeBarBreakoutConfig {
    /// Exchange pair (default: BTCUSDT)
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Bar interval requested from the exchange (default: 1m)
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Order quantity per signal (default: 0.001)
    #[serde(default = "default_qty")]
    pub qty: f64,

    /// Trend EMA period (default: 200)
    #[serde(default = "default_ema_period")]
    pub ema_period: usize,

    /// ATR period (default: 14)
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// Bars used for the rolling high/low range (default: 24)
    #[serde(default = "default_brk_lookback")]
    pub brk_lookback: usize,

    /// ATR multiple added beyond the range (default: 0.3)
    #[serde(default = "default_brk_mult")]
    pub brk_mult: f64,

    /// Price compared against the levels (default: close)
    #[serde(default = "default_brk_mode")]
    pub brk_mode: BreakoutMode,

    /// Require a matching three-bar reversal (default: true)
    #[serde(default = "default_true")]
    pub pattern_three_filter: bool,

    /// Skip bars whose ATR is below this; 0 disables (default: 5.0)
    #[serde(default = "default_min_atr")]
    pub min_atr: f64,

    #[serde(default)]
    pub tie_break: TieBreak,
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
fn default_interval() -> String {
    "1m".to_string()
}
fn default_qty() -> f64 {
    0.001
}
fn default_ema_period() -> usize {
    200
}
fn default_atr_period() -> usize {
    DEFAULT_ATR_PERIOD
}
fn default_brk_lookback() -> usize {
    24
}
fn default_brk_mult() -> f64 {
    0.3
}
fn default_brk_mode() -> BreakoutMode {
    BreakoutMode::Close
}
fn default_true() -> bool {
    true
}
fn default_min_atr() -> f64 {
    5.0
}

impl Default for ThreeBarBreakoutConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            interval: default_interval(),
            qty: default_qty(),
            ema_period: default_ema_period(),
            atr_period: default_atr_period(),
            brk_lookback: default_brk_lookback(),
            brk_mult: default_brk_mult(),
            brk_mode: default_brk_mode(),
            pattern_three_filter: true,
            min_atr: default_min_atr(),
            tie_break: TieBreak::default(),
        }
    }
}

impl ThreeBarBreakoutConfig {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            bail!("symbol must not be empty");
        }
        if !is_valid_interval(&self.interval) {
            bail!("unsupported interval '{}'", self.interval);
        }
        if !(self.qty.is_finite() && self.qty > 0.0) {
            bail!("qty must be positive, got {}", self.qty);
        }
        if self.ema_period == 0 {
            bail!("ema_period must be >= 1");
        }
        if self.atr_period == 0 {
            bail!("atr_period must be >= 1");
        }
        if self.brk_lookback < 2 {
            bail!("brk_lookback must be >= 2, got {}", self.brk_lookback);
        }
        if !(self.brk_mult.is_finite() && self.brk_mult >= 0.0) {
            bail!("brk_mult must be >= 0, got {}", self.brk_mult);
        }
        if !(self.min_atr.is_finite() && self.min_atr >= 0.0) {
            bail!("min_atr must be >= 0, got {}", self.min_atr);
        }
        Ok(())
    }

    /// First index the combiner may evaluate
    pub fn first_evaluable_index(&self) -> usize {
        self.brk_lookback.max(2)
    }

    /// Shortest window that covers the thresholds and the EMA warm-up
    pub fn min_bars(&self) -> usize {
        (self.first_evaluable_index() + 1).max(self.ema_period)
    }
}
