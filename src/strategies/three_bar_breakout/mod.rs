//! Three-Bar Breakout Strategy
//!
//! ATR-padded range breakout on short timeframes, gated by a minimum ATR and
//! optionally confirmed by a three-bar reversal pattern.

pub mod config;
pub mod pattern;
pub mod strategy;
pub mod thresholds;

pub use config::{BreakoutMode, ThreeBarBreakoutConfig, TieBreak};
pub use pattern::match_three_bar_pattern;
pub use strategy::{Indicators, ThreeBarBreakoutStrategy};
pub use thresholds::{breakout_levels_at, breakout_thresholds, BreakoutLevels};

use anyhow::Result;

use crate::Config;

/// Build the strategy from the `strategy` section of the config
pub fn create_strategy_from_config(config: &Config) -> Result<ThreeBarBreakoutStrategy> {
    config.strategy.validate()?;
    Ok(ThreeBarBreakoutStrategy::new(config.strategy.clone()))
}
