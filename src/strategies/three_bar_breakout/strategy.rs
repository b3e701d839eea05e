//! Three-Bar Breakout Strategy
//!
//! Entry: bar breaks beyond the ATR-padded range of the prior `brk_lookback` bars
//! Filters: minimum ATR gate, optional three-bar reversal confirmation
//!
//! Decisions are pure functions of the bar window and the configuration.

use tracing::debug;

use super::config::{BreakoutMode, ThreeBarBreakoutConfig, TieBreak};
use super::pattern::match_three_bar_pattern;
use super::thresholds::{breakout_thresholds, BreakoutLevels};
use crate::error::{EngineError, EngineResult};
use crate::indicators::{atr, ema};
use crate::strategies::{Evaluation, Strategy};
use crate::{Candle, PriceSeries, Signal};

/// Indicator series aligned with a bar window
#[derive(Debug, Clone, Default)]
pub struct Indicators {
    pub ema: Vec<f64>,
    pub atr: Vec<f64>,
    pub levels: Vec<Option<BreakoutLevels>>,
}

impl Indicators {
    pub fn compute(series: &PriceSeries, config: &ThreeBarBreakoutConfig) -> EngineResult<Self> {
        let n = series.len();
        if n == 0 {
            return Err(EngineError::InsufficientBars { needed: 1, got: 0 });
        }
        if series.open.len() != n || series.high.len() != n || series.low.len() != n {
            return Err(EngineError::LengthMismatch);
        }

        let ema = ema(&series.close, config.ema_period);
        let atr = atr(&series.high, &series.low, &series.close, config.atr_period);
        let levels = breakout_thresholds(
            &series.high,
            &series.low,
            &atr,
            config.brk_lookback,
            config.brk_mult,
        );

        Ok(Indicators { ema, atr, levels })
    }

    pub fn len(&self) -> usize {
        self.atr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atr.is_empty()
    }
}

pub struct ThreeBarBreakoutStrategy {
    config: ThreeBarBreakoutConfig,
}

impl ThreeBarBreakoutStrategy {
    pub fn new(config: ThreeBarBreakoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThreeBarBreakoutConfig {
        &self.config
    }

    /// Breakout direction at `i` before any filtering
    pub fn raw_breakout(&self, i: usize, series: &PriceSeries, levels: BreakoutLevels) -> Signal {
        let (hi, lo, cl) = (series.high[i], series.low[i], series.close[i]);
        let BreakoutLevels { upper, lower } = levels;

        let (long_hit, short_hit) = match self.config.brk_mode {
            BreakoutMode::Close => (cl >= upper, cl <= lower),
            BreakoutMode::Either => (hi >= upper || cl >= upper, lo <= lower || cl <= lower),
            BreakoutMode::HighLow => (hi >= upper, lo <= lower),
        };

        match (long_hit, short_hit) {
            (true, true) => {
                debug!(index = i, upper, lower, "Both breakout directions hit");
                match self.config.tie_break {
                    TieBreak::ShortWins => Signal::Short,
                    TieBreak::LongWins => Signal::Long,
                    TieBreak::Flat => Signal::Flat,
                }
            }
            (true, false) => Signal::Long,
            (false, true) => Signal::Short,
            (false, false) => Signal::Flat,
        }
    }

    /// Final decision for bar `i`
    ///
    /// Order: volatility gate, breakout test, pattern confirmation.
    pub fn evaluate(
        &self,
        i: usize,
        series: &PriceSeries,
        indicators: &Indicators,
    ) -> EngineResult<Signal> {
        Ok(self.evaluate_detailed(i, series, indicators)?.signal)
    }

    fn evaluate_detailed(
        &self,
        i: usize,
        series: &PriceSeries,
        indicators: &Indicators,
    ) -> EngineResult<Evaluation> {
        let n = series.len();
        if series.open.len() != n
            || series.high.len() != n
            || series.low.len() != n
            || indicators.atr.len() != n
            || indicators.ema.len() != n
            || indicators.levels.len() != n
        {
            return Err(EngineError::LengthMismatch);
        }
        if i >= n {
            return Err(EngineError::IndexOutOfRange { index: i, len: n });
        }
        let min = self.config.first_evaluable_index();
        if i < min {
            return Err(EngineError::IndexBelowWarmup { index: i, min });
        }
        let levels = indicators.levels[i].ok_or(EngineError::IndexBelowWarmup { index: i, min })?;

        let mut eval = Evaluation {
            index: i,
            signal: Signal::Flat,
            raw: Signal::Flat,
            pattern: None,
            close: series.close[i],
            atr: indicators.atr[i],
            ema: indicators.ema[i],
            levels: Some(levels),
        };

        if self.config.min_atr > 0.0 && eval.atr < self.config.min_atr {
            debug!(
                index = i,
                atr = eval.atr,
                min_atr = self.config.min_atr,
                "ATR below minimum, skipping"
            );
            return Ok(eval);
        }

        eval.raw = self.raw_breakout(i, series, levels);
        eval.signal = eval.raw;

        if self.config.pattern_three_filter {
            let pattern = match_three_bar_pattern(i, &series.open, &series.close)
                .unwrap_or(Signal::Flat);
            eval.pattern = Some(pattern);
            if pattern != eval.raw {
                eval.signal = Signal::Flat;
            }
        }

        Ok(eval)
    }
}

impl Strategy for ThreeBarBreakoutStrategy {
    fn name(&self) -> &'static str {
        "three_bar_breakout"
    }

    fn min_bars(&self) -> usize {
        self.config.min_bars()
    }

    fn evaluate_at(&self, candles: &[Candle], index: usize) -> EngineResult<Evaluation> {
        let needed = self.min_bars();
        if candles.len() < needed {
            return Err(EngineError::InsufficientBars {
                needed,
                got: candles.len(),
            });
        }

        let series = PriceSeries::from_candles(candles);
        let indicators = Indicators::compute(&series, &self.config)?;
        self.evaluate_detailed(index, &series, &indicators)
    }
}
