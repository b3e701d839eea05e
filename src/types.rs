//! Core data types used across the trading system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for candle data
#[derive(Debug, Error)]
pub enum CandleValidationError {
    #[error("high ({high}) must be >= low ({low})")]
    HighLessThanLow { high: f64, low: f64 },

    #[error("volume ({0}) must be >= 0")]
    NegativeVolume(f64),

    #[error("open ({open}) must be between low ({low}) and high ({high})")]
    OpenOutOfRange { open: f64, low: f64, high: f64 },

    #[error("close ({close}) must be between low ({low}) and high ({high})")]
    CloseOutOfRange { close: f64, low: f64, high: f64 },

    #[error("prices must be finite and positive: open={open}, high={high}, low={low}, close={close}")]
    NonPositivePrice {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// OHLCV candlestick data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub datetime: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Create a new candle with validation
    pub fn new(
        datetime: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, CandleValidationError> {
        let candle = Self::new_unchecked(datetime, open, high, low, close, volume);
        candle.validate()?;
        Ok(candle)
    }

    /// Create a candle without validation (trusted sources, synthetic test data)
    pub fn new_unchecked(
        datetime: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            datetime,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn validate(&self) -> Result<(), CandleValidationError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(CandleValidationError::NonPositivePrice {
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }
        if self.high < self.low {
            return Err(CandleValidationError::HighLessThanLow {
                high: self.high,
                low: self.low,
            });
        }
        if self.volume < 0.0 {
            return Err(CandleValidationError::NegativeVolume(self.volume));
        }
        if self.open < self.low || self.open > self.high {
            return Err(CandleValidationError::OpenOutOfRange {
                open: self.open,
                low: self.low,
                high: self.high,
            });
        }
        if self.close < self.low || self.close > self.high {
            return Err(CandleValidationError::CloseOutOfRange {
                close: self.close,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Close above open
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close below open
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Column views over a candle window, aligned index-for-index with it
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl PriceSeries {
    pub fn from_candles(candles: &[Candle]) -> Self {
        PriceSeries {
            open: candles.iter().map(|c| c.open).collect(),
            high: candles.iter().map(|c| c.high).collect(),
            low: candles.iter().map(|c| c.low).collect(),
            close: candles.iter().map(|c| c.close).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Wire representation used by the exchange
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trading signal. `Flat` means no trade.
///
/// Also used as the three-bar pattern label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Short,
    Flat,
}

impl Signal {
    /// Order side for an actionable signal
    pub fn side(&self) -> Option<Side> {
        match self {
            Signal::Long => Some(Side::Buy),
            Signal::Short => Some(Side::Sell),
            Signal::Flat => None,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Signal::Long => "long",
            Signal::Short => "short",
            Signal::Flat => "none",
        };
        f.write_str(s)
    }
}

/// Exchange acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_validation() {
        let now = Utc::now();
        assert!(Candle::new(now, 100.0, 105.0, 95.0, 102.0, 10.0).is_ok());
        assert!(matches!(
            Candle::new(now, 100.0, 95.0, 105.0, 100.0, 10.0),
            Err(CandleValidationError::HighLessThanLow { .. })
        ));
        assert!(matches!(
            Candle::new(now, 100.0, 105.0, 95.0, 110.0, 10.0),
            Err(CandleValidationError::CloseOutOfRange { .. })
        ));
        assert!(matches!(
            Candle::new(now, 100.0, 105.0, 95.0, 100.0, -1.0),
            Err(CandleValidationError::NegativeVolume(_))
        ));
        assert!(Candle::new(now, f64::NAN, 105.0, 95.0, 100.0, 1.0).is_err());
    }

    #[test]
    fn test_signal_side_mapping() {
        assert_eq!(Signal::Long.side(), Some(Side::Buy));
        assert_eq!(Signal::Short.side(), Some(Side::Sell));
        assert_eq!(Signal::Flat.side(), None);
        assert_eq!(Side::Sell.as_str(), "SELL");
    }

    #[test]
    fn test_doji_is_neither() {
        let c = Candle::new_unchecked(Utc::now(), 10.0, 11.0, 9.0, 10.0, 0.0);
        assert!(!c.is_bullish());
        assert!(!c.is_bearish());
    }
}
