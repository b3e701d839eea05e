//! Binance API types for klines and spot orders

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;

use crate::Candle;

/// Binance kline/candlestick data
/// API returns an array: [open_time, open, high, low, close, volume, close_time,
///                        quote_volume, trades, taker_buy_base, taker_buy_quote, ignore]
#[derive(Debug, Clone)]
pub struct BinanceKline {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
}

impl BinanceKline {
    /// Parse from raw JSON array returned by Binance API
    pub fn from_raw(raw: &[serde_json::Value]) -> Option<Self> {
        if raw.len() < 7 {
            return None;
        }

        Some(BinanceKline {
            open_time: raw[0].as_i64()?,
            open: raw[1].as_str()?.parse().ok()?,
            high: raw[2].as_str()?.parse().ok()?,
            low: raw[3].as_str()?.parse().ok()?,
            close: raw[4].as_str()?.parse().ok()?,
            volume: raw[5].as_str()?.parse().ok()?,
            close_time: raw[6].as_i64()?,
        })
    }

    /// Convert to a validated candle stamped with the bar open time (UTC)
    pub fn to_candle(&self) -> Result<Candle> {
        let datetime = DateTime::from_timestamp_millis(self.open_time)
            .with_context(|| format!("Invalid kline open time {}", self.open_time))?;
        Candle::new(
            datetime,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
        .with_context(|| format!("Malformed kline at {}", self.open_time))
    }
}

/// Response of `POST /api/v3/order` (ACK/RESULT/FULL all carry these fields)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: i64,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub executed_qty: Option<String>,
}

/// Error body returned by Binance on rejected requests
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

/// Valid Binance intervals
pub const BINANCE_INTERVALS: &[&str] = &[
    "1s", "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
    "1M",
];

/// Check if interval is valid for Binance
pub fn is_valid_interval(interval: &str) -> bool {
    BINANCE_INTERVALS.contains(&interval)
}

/// Render a quantity without float noise or trailing zeros
pub fn format_quantity(qty: f64) -> String {
    let s = format!("{:.8}", qty);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}
