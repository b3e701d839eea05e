//! Exchange collaborator ports
//!
//! The live loop talks to the market only through these traits, so it can be
//! driven by the Binance adapter, the paper executor or test doubles.

use anyhow::Result;
use async_trait::async_trait;

use crate::{Candle, OrderAck, Side};

/// Source of OHLCV bars
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Up to `limit` bars, oldest first, most recent (possibly still forming) last
    async fn get_bars(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>>;
}

/// Market order submission
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn submit_market_order(&self, symbol: &str, side: Side, quantity: f64) -> Result<OrderAck>;
}
