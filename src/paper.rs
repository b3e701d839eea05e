//! Paper order execution
//!
//! Acknowledges every order locally without touching the exchange.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::exchange::OrderExecutor;
use crate::{OrderAck, Side};

#[derive(Debug, Default)]
pub struct PaperExecutor {
    next_id: AtomicU64,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders acknowledged so far
    pub fn order_count(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderExecutor for PaperExecutor {
    async fn submit_market_order(&self, symbol: &str, side: Side, quantity: f64) -> Result<OrderAck> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order_id = format!("paper-{}", id);
        info!("[PAPER] {} {} qty={} | Order ID: {}", side, symbol, quantity, order_id);
        Ok(OrderAck { order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_paper_orders_get_sequential_ids() {
        let exec = PaperExecutor::new();
        let a = exec.submit_market_order("BTCUSDT", Side::Buy, 0.001).await.unwrap();
        let b = exec.submit_market_order("BTCUSDT", Side::Sell, 0.001).await.unwrap();

        assert_eq!(a.order_id, "paper-1");
        assert_eq!(b.order_id, "paper-2");
        assert_eq!(exec.order_count(), 2);
    }
}
