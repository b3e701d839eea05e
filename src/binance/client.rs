//! Binance spot REST client
//!
//! Public klines for market data and signed market orders for execution.
//! Every request carries a timeout. There is deliberately no retry: a failed
//! order is reported to the caller and skipped for that cycle.
//!
//! # Example
//! ```no_run
//! use breakout_trader::binance::BinanceClient;
//! use breakout_trader::config::ExchangeConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BinanceClient::new(&ExchangeConfig::default())?;
//!     let candles = client.get_candles("BTCUSDT", "1m", 300).await?;
//!     println!("Fetched {} candles", candles.len());
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::auth::Credentials;
use super::types::{format_quantity, ApiErrorBody, BinanceKline, OrderResponse};
use crate::config::ExchangeConfig;
use crate::exchange::{MarketData, OrderExecutor};
use crate::{Candle, OrderAck, Side};

/// Base URL for the Binance spot API
pub const BINANCE_API_BASE: &str = "https://api.binance.com/api/v3";

/// Base URL for the Binance spot testnet
pub const BINANCE_TESTNET_BASE: &str = "https://testnet.binance.vision/api/v3";

/// Maximum klines per request (Binance limit)
pub const MAX_KLINES_PER_REQUEST: u32 = 1000;

/// Binance API client
#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
    recv_window_ms: u64,
}

impl BinanceClient {
    /// Create a client from the exchange section of the config
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = match &config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if config.testnet => BINANCE_TESTNET_BASE.to_string(),
            None => BINANCE_API_BASE.to_string(),
        };

        let credentials = match (&config.api_key, &config.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some(Credentials::new(key.clone(), secret.clone()))
            }
            _ => None,
        };

        Ok(BinanceClient {
            client,
            base_url,
            credentials,
            recv_window_ms: config.recv_window_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether signed endpoints can be used
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Fetch the most recent `limit` klines (max 1000)
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<BinanceKline>> {
        let url = format!("{}/klines", self.base_url);
        let limit = limit.clamp(1, MAX_KLINES_PER_REQUEST);

        debug!(
            "Fetching klines: symbol={}, interval={}, limit={}",
            symbol, interval, limit
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to Binance")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Binance API error {}: {}", status, body);
        }

        let raw_data: Vec<Vec<serde_json::Value>> = response
            .json()
            .await
            .context("Failed to parse Binance response")?;

        raw_data
            .iter()
            .map(|row| {
                BinanceKline::from_raw(row).ok_or_else(|| anyhow!("Malformed kline row: {:?}", row))
            })
            .collect()
    }

    /// Fetch klines as validated candles, oldest first
    pub async fn get_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let limit = u32::try_from(limit).unwrap_or(MAX_KLINES_PER_REQUEST);
        let mut klines = self.get_klines(symbol, interval, limit).await?;
        klines.sort_by_key(|k| k.open_time);
        klines.dedup_by_key(|k| k.open_time);
        klines.iter().map(BinanceKline::to_candle).collect()
    }

    /// Submit a signed MARKET order
    pub async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: f64,
    ) -> Result<OrderResponse> {
        let credentials = self
            .credentials
            .as_ref()
            .context("API key and secret are required to place orders")?;

        let query = format!(
            "symbol={}&side={}&type=MARKET&quantity={}&newOrderRespType=ACK&recvWindow={}&timestamp={}",
            symbol,
            side.as_str(),
            format_quantity(quantity),
            self.recv_window_ms,
            Utc::now().timestamp_millis()
        );
        let signature = credentials.sign(&query);
        let url = format!("{}/order?{}&signature={}", self.base_url, query, signature);

        debug!("Placing market order: {} {} {}", side, quantity, symbol);

        let response = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", credentials.api_key())
            .send()
            .await
            .context("Failed to send order to Binance")?;

        let status = response.status();
        let text = response.text().await.context("Failed to read order response")?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ApiErrorBody>(&text) {
                bail!("Order rejected ({}): code {} {}", status, err.code, err.msg);
            }
            bail!("Binance API error {}: {}", status, text);
        }

        let order: OrderResponse =
            serde_json::from_str(&text).context("Failed to parse order response")?;

        info!(
            "Order accepted: id={} {} {} {}",
            order.order_id, side, quantity, order.symbol
        );
        Ok(order)
    }

    /// Check server connectivity
    pub async fn ping(&self) -> Result<bool> {
        let url = format!("{}/ping", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    async fn get_bars(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        self.get_candles(symbol, interval, limit).await
    }
}

#[async_trait]
impl OrderExecutor for BinanceClient {
    async fn submit_market_order(&self, symbol: &str, side: Side, quantity: f64) -> Result<OrderAck> {
        let order = self.place_market_order(symbol, side, quantity).await?;
        Ok(OrderAck {
            order_id: order.order_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_selection() {
        let client = BinanceClient::new(&ExchangeConfig::default()).unwrap();
        assert_eq!(client.base_url(), BINANCE_TESTNET_BASE);
        assert!(!client.has_credentials());

        let config = ExchangeConfig {
            testnet: false,
            ..Default::default()
        };
        let client = BinanceClient::new(&config).unwrap();
        assert_eq!(client.base_url(), BINANCE_API_BASE);

        let config = ExchangeConfig {
            base_url: Some("http://localhost:9000/".to_string()),
            api_key: Some("k".to_string()),
            api_secret: Some("s".to_string()),
            ..Default::default()
        };
        let client = BinanceClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
        assert!(client.has_credentials());
    }

    #[tokio::test]
    async fn test_order_requires_credentials() {
        let client = BinanceClient::new(&ExchangeConfig::default()).unwrap();
        let err = client
            .place_market_order("BTCUSDT", Side::Buy, 0.001)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("required"));
    }
}
