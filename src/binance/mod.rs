//! Binance spot API adapter
//! Implements the market-data and order-execution ports.

pub mod auth;
mod client;
mod types;

pub use client::{BinanceClient, BINANCE_API_BASE, BINANCE_TESTNET_BASE, MAX_KLINES_PER_REQUEST};
pub use types::*;
