//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable support for API credentials and the SMTP password.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::strategies::three_bar_breakout::ThreeBarBreakoutConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub strategy: ThreeBarBreakoutConfig,
    #[serde(default)]
    pub live: LiveConfig,
    /// E-mail alerts (optional, log-only when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override secrets from the environment when present
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("BINANCE_API_KEY") {
            self.exchange.api_key = Some(api_key);
        }
        if let Ok(api_secret) = std::env::var("BINANCE_API_SECRET") {
            self.exchange.api_secret = Some(api_secret);
        }
        if let Some(notify) = self.notify.as_mut() {
            if let Ok(password) = std::env::var("SMTP_PASSWORD") {
                notify.password = Some(password);
            }
        }
        if let Ok(tz) = std::env::var("TZ") {
            self.apply_display_tz(&tz);
        }
    }

    /// Use `tz` as the display zone if it names an IANA zone.
    /// POSIX forms such as `:/etc/localtime` are ignored.
    pub fn apply_display_tz(&mut self, tz: &str) {
        let tz = tz.trim();
        if tz.is_empty() {
            return;
        }
        match tz.parse::<chrono_tz::Tz>() {
            Ok(_) => self.live.display_tz = tz.to_string(),
            Err(_) => warn!(
                "Ignoring TZ={:?}, not an IANA zone name; keeping {}",
                tz, self.live.display_tz
            ),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy
            .validate()
            .context("Invalid strategy configuration")?;

        if self.live.cycle_secs == 0 {
            bail!("live.cycle_secs must be >= 1");
        }
        if self.live.bar_limit < self.strategy.min_bars() {
            bail!(
                "live.bar_limit ({}) is shorter than the {} bars the strategy needs",
                self.live.bar_limit,
                self.strategy.min_bars()
            );
        }
        if self.live.bar_limit > crate::binance::MAX_KLINES_PER_REQUEST as usize {
            bail!(
                "live.bar_limit ({}) exceeds the exchange maximum of {}",
                self.live.bar_limit,
                crate::binance::MAX_KLINES_PER_REQUEST
            );
        }
        self.live
            .display_tz
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid display_tz '{}': {}", self.live.display_tz, e))?;
        Ok(())
    }
}

/// Exchange configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    /// Use the spot testnet (default: true)
    #[serde(default = "default_testnet")]
    pub testnet: bool,
    /// Explicit REST base URL, overrides `testnet`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
}

fn default_testnet() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_recv_window_ms() -> u64 {
    5_000
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            api_key: None,
            api_secret: None,
            testnet: default_testnet(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
            recv_window_ms: default_recv_window_ms(),
        }
    }
}

/// Live loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Seconds between evaluation cycles (default: 60)
    #[serde(default = "default_cycle_secs")]
    pub cycle_secs: u64,
    /// Bars fetched per cycle (default: 300)
    #[serde(default = "default_bar_limit")]
    pub bar_limit: usize,
    /// Time zone used when logging bar times (default: Asia/Shanghai)
    #[serde(default = "default_display_tz")]
    pub display_tz: String,
}

fn default_cycle_secs() -> u64 {
    60
}
fn default_bar_limit() -> usize {
    300
}
fn default_display_tz() -> String {
    "Asia/Shanghai".to_string()
}

impl Default for LiveConfig {
    fn default() -> Self {
        LiveConfig {
            cycle_secs: default_cycle_secs(),
            bar_limit: default_bar_limit(),
            display_tz: default_display_tz(),
        }
    }
}

/// SMTP notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub sender: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    pub receiver: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default = "default_receiver_name")]
    pub receiver_name: String,
}

fn default_smtp_port() -> u16 {
    465
}
fn default_sender_name() -> String {
    "Trading Bot".to_string()
}
fn default_receiver_name() -> String {
    "Trader".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::three_bar_breakout::BreakoutMode;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.exchange.testnet);
        assert_eq!(config.live.cycle_secs, 60);
        assert_eq!(config.live.bar_limit, 300);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "exchange": { "testnet": false, "timeout_secs": 10 },
            "strategy": {
                "symbol": "ETHUSDT",
                "interval": "5m",
                "qty": 0.01,
                "ema_period": 100,
                "brk_lookback": 20,
                "brk_mult": 0.5,
                "brk_mode": "either",
                "pattern_three_filter": false,
                "min_atr": 1.5
            },
            "live": { "cycle_secs": 30, "bar_limit": 150, "display_tz": "UTC" },
            "notify": {
                "smtp_server": "smtp.example.com",
                "sender": "bot@example.com",
                "receiver": "me@example.com"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(!config.exchange.testnet);
        assert_eq!(config.strategy.symbol, "ETHUSDT");
        assert_eq!(config.strategy.brk_mode, BreakoutMode::Either);
        assert!(!config.strategy.pattern_three_filter);
        let notify = config.notify.as_ref().unwrap();
        assert_eq!(notify.port, 465);
        assert_eq!(notify.sender_name, "Trading Bot");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bar_limit_must_cover_warmup() {
        let mut config = Config::default();
        config.live.bar_limit = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_time_zone() {
        let mut config = Config::default();
        config.live.display_tz = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_tz_override_ignores_posix_values() {
        let mut config = Config::default();
        config.apply_display_tz(":/etc/localtime");
        assert_eq!(config.live.display_tz, "Asia/Shanghai");
        config.apply_display_tz("  ");
        assert_eq!(config.live.display_tz, "Asia/Shanghai");
        assert!(config.validate().is_ok());

        config.apply_display_tz("Europe/London");
        assert_eq!(config.live.display_tz, "Europe/London");
    }

    #[test]
    fn test_password_is_never_serialized() {
        let mut config = Config::default();
        config.notify = Some(NotifyConfig {
            smtp_server: "smtp.example.com".to_string(),
            port: 465,
            sender: "bot@example.com".to_string(),
            password: Some("hunter2".to_string()),
            receiver: "me@example.com".to_string(),
            sender_name: default_sender_name(),
            receiver_name: default_receiver_name(),
        });
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
