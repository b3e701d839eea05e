//! Live Trading Command
//!
//! Wires the configured strategy, the Binance adapter (or the paper executor)
//! and the notifier into the live loop, and stops it on Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use breakout_trader::exchange::OrderExecutor;
use breakout_trader::live::{shutdown_channel, IntervalTicks, LiveTrader};
use breakout_trader::notify::{EmailNotifier, LogNotifier, Notifier};
use breakout_trader::paper::PaperExecutor;
use breakout_trader::strategies::three_bar_breakout::create_strategy_from_config;
use breakout_trader::{BinanceClient, Config};

pub fn run(config_path: String, paper: bool, live: bool, cycle_secs: Option<u64>) -> Result<()> {
    if !paper && !live {
        anyhow::bail!("Must specify either --paper or --live mode");
    }

    if live && paper {
        anyhow::bail!("Cannot specify both --paper and --live modes");
    }

    dotenv::dotenv().ok();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_async(config_path, paper, cycle_secs))
}

async fn run_async(config_path: String, paper_mode: bool, cycle_secs: Option<u64>) -> Result<()> {
    let mut config = Config::from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;
    if let Some(secs) = cycle_secs {
        config.live.cycle_secs = secs.max(1);
    }

    let strategy = create_strategy_from_config(&config).context("Failed to create strategy")?;
    let client = Arc::new(BinanceClient::new(&config.exchange)?);

    let executor: Arc<dyn OrderExecutor> = if paper_mode {
        Arc::new(PaperExecutor::new())
    } else {
        if !client.has_credentials() {
            anyhow::bail!("Live mode needs BINANCE_API_KEY and BINANCE_API_SECRET");
        }
        client.clone()
    };

    match client.ping().await {
        Ok(true) => info!("Exchange reachable: {}", client.base_url()),
        Ok(false) => warn!("Exchange ping returned an error status"),
        Err(e) => warn!("Exchange ping failed: {:#}", e),
    }

    let notifier: Arc<dyn Notifier> = match &config.notify {
        Some(notify) => Arc::new(EmailNotifier::new(notify).context("Invalid notify section")?),
        None => Arc::new(LogNotifier),
    };

    let mode_str = if paper_mode { "PAPER" } else { "LIVE" };
    let s = &config.strategy;

    info!("==============================================================");
    info!("  BREAKOUT TRADER - {} MODE", mode_str);
    info!("--------------------------------------------------------------");
    info!("  Exchange:  {}", client.base_url());
    info!("  Symbol:    {} {}", s.symbol, s.interval);
    info!("  Quantity:  {}", s.qty);
    info!(
        "  Breakout:  lookback={} mult={} mode={} pattern={}",
        s.brk_lookback,
        s.brk_mult,
        s.brk_mode.as_str(),
        s.pattern_three_filter
    );
    info!("  Filters:   ema={} atr={} min_atr={}", s.ema_period, s.atr_period, s.min_atr);
    info!("  Cycle:     {} seconds", config.live.cycle_secs);
    info!("==============================================================");

    if !paper_mode && !config.exchange.testnet && config.exchange.base_url.is_none() {
        warn!("LIVE TRADING ON MAINNET - REAL MONEY AT RISK!");
        warn!("Press Ctrl+C within 10 seconds to abort...");

        for i in (1..=10).rev() {
            info!("Starting in {} seconds...", i);
            sleep(Duration::from_secs(1)).await;
        }
    }

    let mut trader = LiveTrader::new(&config, Box::new(strategy), client, executor, notifier)?;

    let (shutdown_handle, mut shutdown) = shutdown_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown...");
                shutdown_handle.trigger();
            }
            Err(e) => {
                error!("Error setting up signal handler: {}", e);
            }
        }
    });

    let mut ticks = IntervalTicks::new(Duration::from_secs(config.live.cycle_secs));
    trader.run(&mut ticks, &mut shutdown).await;

    info!("Live trading session ended.");
    Ok(())
}
