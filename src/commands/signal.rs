//! One-shot signal check
//!
//! Fetches one bar window, evaluates the latest bar and prints the decision.
//! Never places an order.

use anyhow::{Context, Result};
use std::sync::Arc;

use breakout_trader::live::LiveTrader;
use breakout_trader::notify::LogNotifier;
use breakout_trader::paper::PaperExecutor;
use breakout_trader::strategies::three_bar_breakout::create_strategy_from_config;
use breakout_trader::{BinanceClient, Config};

pub fn run(config_path: String, json: bool) -> Result<()> {
    dotenv::dotenv().ok();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_async(config_path, json))
}

async fn run_async(config_path: String, json: bool) -> Result<()> {
    let config = Config::from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;
    let strategy = create_strategy_from_config(&config)?;
    let client = Arc::new(BinanceClient::new(&config.exchange)?);

    let trader = LiveTrader::new(
        &config,
        Box::new(strategy),
        client,
        Arc::new(PaperExecutor::new()),
        Arc::new(LogNotifier),
    )?;

    let (bar_time, eval) = trader.evaluate_once().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&eval)?);
        return Ok(());
    }

    println!("Symbol:   {} {}", config.strategy.symbol, config.strategy.interval);
    println!("Bar:      {}", trader.local_time(bar_time));
    println!("Close:    {:.4}", eval.close);
    println!("ATR:      {:.4}", eval.atr);
    println!("EMA:      {:.4}", eval.ema);
    if let Some(levels) = eval.levels {
        println!("Upper:    {:.4}", levels.upper);
        println!("Lower:    {:.4}", levels.lower);
    }
    println!("Breakout: {}", eval.raw);
    if let Some(pattern) = eval.pattern {
        println!("Pattern:  {}", pattern);
    }
    println!("Signal:   {}", eval.signal);
    Ok(())
}
