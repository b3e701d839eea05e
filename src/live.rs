//! Live trading loop
//!
//! Two states: idle until the next tick, then one evaluation cycle
//! (fetch -> evaluate latest bar -> dispatch -> notify). A cycle always returns
//! to idle, including after a failed order; nothing is retried within a cycle.
//! At most one order is attempted per bar: the open time of the last bar that
//! reached dispatch is remembered and later cycles on that bar stand down.
//! Notifications run on their own tasks and never hold up a cycle.
//! Ticks and shutdown are injected so the loop can be driven without real time.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::exchange::{MarketData, OrderExecutor};
use crate::notify::Notifier;
use crate::strategies::{Evaluation, Strategy};
use crate::{Config, OrderAck, Side, Signal};

// =============================================================================
// Scheduling
// =============================================================================

/// Source of cycle triggers
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick. `false` means the source is exhausted.
    async fn tick(&mut self) -> bool;
}

/// Fixed wall-clock cadence. The first tick fires immediately.
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

/// Fires a fixed number of ticks back to back
#[derive(Debug, Clone)]
pub struct CountedTicks {
    remaining: usize,
}

impl CountedTicks {
    pub fn new(count: usize) -> Self {
        Self { remaining: count }
    }
}

#[async_trait]
impl TickSource for CountedTicks {
    async fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Triggers shutdown of a running loop
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

/// Shutdown listener handed to the loop
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is triggered. Pends forever if every handle is dropped.
    pub async fn wait(&mut self) {
        loop {
            let triggered = *self.rx.borrow_and_update();
            if triggered {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn shutdown_channel() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, Shutdown { rx })
}

// =============================================================================
// Trader
// =============================================================================

/// What happened to the order for a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// No signal, nothing sent
    None,
    Submitted(OrderAck),
    Failed(String),
}

/// Result of one evaluation cycle
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub bar_time: DateTime<Utc>,
    pub evaluation: Evaluation,
    pub dispatch: Dispatch,
}

impl CycleOutcome {
    pub fn signal(&self) -> Signal {
        self.evaluation.signal
    }
}

pub struct LiveTrader {
    symbol: String,
    interval: String,
    qty: f64,
    bar_limit: usize,
    display_tz: Tz,
    strategy: Box<dyn Strategy>,
    market: Arc<dyn MarketData>,
    executor: Arc<dyn OrderExecutor>,
    notifier: Arc<dyn Notifier>,
    cycle_count: u64,
    /// Open time of the last bar an order was attempted for
    last_dispatched: Option<DateTime<Utc>>,
    pending_notifications: Vec<JoinHandle<()>>,
}

impl LiveTrader {
    pub fn new(
        config: &Config,
        strategy: Box<dyn Strategy>,
        market: Arc<dyn MarketData>,
        executor: Arc<dyn OrderExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let display_tz: Tz = config
            .live
            .display_tz
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid display_tz '{}': {}", config.live.display_tz, e))?;

        Ok(LiveTrader {
            symbol: config.strategy.symbol.clone(),
            interval: config.strategy.interval.clone(),
            qty: config.strategy.qty,
            bar_limit: config.live.bar_limit,
            display_tz,
            strategy,
            market,
            executor,
            notifier,
            cycle_count: 0,
            last_dispatched: None,
            pending_notifications: Vec::new(),
        })
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn last_dispatched(&self) -> Option<DateTime<Utc>> {
        self.last_dispatched
    }

    /// Wait for every notification still in flight
    pub async fn flush_notifications(&mut self) {
        for handle in self.pending_notifications.drain(..) {
            if let Err(e) = handle.await {
                warn!("Notification task failed: {}", e);
            }
        }
    }

    /// Bar time rendered in the display time zone, without offset
    pub fn local_time(&self, t: DateTime<Utc>) -> String {
        t.with_timezone(&self.display_tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// Fetch and evaluate the latest bar without dispatching anything
    pub async fn evaluate_once(&self) -> Result<(DateTime<Utc>, Evaluation)> {
        let candles = self
            .market
            .get_bars(&self.symbol, &self.interval, self.bar_limit)
            .await
            .with_context(|| format!("Failed to fetch bars for {}", self.symbol))?;

        debug!("Fetched {} bars for {} {}", candles.len(), self.symbol, self.interval);

        let evaluation = self
            .strategy
            .evaluate_latest(&candles)
            .with_context(|| format!("{} evaluation failed", self.strategy.name()))?;
        let bar_time = candles[evaluation.index].datetime;
        Ok((bar_time, evaluation))
    }

    /// One full cycle: fetch, evaluate, dispatch at most one order
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        self.cycle_count += 1;
        let cycle = self.cycle_count;

        let (bar_time, evaluation) = self.evaluate_once().await?;
        let local = self.local_time(bar_time);

        if let Some(levels) = evaluation.levels {
            debug!(
                close = evaluation.close,
                atr = evaluation.atr,
                ema = evaluation.ema,
                upper = levels.upper,
                lower = levels.lower,
                raw = %evaluation.raw,
                "Cycle {} indicators",
                cycle
            );
        }

        let dispatch = match evaluation.signal.side() {
            Some(_) if self.last_dispatched == Some(bar_time) => {
                info!(
                    "Signal: {} at {} already handled for this bar, skipping",
                    evaluation.signal, local
                );
                Dispatch::None
            }
            Some(side) => {
                info!("Signal: {} at {}", evaluation.signal, local);
                self.last_dispatched = Some(bar_time);
                self.dispatch(side, evaluation.signal, &local).await
            }
            None => {
                info!("No signal at {}", local);
                Dispatch::None
            }
        };

        Ok(CycleOutcome {
            cycle,
            bar_time,
            evaluation,
            dispatch,
        })
    }

    async fn dispatch(&mut self, side: Side, signal: Signal, local: &str) -> Dispatch {
        let result = self
            .executor
            .submit_market_order(&self.symbol, side, self.qty)
            .await;

        match result {
            Ok(ack) => {
                info!("Order executed: {} {} {}", ack.order_id, signal, self.qty);
                let subject = format!("Order executed: {} {}", side, self.symbol);
                let body = format!(
                    "Signal {} at {}\n{} {} qty={} | Order ID: {}",
                    signal, local, side, self.symbol, self.qty, ack.order_id
                );
                self.notify(subject, body);
                Dispatch::Submitted(ack)
            }
            Err(e) => {
                error!("Order failed: {:#}", e);
                let subject = format!("Order failed: {} {}", side, self.symbol);
                let body = format!(
                    "Signal {} at {}\n{} {} qty={} failed: {:#}",
                    signal, local, side, self.symbol, self.qty, e
                );
                self.notify(subject, body);
                Dispatch::Failed(format!("{:#}", e))
            }
        }
    }

    fn notify(&mut self, subject: String, body: String) {
        self.pending_notifications.retain(|h| !h.is_finished());

        let notifier = Arc::clone(&self.notifier);
        self.pending_notifications.push(tokio::spawn(async move {
            if let Err(e) = notifier.send(&subject, &body).await {
                warn!("Notification failed: {:#}", e);
            }
        }));
    }

    /// Run cycles on every tick until shutdown or the tick source is exhausted.
    /// Returns the number of cycles attempted.
    pub async fn run<T: TickSource>(&mut self, ticks: &mut T, shutdown: &mut Shutdown) -> u64 {
        info!("Starting trading loop...");
        let mut attempted = 0;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    info!("Shutdown signal received");
                    break;
                }
                more = ticks.tick() => {
                    if !more {
                        break;
                    }
                    attempted += 1;
                    if let Err(e) = self.run_cycle().await {
                        error!("Trading cycle error: {:#}", e);
                    }
                }
            }
        }

        self.flush_notifications().await;
        info!("Trading loop stopped after {} cycles", attempted);
        attempted
    }
}
