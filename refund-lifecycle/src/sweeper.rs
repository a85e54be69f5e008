//! Background task expiring overdue reviews.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::book::CaseBook;

/// Configuration for the expiration sweep.
#[derive(Debug, Clone, Copy)]
pub struct SweeperConfig {
    interval: Duration,
}

impl SweeperConfig {
    /// Creates a configuration polling every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn interval(self) -> Duration {
        self.interval
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SweeperError::InvalidConfig`] when the interval is zero.
    pub fn validate(self) -> SweeperResult<()> {
        if self.interval.is_zero() {
            return Err(SweeperError::InvalidConfig(
                "sweep interval must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Errors produced by the sweeper.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SweeperError {
    /// Sweeper configuration was invalid.
    #[error("invalid sweeper configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Result alias for sweeper operations.
pub type SweeperResult<T> = Result<T, SweeperError>;

/// Periodically expires overdue reviews in a [`CaseBook`].
///
/// The poll interval only bounds how late an expiration is applied; which
/// cases are due is decided by the book's clock.
pub struct ExpirationSweeper {
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    config: SweeperConfig,
}

impl fmt::Debug for ExpirationSweeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpirationSweeper")
            .field("config", &self.config)
            .field("shutdown", &self.shutdown.load(Ordering::Relaxed))
            .field("worker", &self.worker.is_some())
            .finish()
    }
}

impl ExpirationSweeper {
    /// Spawns the sweep loop on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SweeperError::InvalidConfig`] when the configuration is invalid.
    pub fn spawn(book: Arc<CaseBook>, config: SweeperConfig) -> SweeperResult<Self> {
        config.validate()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = tokio::spawn(run_sweep_loop(book, Arc::clone(&shutdown), config));
        info!(interval = ?config.interval(), "expiration sweeper started");

        Ok(Self {
            shutdown,
            worker: Some(worker),
            config,
        })
    }

    /// Returns the associated configuration.
    #[must_use]
    pub const fn config(&self) -> SweeperConfig {
        self.config
    }

    /// Returns `true` once shutdown has been requested.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Stops the loop and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            handle.abort();
            let _ = handle.await;
        }
        info!("expiration sweeper stopped");
    }
}

impl Drop for ExpirationSweeper {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            handle.abort();
        }
    }
}

async fn run_sweep_loop(book: Arc<CaseBook>, shutdown: Arc<AtomicBool>, config: SweeperConfig) {
    let mut interval = tokio::time::interval(config.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !shutdown.load(Ordering::Acquire) {
        interval.tick().await;
        if shutdown.load(Ordering::Acquire) {
            break;
        }

        let expired = book.sweep_expired();
        if !expired.is_empty() {
            debug!(count = expired.len(), "sweep expired refunds");
        }
    }
}
