use crate::domain::currency::ConversionTable;
use crate::domain::ports::{RateLookup, RateSource, RateSourceRef};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// The current conversion table, shared by all balance reads.
///
/// Readers only ever take the read lock. `refresh` fetches before locking, so
/// the write lock is held just long enough to swap the table.
#[derive(Debug, Default)]
pub struct RateCache {
    table: RwLock<ConversionTable>,
}

impl RateCache {
    /// Creates a cache that only knows the base currency.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: ConversionTable) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }

    pub async fn get(&self, currency: &str) -> Result<Decimal> {
        self.table
            .read()
            .await
            .rate(currency)
            .ok_or_else(|| LedgerError::UnsupportedCurrency(currency.to_string()))
    }

    pub async fn replace(&self, table: ConversionTable) {
        *self.table.write().await = table;
    }

    /// Pulls a fresh table from `source` and swaps it in.
    ///
    /// On failure the previous table stays in place and the error is returned
    /// to whoever drives the refresh, never to readers.
    pub async fn refresh(&self, source: &dyn RateSource) -> Result<()> {
        let table = source.fetch().await?;
        let currencies = table.len();
        self.replace(table).await;
        tracing::info!(currencies, "conversion table refreshed");
        Ok(())
    }
}

#[async_trait]
impl RateLookup for RateCache {
    async fn rate(&self, currency: &str) -> Result<Decimal> {
        self.get(currency).await
    }
}

/// Periodically refreshes a `RateCache` from a `RateSource`.
pub struct RateRefresher {
    cache: Arc<RateCache>,
    source: RateSourceRef,
    period: Duration,
}

/// Handle to a running refresher.
pub struct RefresherHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl RateRefresher {
    pub fn new(cache: Arc<RateCache>, source: RateSourceRef, period: Duration) -> Self {
        Self {
            cache,
            source,
            period,
        }
    }

    /// Spawns the refresh loop.
    ///
    /// The first refresh happens one `period` from now; callers load the
    /// initial table themselves. The shutdown signal is only observed between
    /// refreshes, so an in-flight fetch always completes.
    pub fn start(self) -> RefresherHandle {
        let shutdown = Arc::new(Notify::new());
        let signal = shutdown.clone();

        let task = tokio::spawn(async move {
            tracing::info!(period_secs = self.period.as_secs(), "rate refresher started");
            let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = signal.notified() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.cache.refresh(self.source.as_ref()).await {
                            tracing::error!(error = %e, "could not refresh conversion table");
                        }
                    }
                }
            }

            tracing::info!("rate refresher stopped");
        });

        RefresherHandle { shutdown, task }
    }
}

impl RefresherHandle {
    /// Signals the loop and waits for it to exit.
    pub async fn stop(self) {
        // notify_one stores a permit, so a signal sent mid-refresh is not lost.
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "rate refresher task failed");
        }
    }
}
