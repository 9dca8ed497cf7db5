use crate::core::{CacheEntry, Pipeline};
use crate::utils::error::{AtlasError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Refreshed(Arc<CacheEntry>),
    Skipped,
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed(_))
    }
}

pub struct RefreshEngine<P: Pipeline> {
    pipeline: P,
    in_flight: Arc<Mutex<()>>,
}

impl<P: Pipeline> RefreshEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    // 失敗時不動快取
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let Ok(_permit) = Arc::clone(&self.in_flight).try_lock_owned() else {
            tracing::debug!("⏭️ Refresh already in progress, skipping tick");
            return Ok(RefreshOutcome::Skipped);
        };

        tracing::info!("🔄 Refreshing indicator data");

        let raw_data = self.pipeline.extract().await?;
        tracing::debug!("Extracted {} observations", raw_data.len());

        let dataset = self.pipeline.transform(raw_data).await?;
        tracing::debug!("Transformed into {} rows", dataset.len());

        let entry = self.pipeline.load(dataset).await?;
        tracing::info!(
            "✅ Refresh complete: {} rows, fetched at {}",
            entry.dataset.len(),
            entry.fetched_at
        );

        Ok(RefreshOutcome::Refreshed(entry))
    }

    pub async fn refresh_logged(&self) -> Option<Arc<CacheEntry>> {
        match self.refresh().await {
            Ok(RefreshOutcome::Refreshed(entry)) => Some(entry),
            Ok(RefreshOutcome::Skipped) => None,
            Err(e) => {
                tracing::error!(
                    "❌ Refresh failed, keeping previous data: {} (Category: {:?})",
                    e,
                    e.category()
                );
                None
            }
        }
    }
}

impl<P: Pipeline + 'static> RefreshEngine<P> {
    /// 每個 tick 觸發一次刷新，直到 `shutdown` 完成；第一個 tick 立即觸發
    pub async fn run_periodic<F>(
        self: Arc<Self>,
        interval: Duration,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if interval.is_zero() {
            return Err(AtlasError::config("refresh interval must be greater than zero"));
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Refresh loop stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if self.is_refreshing() {
                        tracing::debug!("⏭️ Previous refresh still running, tick coalesced");
                        continue;
                    }
                    let engine = Arc::clone(&self);
                    tokio::spawn(async move {
                        engine.refresh_logged().await;
                    });
                }
            }
        }
    }
}
