use crate::core::aggregation::aggregate;
use crate::core::cache::{entry_to_json, SessionCache};
use crate::core::catalog::IndicatorCatalog;
use crate::core::country_reference::CountryReference;
use crate::core::fetcher::IndicatorFetcher;
use crate::core::pipeline::IndicatorPipeline;
use crate::core::refresh::{RefreshEngine, RefreshOutcome};
use crate::core::render::MapFrame;
use crate::core::{ConfigProvider, DataSource};
use crate::domain::model::{AggregationResult, YearBounds};
use crate::utils::error::{AtlasError, Result};
use crate::utils::validation::Validate;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub struct Session<D: DataSource + 'static> {
    cache: Arc<SessionCache>,
    catalog: Arc<IndicatorCatalog>,
    reference: Arc<CountryReference>,
    bounds: YearBounds,
    refresh_interval: Duration,
    engine: Arc<RefreshEngine<IndicatorPipeline<D>>>,
}

impl<D: DataSource + 'static> Session<D> {
    /// 驗證配置後建立指標目錄並載入國家清單
    pub async fn bootstrap<C: ConfigProvider + Validate>(source: D, config: &C) -> Result<Self> {
        config.validate()?;
        let catalog = IndicatorCatalog::new(config.indicators())?;
        let reference = CountryReference::load(&source, config.excluded_countries()).await?;
        tracing::info!(
            "🌍 Loaded {} countries and {} indicators",
            reference.len(),
            catalog.len()
        );

        Ok(Self::new(
            source,
            reference,
            catalog,
            config.year_bounds(),
            config.refresh_interval(),
            config.skip_failed_indicators(),
        ))
    }

    pub fn new(
        source: D,
        reference: CountryReference,
        catalog: IndicatorCatalog,
        bounds: YearBounds,
        refresh_interval: Duration,
        skip_failed_indicators: bool,
    ) -> Self {
        let cache = Arc::new(SessionCache::new());
        let catalog = Arc::new(catalog);
        let reference = Arc::new(reference);

        let fetcher = IndicatorFetcher::new(source).skip_failed_indicators(skip_failed_indicators);
        let pipeline = IndicatorPipeline::new(
            fetcher,
            Arc::clone(&reference),
            Arc::clone(&catalog),
            bounds,
            Arc::clone(&cache),
        );

        Self {
            cache,
            catalog,
            reference,
            bounds,
            refresh_interval,
            engine: Arc::new(RefreshEngine::new(pipeline)),
        }
    }

    pub fn request_aggregation(
        &self,
        indicator_label: &str,
        year_low: i32,
        year_high: i32,
    ) -> Result<AggregationResult> {
        let indicator = self.catalog.resolve_label(indicator_label)?;
        self.check_bounds(year_low, year_high)?;
        let entry = self.cache.read().ok_or(AtlasError::EmptyCacheError)?;

        let result = aggregate(&entry.dataset, indicator, year_low, year_high);
        tracing::debug!(
            "Aggregated {} for {}..{}: {} countries",
            indicator,
            year_low,
            year_high,
            result.len()
        );
        Ok(result)
    }

    pub fn request_map(
        &self,
        indicator_label: &str,
        year_low: i32,
        year_high: i32,
    ) -> Result<MapFrame> {
        let result = self.request_aggregation(indicator_label, year_low, year_high)?;
        Ok(MapFrame::from_result(&result, &self.catalog))
    }

    pub fn request_freshness_label(&self) -> String {
        self.cache.freshness_label()
    }

    pub async fn refresh_now(&self) -> Result<RefreshOutcome> {
        self.engine.refresh().await
    }

    pub async fn run_refresh_loop<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        Arc::clone(&self.engine)
            .run_periodic(self.refresh_interval, shutdown)
            .await
    }

    pub fn snapshot_json(&self) -> Result<serde_json::Value> {
        let entry = self.cache.read().ok_or(AtlasError::EmptyCacheError)?;
        Ok(entry_to_json(&entry, &self.catalog))
    }

    pub fn end(&self) {
        self.cache.clear();
    }

    pub fn catalog(&self) -> &IndicatorCatalog {
        &self.catalog
    }

    pub fn reference(&self) -> &CountryReference {
        &self.reference
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    pub fn year_bounds(&self) -> YearBounds {
        self.bounds
    }

    fn check_bounds(&self, year_low: i32, year_high: i32) -> Result<()> {
        for year in [year_low, year_high] {
            if !self.bounds.contains(year) {
                return Err(AtlasError::invalid_range(
                    year_low,
                    year_high,
                    format!(
                        "{} is outside the available years {}-{}",
                        year, self.bounds.start, self.bounds.end
                    ),
                ));
            }
        }
        Ok(())
    }
}
