use crate::core::cache::{now_timestamp, SessionCache};
use crate::core::catalog::IndicatorCatalog;
use crate::core::country_reference::CountryReference;
use crate::core::fetcher::IndicatorFetcher;
use crate::core::merger;
use crate::core::{CacheEntry, DataSource, MergedDataset, Pipeline, RawObservation};
use crate::domain::model::{IndicatorId, YearBounds};
use crate::utils::error::Result;
use std::sync::Arc;

pub struct IndicatorPipeline<D: DataSource> {
    fetcher: IndicatorFetcher<D>,
    reference: Arc<CountryReference>,
    catalog: Arc<IndicatorCatalog>,
    bounds: YearBounds,
    cache: Arc<SessionCache>,
}

impl<D: DataSource> IndicatorPipeline<D> {
    pub fn new(
        fetcher: IndicatorFetcher<D>,
        reference: Arc<CountryReference>,
        catalog: Arc<IndicatorCatalog>,
        bounds: YearBounds,
        cache: Arc<SessionCache>,
    ) -> Self {
        Self {
            fetcher,
            reference,
            catalog,
            bounds,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }
}

#[async_trait::async_trait]
impl<D: DataSource> Pipeline for IndicatorPipeline<D> {
    async fn extract(&self) -> Result<Vec<RawObservation>> {
        let indicators: Vec<IndicatorId> = self.catalog.ids().cloned().collect();
        let countries = self.reference.iso3_codes();

        tracing::debug!(
            "Fetching {} indicators for {} countries ({}-{})",
            indicators.len(),
            countries.len(),
            self.bounds.start,
            self.bounds.end
        );

        self.fetcher
            .fetch(&indicators, &countries, self.bounds.start, self.bounds.end)
            .await
    }

    async fn transform(&self, data: Vec<RawObservation>) -> Result<MergedDataset> {
        Ok(merger::merge(data, &self.reference, &self.catalog, self.bounds))
    }

    async fn load(&self, dataset: MergedDataset) -> Result<Arc<CacheEntry>> {
        let entry = self.cache.store(dataset, now_timestamp());
        tracing::debug!(
            "Cache updated: {} rows at {}",
            entry.dataset.len(),
            entry.fetched_at
        );
        Ok(entry)
    }
}
