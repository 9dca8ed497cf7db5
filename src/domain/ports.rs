use crate::domain::model::{
    CacheEntry, IndicatorDefinition, IndicatorId, MergedDataset, RawCountry, RawObservation,
    YearBounds,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

// 外部統計資料來源，不做重試
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn list_countries(&self) -> Result<Vec<RawCountry>>;

    async fn download_indicator(
        &self,
        indicator: &IndicatorId,
        countries: &[String],
        year_start: i32,
        year_end: i32,
    ) -> Result<Vec<RawObservation>>;
}

#[async_trait]
impl<D: DataSource + ?Sized> DataSource for Arc<D> {
    async fn list_countries(&self) -> Result<Vec<RawCountry>> {
        (**self).list_countries().await
    }

    async fn download_indicator(
        &self,
        indicator: &IndicatorId,
        countries: &[String],
        year_start: i32,
        year_end: i32,
    ) -> Result<Vec<RawObservation>> {
        (**self)
            .download_indicator(indicator, countries, year_start, year_end)
            .await
    }
}

pub trait ConfigProvider: Send + Sync {
    fn indicators(&self) -> Vec<IndicatorDefinition>;
    fn year_bounds(&self) -> YearBounds;
    fn refresh_interval(&self) -> Duration;
    fn excluded_countries(&self) -> &[String];
    fn skip_failed_indicators(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawObservation>>;
    async fn transform(&self, data: Vec<RawObservation>) -> Result<MergedDataset>;
    async fn load(&self, dataset: MergedDataset) -> Result<Arc<CacheEntry>>;
}
