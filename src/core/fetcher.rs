use crate::domain::model::{IndicatorId, RawObservation};
use crate::domain::ports::DataSource;
use crate::utils::error::{AtlasError, Result};

pub struct IndicatorFetcher<D: DataSource> {
    source: D,
    skip_failed_indicators: bool,
}

impl<D: DataSource> IndicatorFetcher<D> {
    pub fn new(source: D) -> Self {
        Self {
            source,
            skip_failed_indicators: false,
        }
    }

    /// 單一指標下載失敗時記錄並略過（全部失敗仍回傳錯誤）
    pub fn skip_failed_indicators(mut self, skip: bool) -> Self {
        self.skip_failed_indicators = skip;
        self
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub async fn fetch(
        &self,
        indicators: &[IndicatorId],
        countries: &[String],
        year_start: i32,
        year_end: i32,
    ) -> Result<Vec<RawObservation>> {
        if year_start > year_end {
            return Err(AtlasError::invalid_range(
                year_start,
                year_end,
                "start year is after end year",
            ));
        }

        let mut observations = Vec::new();
        let mut failures = 0usize;
        let mut last_error = None;

        for indicator in indicators {
            tracing::debug!(
                "Downloading {} for {} countries, {}..={}",
                indicator,
                countries.len(),
                year_start,
                year_end
            );

            match self
                .source
                .download_indicator(indicator, countries, year_start, year_end)
                .await
            {
                Ok(rows) => {
                    tracing::debug!("📥 {}: {} observations", indicator, rows.len());
                    observations.extend(rows.into_iter().filter(|o| {
                        // 來源偶爾回傳範圍外的年份
                        o.year
                            .trim()
                            .parse::<i32>()
                            .map_or(true, |y| (year_start..=year_end).contains(&y))
                    }));
                }
                Err(e) if self.skip_failed_indicators => {
                    tracing::warn!("⚠️ Skipping indicator {}: {}", indicator, e);
                    failures += 1;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        if !indicators.is_empty() && failures == indicators.len() {
            let reason = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no indicator could be downloaded".to_string());
            return Err(AtlasError::data_source(format!(
                "all {} indicators failed: {}",
                failures, reason
            )));
        }

        Ok(observations)
    }
}
