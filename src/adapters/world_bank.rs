use crate::config::AtlasConfig;
use crate::domain::model::{IndicatorId, RawCountry, RawObservation};
use crate::domain::ports::DataSource;
use crate::utils::error::{AtlasError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

// 每次請求最多帶 60 個國家代碼
const COUNTRIES_PER_REQUEST: usize = 60;

const MAX_PAGES: u32 = 500;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PER_PAGE: u32 = 1000;

pub struct WorldBankClient {
    client: Client,
    base_url: String,
    per_page: u32,
    max_pages: u32,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    id: String,
    name: String,
    #[serde(rename = "capitalCity")]
    capital_city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdValue {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ObservationRow {
    indicator: IdValue,
    #[serde(default)]
    countryiso3code: String,
    date: String,
    value: Option<f64>,
}

struct Page<T> {
    rows: Vec<T>,
    pages: u32,
}

impl WorldBankClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, DEFAULT_TIMEOUT, DEFAULT_PER_PAGE)
    }

    pub fn with_options(base_url: &str, timeout: Duration, per_page: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("indicator-atlas/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page: per_page.max(1),
            max_pages: MAX_PAGES,
        })
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn from_config(config: &AtlasConfig) -> Result<Self> {
        Self::with_options(
            &config.source.endpoint,
            config.request_timeout(),
            config.source.per_page,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // 逐頁讀取直到最後一頁
    async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        let mut page = 1u32;

        loop {
            let current = self.get_page::<T>(url, query, page).await?;
            rows.extend(current.rows);

            if page >= current.pages {
                break;
            }
            if page >= self.max_pages {
                // 不回傳截斷的資料，讓舊快取保持有效
                return Err(AtlasError::data_source(format!(
                    "{} reports {} pages, more than the limit of {}",
                    url, current.pages, self.max_pages
                )));
            }
            page += 1;
        }

        Ok(rows)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        page: u32,
    ) -> Result<Page<T>> {
        tracing::debug!("Making API request to: {} (page {})", url, page);

        let response = self
            .client
            .get(url)
            .query(&[("format", "json".to_string())])
            .query(&[("per_page", self.per_page.to_string())])
            .query(&[("page", page.to_string())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(AtlasError::data_source(format!(
                "HTTP {} from {}: {}",
                status,
                url,
                truncate(&body, 200)
            )));
        }

        let body: Value = response.json().await?;
        parse_envelope(body)
    }
}

#[async_trait]
impl DataSource for WorldBankClient {
    async fn list_countries(&self) -> Result<Vec<RawCountry>> {
        let url = format!("{}/country", self.base_url);
        let rows: Vec<CountryRow> = self.get_all(&url, &[]).await?;

        Ok(rows
            .into_iter()
            .map(|row| RawCountry {
                iso3_code: row.id,
                name: row.name,
                capital_city: row.capital_city,
            })
            .collect())
    }

    async fn download_indicator(
        &self,
        indicator: &IndicatorId,
        countries: &[String],
        year_start: i32,
        year_end: i32,
    ) -> Result<Vec<RawObservation>> {
        let mut observations = Vec::new();
        let date = format!("{}:{}", year_start, year_end);

        for chunk in countries.chunks(COUNTRIES_PER_REQUEST) {
            let url = format!(
                "{}/country/{}/indicator/{}",
                self.base_url,
                chunk.join(";"),
                indicator
            );
            let rows: Vec<ObservationRow> = self.get_all(&url, &[("date", date.clone())]).await?;

            observations.extend(rows.into_iter().map(|row| RawObservation {
                iso3_code: row.countryiso3code,
                indicator: IndicatorId::new(row.indicator.id),
                year: row.date,
                value: row.value,
            }));
        }

        Ok(observations)
    }
}

fn parse_envelope<T: DeserializeOwned>(body: Value) -> Result<Page<T>> {
    let mut parts = match body {
        Value::Array(parts) => parts,
        other => {
            if let Some(message) = error_message(&other) {
                return Err(AtlasError::data_source(message));
            }
            return Err(AtlasError::data_source(format!(
                "unexpected response shape: {}",
                truncate(&other.to_string(), 200)
            )));
        }
    };

    if let Some(message) = parts.first().and_then(error_message) {
        return Err(AtlasError::data_source(message));
    }
    if parts.len() < 2 {
        return Err(AtlasError::data_source("response envelope has no data element"));
    }

    let rows_value = parts.swap_remove(1);
    let pages = parts
        .first()
        .and_then(|meta| meta.get("pages"))
        .and_then(lenient_u32)
        .unwrap_or(1);

    let rows = match rows_value {
        Value::Null => Vec::new(),
        value => serde_json::from_value(value).map_err(|e| {
            AtlasError::data_source(format!("malformed rows in response: {}", e))
        })?,
    };

    Ok(Page { rows, pages })
}

// API 錯誤格式: [{"message": [{"id", "key", "value"}]}]，通常搭配 HTTP 200
fn error_message(value: &Value) -> Option<String> {
    let messages = value.get("message")?.as_array()?;
    let text: Vec<String> = messages
        .iter()
        .map(|m| {
            let key = m.get("key").and_then(Value::as_str).unwrap_or("error");
            let detail = m.get("value").and_then(Value::as_str).unwrap_or("");
            format!("{}: {}", key, detail.trim())
        })
        .collect();
    Some(text.join("; "))
}

// pages 欄位可能是數字或字串
fn lenient_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
