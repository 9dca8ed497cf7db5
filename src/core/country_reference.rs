use crate::domain::model::{CountryRecord, RawCountry};
use crate::domain::ports::DataSource;
use crate::utils::error::{AtlasError, Result};
use std::collections::BTreeMap;

// 代表「沒有首都」的佔位值（區域彙總等）
const PLACEHOLDER_CAPITALS: &[&str] = &["", "-", "..", "n/a", "none", "null"];

#[derive(Debug, Clone)]
pub struct CountryReference {
    countries: BTreeMap<String, CountryRecord>,
}

impl CountryReference {
    pub async fn load<D: DataSource + ?Sized>(source: &D, excluded: &[String]) -> Result<Self> {
        let raw = source.list_countries().await?;
        if raw.is_empty() {
            return Err(AtlasError::data_source("country list is empty"));
        }
        Self::from_raw(raw, excluded)
    }

    // 過濾順序：首都佔位值 -> 排除名單 -> 欄位不完整
    pub fn from_raw(raw: Vec<RawCountry>, excluded: &[String]) -> Result<Self> {
        let total = raw.len();
        let mut countries = BTreeMap::new();
        let mut no_capital = 0usize;
        let mut excluded_count = 0usize;

        for country in raw {
            if !has_capital(country.capital_city.as_deref()) {
                no_capital += 1;
                continue;
            }
            if excluded.iter().any(|name| name == &country.name) {
                excluded_count += 1;
                continue;
            }

            let iso3_code = country.iso3_code.trim().to_uppercase();
            let country_name = country.name.trim().to_string();
            if iso3_code.len() != 3 || country_name.is_empty() {
                tracing::warn!("Skipping malformed country entry {:?}", country);
                continue;
            }
            if countries.contains_key(&iso3_code) {
                tracing::warn!("Duplicate ISO3 code {} ignored ({})", iso3_code, country_name);
                continue;
            }

            countries.insert(
                iso3_code.clone(),
                CountryRecord {
                    country_name,
                    iso3_code,
                },
            );
        }

        tracing::debug!(
            "Country reference: {} raw, {} without capital, {} excluded, {} kept",
            total,
            no_capital,
            excluded_count,
            countries.len()
        );

        if countries.is_empty() {
            return Err(AtlasError::config(
                "country reference is empty after filtering",
            ));
        }

        Ok(Self { countries })
    }

    pub fn get(&self, iso3_code: &str) -> Option<&CountryRecord> {
        self.countries.get(iso3_code)
    }

    pub fn contains(&self, iso3_code: &str) -> bool {
        self.countries.contains_key(iso3_code)
    }

    pub fn iso3_codes(&self) -> Vec<String> {
        self.countries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.countries.values()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

fn has_capital(capital: Option<&str>) -> bool {
    match capital {
        None => false,
        Some(city) => {
            let city = city.trim();
            !PLACEHOLDER_CAPITALS
                .iter()
                .any(|placeholder| city.eq_ignore_ascii_case(placeholder))
        }
    }
}
