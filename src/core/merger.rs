use crate::core::catalog::IndicatorCatalog;
use crate::core::country_reference::CountryReference;
use crate::domain::model::{MergedDataset, Observation, RawObservation, YearBounds};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub input: usize,
    pub bad_year: usize,
    pub unknown_country: usize,
    pub unknown_indicator: usize,
    pub rows: usize,
}

/// 以 ISO3 內連接國家清單，不認得的國家直接丟棄
pub fn merge(
    raw: Vec<RawObservation>,
    reference: &CountryReference,
    catalog: &IndicatorCatalog,
    bounds: YearBounds,
) -> MergedDataset {
    merge_with_stats(raw, reference, catalog, bounds).0
}

pub fn merge_with_stats(
    raw: Vec<RawObservation>,
    reference: &CountryReference,
    catalog: &IndicatorCatalog,
    bounds: YearBounds,
) -> (MergedDataset, MergeStats) {
    let mut stats = MergeStats {
        input: raw.len(),
        ..MergeStats::default()
    };
    let mut rows: BTreeMap<(String, i32), Observation> = BTreeMap::new();

    for observation in raw {
        let year = match normalize_year(&observation.year) {
            Some(year) if bounds.contains(year) => year,
            _ => {
                stats.bad_year += 1;
                continue;
            }
        };

        let iso3_code = observation.iso3_code.trim().to_uppercase();
        let Some(country) = reference.get(&iso3_code) else {
            stats.unknown_country += 1;
            continue;
        };

        if !catalog.contains(&observation.indicator) {
            stats.unknown_indicator += 1;
            continue;
        }

        let row = rows
            .entry((iso3_code.clone(), year))
            .or_insert_with(|| Observation {
                iso3_code,
                country_name: country.country_name.clone(),
                year,
                values: catalog.ids().map(|id| (id.clone(), None)).collect(),
            });

        // 同一格重複出現時保留第一個非空值
        let slot = row.values.entry(observation.indicator).or_insert(None);
        if slot.is_none() {
            *slot = observation.value.filter(|v| v.is_finite());
        }
    }

    stats.rows = rows.len();
    tracing::debug!(
        "Merged {} observations into {} rows ({} bad year, {} unknown country, {} unknown indicator)",
        stats.input,
        stats.rows,
        stats.bad_year,
        stats.unknown_country,
        stats.unknown_indicator
    );

    (MergedDataset::new(rows.into_values().collect()), stats)
}

// 接受 "2016" 與 "2016.0"
pub fn normalize_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let float = trimmed.parse::<f64>().ok()?;
    if float.fract() == 0.0 && float.abs() < 10_000.0 {
        Some(float as i32)
    } else {
        None
    }
}
