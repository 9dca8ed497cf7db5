use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorId(String);

impl IndicatorId {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IndicatorId {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    pub id: IndicatorId,
    pub label: String,
    pub short_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country_name: String,
    pub iso3_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCountry {
    pub iso3_code: String,
    pub name: String,
    pub capital_city: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub iso3_code: String,
    pub indicator: IndicatorId,
    pub year: String,
    pub value: Option<f64>,
}

// 寬表格：每個國家-年份一列，每個指標一欄
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub iso3_code: String,
    pub country_name: String,
    pub year: i32,
    pub values: BTreeMap<IndicatorId, Option<f64>>,
}

impl Observation {
    pub fn value(&self, indicator: &IndicatorId) -> Option<f64> {
        self.values.get(indicator).copied().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedDataset {
    rows: Vec<Observation>,
}

impl MergedDataset {
    pub fn new(mut rows: Vec<Observation>) -> Self {
        rows.sort_by(|a, b| (&a.iso3_code, a.year).cmp(&(&b.iso3_code, b.year)));
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn years(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.year).min()?;
        let max = self.rows.iter().map(|r| r.year).max()?;
        Some((min, max))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub dataset: MergedDataset,
    pub fetched_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationMode {
    Exact { year: i32 },
    Averaged { from: i32, to: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateValue {
    Exact { value: f64 },
    // 範圍內非空值的平均
    Averaged { mean: f64, observations: usize },
}

impl AggregateValue {
    pub fn value(&self) -> f64 {
        match *self {
            Self::Exact { value } => value,
            Self::Averaged { mean, .. } => mean,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub iso3_code: String,
    pub country_name: String,
    pub value: AggregateValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub indicator: IndicatorId,
    pub mode: AggregationMode,
    pub rows: Vec<AggregateRow>,
}

impl AggregationResult {
    pub fn get(&self, iso3_code: &str) -> Option<&AggregateRow> {
        self.rows.iter().find(|row| row.iso3_code == iso3_code)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBounds {
    pub start: i32,
    pub end: i32,
}

impl YearBounds {
    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(iso3: &str, year: i32) -> Observation {
        Observation {
            iso3_code: iso3.to_string(),
            country_name: iso3.to_string(),
            year,
            values: BTreeMap::new(),
        }
    }

    #[test]
    fn test_dataset_rows_are_ordered_by_country_then_year() {
        let ds = MergedDataset::new(vec![row("ZWE", 2006), row("ABW", 2007), row("ABW", 2005)]);
        let keys: Vec<(&str, i32)> = ds
            .rows()
            .iter()
            .map(|r| (r.iso3_code.as_str(), r.year))
            .collect();
        assert_eq!(keys, vec![("ABW", 2005), ("ABW", 2007), ("ZWE", 2006)]);
        assert_eq!(ds.years(), Some((2005, 2007)));
    }

    #[test]
    fn test_observation_value_flattens_missing() {
        let mut r = row("ABW", 2005);
        let id = IndicatorId::new("X");
        assert_eq!(r.value(&id), None);
        r.values.insert(id.clone(), None);
        assert_eq!(r.value(&id), None);
        r.values.insert(id.clone(), Some(1.5));
        assert_eq!(r.value(&id), Some(1.5));
    }
}
