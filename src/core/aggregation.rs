use crate::domain::model::{
    AggregateRow, AggregateValue, AggregationMode, AggregationResult, IndicatorId, MergedDataset,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// 單一年份回傳原值；年份範圍（不分順序）回傳非空值平均。
/// 沒有資料的國家不會出現在結果中。
pub fn aggregate(
    dataset: &MergedDataset,
    indicator: &IndicatorId,
    year_low: i32,
    year_high: i32,
) -> AggregationResult {
    match year_low.cmp(&year_high) {
        Ordering::Equal => exact_year(dataset, indicator, year_low),
        Ordering::Less => averaged(dataset, indicator, year_low, year_high),
        Ordering::Greater => averaged(dataset, indicator, year_high, year_low),
    }
}

fn exact_year(dataset: &MergedDataset, indicator: &IndicatorId, year: i32) -> AggregationResult {
    let rows = dataset
        .rows()
        .iter()
        .filter(|row| row.year == year)
        .filter_map(|row| {
            row.value(indicator).map(|value| AggregateRow {
                iso3_code: row.iso3_code.clone(),
                country_name: row.country_name.clone(),
                value: AggregateValue::Exact { value },
            })
        })
        .collect();

    AggregationResult {
        indicator: indicator.clone(),
        mode: AggregationMode::Exact { year },
        rows,
    }
}

fn averaged(
    dataset: &MergedDataset,
    indicator: &IndicatorId,
    from: i32,
    to: i32,
) -> AggregationResult {
    // iso3 -> (name, sum, count)
    let mut groups: BTreeMap<&str, (&str, f64, usize)> = BTreeMap::new();

    for row in dataset.rows() {
        if row.year < from || row.year > to {
            continue;
        }
        let Some(value) = row.value(indicator) else {
            continue;
        };
        let group = groups
            .entry(row.iso3_code.as_str())
            .or_insert((row.country_name.as_str(), 0.0, 0));
        group.1 += value;
        group.2 += 1;
    }

    let rows = groups
        .into_iter()
        .map(|(iso3_code, (country_name, sum, count))| AggregateRow {
            iso3_code: iso3_code.to_string(),
            country_name: country_name.to_string(),
            value: AggregateValue::Averaged {
                mean: sum / count as f64,
                observations: count,
            },
        })
        .collect();

    AggregationResult {
        indicator: indicator.clone(),
        mode: AggregationMode::Averaged { from, to },
        rows,
    }
}
