use crate::core::catalog::IndicatorCatalog;
use crate::domain::model::{CacheEntry, MergedDataset};
use arc_swap::ArcSwapOption;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

pub const FRESHNESS_UNAVAILABLE: &str = "unavailable";

pub const FETCHED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 讀取端永遠只看到完整的資料集（原子指標交換）
#[derive(Default)]
pub struct SessionCache {
    current: ArcSwapOption<CacheEntry>,
    write_guard: Mutex<()>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, dataset: MergedDataset, fetched_at: String) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry {
            dataset,
            fetched_at,
        });
        let _guard = self
            .write_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.current.store(Some(Arc::clone(&entry)));
        entry
    }

    pub fn read(&self) -> Option<Arc<CacheEntry>> {
        self.current.load_full()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_none()
    }

    pub fn freshness_label(&self) -> String {
        self.current
            .load_full()
            .map(|entry| entry.fetched_at.clone())
            .unwrap_or_else(|| FRESHNESS_UNAVAILABLE.to_string())
    }

    pub fn clear(&self) {
        let _guard = self
            .write_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.current.store(None);
    }
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format(FETCHED_AT_FORMAT).to_string()
}

/// 將快取轉成 JSON 記錄清單（欄位用指標標籤）
pub fn entry_to_json(entry: &CacheEntry, catalog: &IndicatorCatalog) -> Value {
    let records: Vec<Value> = entry
        .dataset
        .rows()
        .iter()
        .map(|row| {
            let mut record = Map::new();
            record.insert("iso3c".to_string(), json!(row.iso3_code));
            record.insert("country".to_string(), json!(row.country_name));
            record.insert("year".to_string(), json!(row.year));
            for (id, value) in &row.values {
                let key = catalog.label(id).unwrap_or(id.as_str());
                record.insert(key.to_string(), json!(value));
            }
            Value::Object(record)
        })
        .collect();

    json!({
        "records": records,
        "fetched_at": entry.fetched_at,
    })
}
