use async_trait::async_trait;
use indicator_atlas::core::cache::FRESHNESS_UNAVAILABLE;
use indicator_atlas::domain::model::{
    AggregateValue, AggregationMode, IndicatorDefinition, IndicatorId, RawCountry,
    RawObservation, YearBounds,
};
use indicator_atlas::domain::ports::DataSource;
use indicator_atlas::utils::error::ErrorCategory;
use indicator_atlas::{
    AtlasConfig, AtlasError, CountryReference, IndicatorCatalog, Result, Session,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const LABEL: &str = "Indicator X";

/// In-memory source: Wakonia reports 10, missing, 20 for 2010-2012.
struct FakeSource {
    fail: AtomicBool,
    scale: std::sync::Mutex<f64>,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            scale: std::sync::Mutex::new(1.0),
        }
    }
}

#[async_trait]
impl DataSource for FakeSource {
    async fn list_countries(&self) -> Result<Vec<RawCountry>> {
        Ok(vec![
            RawCountry {
                iso3_code: "WAK".to_string(),
                name: "Wakonia".to_string(),
                capital_city: Some("Wakville".to_string()),
            },
            RawCountry {
                iso3_code: "NOR".to_string(),
                name: "Norland".to_string(),
                capital_city: Some("Nordby".to_string()),
            },
            RawCountry {
                iso3_code: "AGG".to_string(),
                name: "Some Region Aggregate".to_string(),
                capital_city: Some(String::new()),
            },
        ])
    }

    async fn download_indicator(
        &self,
        indicator: &IndicatorId,
        _countries: &[String],
        _year_start: i32,
        _year_end: i32,
    ) -> Result<Vec<RawObservation>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AtlasError::data_source("simulated source timeout"));
        }
        let scale = *self.scale.lock().unwrap();
        let obs = |iso3: &str, year: &str, value: Option<f64>| RawObservation {
            iso3_code: iso3.to_string(),
            indicator: indicator.clone(),
            year: year.to_string(),
            value: value.map(|v| v * scale),
        };
        Ok(vec![
            obs("WAK", "2010", Some(10.0)),
            obs("WAK", "2011", None),
            obs("WAK", "2012", Some(20.0)),
            obs("NOR", "2011", Some(5.0)),
            obs("AGG", "2011", Some(1000.0)),
            obs("UNK", "2011", Some(42.0)),
        ])
    }
}

fn catalog() -> IndicatorCatalog {
    IndicatorCatalog::new(vec![IndicatorDefinition {
        id: IndicatorId::new("X"),
        label: LABEL.to_string(),
        short_label: None,
    }])
    .unwrap()
}

async fn session(source: Arc<FakeSource>) -> Session<Arc<FakeSource>> {
    session_with_interval(source, Duration::from_secs(60)).await
}

async fn session_with_interval(
    source: Arc<FakeSource>,
    refresh_interval: Duration,
) -> Session<Arc<FakeSource>> {
    let reference = CountryReference::load(&source, &[]).await.unwrap();
    Session::new(
        source,
        reference,
        catalog(),
        YearBounds {
            start: 2005,
            end: 2016,
        },
        refresh_interval,
        false,
    )
}

#[tokio::test]
async fn test_queries_before_first_refresh_report_unavailable() {
    let session = session(Arc::new(FakeSource::new())).await;

    assert_eq!(session.request_freshness_label(), FRESHNESS_UNAVAILABLE);
    assert_err!(session.request_aggregation(LABEL, 2010, 2012));
    let err = session.request_aggregation(LABEL, 2010, 2012).unwrap_err();
    assert!(matches!(err, AtlasError::EmptyCacheError));
    assert!(session.snapshot_json().is_err());
}

#[tokio::test]
async fn test_wakonia_example() {
    let session = session(Arc::new(FakeSource::new())).await;
    assert_ok!(session.refresh_now().await);

    let ranged = session.request_aggregation(LABEL, 2010, 2012).unwrap();
    assert_eq!(ranged.get("WAK").unwrap().value.value(), 15.0);
    assert_eq!(ranged.get("NOR").unwrap().value.value(), 5.0);

    let missing_year = session.request_aggregation(LABEL, 2011, 2011).unwrap();
    assert!(missing_year.get("WAK").is_none());
    assert_eq!(
        missing_year.get("NOR").unwrap().value,
        AggregateValue::Exact { value: 5.0 }
    );

    let exact = session.request_aggregation(LABEL, 2010, 2010).unwrap();
    assert_eq!(exact.mode, AggregationMode::Exact { year: 2010 });
    assert_eq!(exact.get("WAK").unwrap().value.value(), 10.0);
}

#[tokio::test]
async fn test_join_drops_unknown_and_filtered_countries() {
    let session = session(Arc::new(FakeSource::new())).await;
    session.refresh_now().await.unwrap();

    let entry = session.cache().read().unwrap();
    assert!(entry
        .dataset
        .rows()
        .iter()
        .all(|row| session.reference().contains(&row.iso3_code)));

    let result = session.request_aggregation(LABEL, 2005, 2016).unwrap();
    assert!(result.get("UNK").is_none());
    assert!(result.get("AGG").is_none());
}

#[tokio::test]
async fn test_reversed_bounds_give_same_result() {
    let session = session(Arc::new(FakeSource::new())).await;
    session.refresh_now().await.unwrap();

    let forward = session.request_aggregation(LABEL, 2010, 2012).unwrap();
    let backward = session.request_aggregation(LABEL, 2012, 2010).unwrap();
    assert_eq!(forward, backward);
}

#[tokio::test]
async fn test_typed_query_errors() {
    let session = session(Arc::new(FakeSource::new())).await;
    session.refresh_now().await.unwrap();

    let err = session.request_aggregation("GDP", 2010, 2012).unwrap_err();
    assert!(matches!(err, AtlasError::UnknownIndicatorError { .. }));

    let err = session.request_aggregation(LABEL, 2010, 2030).unwrap_err();
    assert!(matches!(err, AtlasError::InvalidRangeError { .. }));

    let err = session.request_aggregation(LABEL, 1999, 2010).unwrap_err();
    assert!(matches!(err, AtlasError::InvalidRangeError { .. }));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_entry() {
    let source = Arc::new(FakeSource::new());
    let session = session(Arc::clone(&source)).await;
    session.refresh_now().await.unwrap();
    let fetched_at = session.request_freshness_label();

    source.fail.store(true, Ordering::SeqCst);
    let err = session.refresh_now().await.unwrap_err();
    assert!(err.is_data_source());

    assert_eq!(session.request_freshness_label(), fetched_at);
    let result = session.request_aggregation(LABEL, 2010, 2012).unwrap();
    assert_eq!(result.get("WAK").unwrap().value.value(), 15.0);
}

#[tokio::test]
async fn test_refresh_replaces_whole_dataset() {
    let source = Arc::new(FakeSource::new());
    let session = session(Arc::clone(&source)).await;
    session.refresh_now().await.unwrap();

    *source.scale.lock().unwrap() = 2.0;
    session.refresh_now().await.unwrap();

    let result = session.request_aggregation(LABEL, 2010, 2012).unwrap();
    assert_eq!(result.get("WAK").unwrap().value.value(), 30.0);
    assert_eq!(result.get("NOR").unwrap().value.value(), 10.0);
}

#[tokio::test]
async fn test_map_frame_and_snapshot() {
    let session = session(Arc::new(FakeSource::new())).await;
    session.refresh_now().await.unwrap();

    let frame = session.request_map(LABEL, 2010, 2012).unwrap();
    assert_eq!(frame.locations, vec!["NOR", "WAK"]);
    assert_eq!(frame.hover_text, vec!["Norland", "Wakonia"]);
    assert_eq!(frame.legend_title, LABEL);

    let snapshot = session.snapshot_json().unwrap();
    let records = snapshot["records"].as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r["year"].is_i64()));
    assert_eq!(snapshot["fetched_at"], session.request_freshness_label());

    session.end();
    assert_eq!(session.request_freshness_label(), FRESHNESS_UNAVAILABLE);
}

#[tokio::test]
async fn test_bootstrap_rejects_zero_refresh_interval() {
    let config = AtlasConfig::from_toml_str("[refresh]\ninterval_seconds = 0").unwrap();

    let err = Session::bootstrap(Arc::new(FakeSource::new()), &config)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, AtlasError::InvalidConfigValueError { ref field, .. } if field == "refresh.interval_seconds"));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[tokio::test]
async fn test_refresh_loop_with_zero_interval_returns_error() {
    let session = session_with_interval(Arc::new(FakeSource::new()), Duration::ZERO).await;

    let err = session
        .run_refresh_loop(std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, AtlasError::ConfigError { .. }));
    assert_eq!(session.request_freshness_label(), FRESHNESS_UNAVAILABLE);
}
