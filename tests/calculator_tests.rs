//! AttributionCalculator integration tests
//!
//! Covers calculate_for_conversion (persistence, overwrite, idempotence,
//! error cases), lazy ensure_results and the touch cutoff at conversion
//! time.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use peanut_suite::attribution::{
    AttributionCalculator, AttributionModel, NewConversion, NewTouch, TouchType, UtmParams,
};
use peanut_suite::errors::PeanutError;
use peanut_suite::storage::{AttributionResultStore, MemoryStore};

// =============================================================================
// Helpers
// =============================================================================

fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::days(offset)
}

fn utm(source: &str, medium: &str, campaign: &str) -> UtmParams {
    UtmParams {
        utm_source: Some(source.to_string()),
        utm_medium: Some(medium.to_string()),
        utm_campaign: Some(campaign.to_string()),
        utm_term: None,
        utm_content: None,
    }
}

fn setup() -> (Arc<MemoryStore>, AttributionCalculator) {
    let store = Arc::new(MemoryStore::new());
    let calculator = AttributionCalculator::new(store.clone(), store.clone(), store.clone(), 7.0);
    (store, calculator)
}

async fn seed_touch(store: &MemoryStore, visitor: &str, at: DateTime<Utc>, source: &str) -> i64 {
    use peanut_suite::storage::TouchStore;
    let mut touch = NewTouch::new(visitor, TouchType::Click).with_utm(utm(source, "cpc", "spring"));
    touch.occurred_at = at;
    store.record_touch(touch).await.unwrap().id
}

async fn seed_conversion(
    store: &MemoryStore,
    visitor: &str,
    at: DateTime<Utc>,
    value: Option<f64>,
) -> i64 {
    use peanut_suite::storage::ConversionStore;
    store
        .record_conversion(NewConversion {
            visitor_id: visitor.to_string(),
            conversion_type: "purchase".to_string(),
            value,
            occurred_at: at,
        })
        .await
        .unwrap()
        .id
}

// =============================================================================
// calculate_for_conversion
// =============================================================================

#[tokio::test]
async fn test_calculate_persists_and_returns_rows() {
    let (store, calculator) = setup();
    seed_touch(&store, "v1", day(0), "google").await;
    seed_touch(&store, "v1", day(2), "newsletter").await;
    let conversion_id = seed_conversion(&store, "v1", day(3), Some(100.0)).await;

    let rows = calculator
        .calculate_for_conversion(conversion_id, AttributionModel::Linear)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    let weight_sum: f64 = rows.iter().map(|r| r.weight).sum();
    assert!((weight_sum - 1.0).abs() < 1e-9);
    for row in &rows {
        assert!((row.credited_value.unwrap() - 50.0).abs() < 1e-9);
    }

    // Rows are persisted under the (conversion, model) key
    let stored = AttributionResultStore::get(store.as_ref(), conversion_id, AttributionModel::Linear)
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_missing_conversion_fails() {
    let (_store, calculator) = setup();
    let err = calculator
        .calculate_for_conversion(999, AttributionModel::LastTouch)
        .await
        .unwrap_err();
    assert!(matches!(err, PeanutError::ConversionNotFound(_)));
}

#[tokio::test]
async fn test_empty_touch_set_yields_empty_rows_not_error() {
    let (store, calculator) = setup();
    let conversion_id = seed_conversion(&store, "v-no-touches", day(0), Some(10.0)).await;

    let rows = calculator
        .calculate_for_conversion(conversion_id, AttributionModel::FirstTouch)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_touches_after_conversion_are_excluded() {
    let (store, calculator) = setup();
    seed_touch(&store, "v1", day(0), "google").await;
    let late_touch = seed_touch(&store, "v1", day(5), "newsletter").await;
    let conversion_id = seed_conversion(&store, "v1", day(2), None).await;

    let rows = calculator
        .calculate_for_conversion(conversion_id, AttributionModel::Linear)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|r| r.touch_id != late_touch));
}

#[tokio::test]
async fn test_recomputation_is_idempotent() {
    let (store, calculator) = setup();
    for offset in 0..4 {
        seed_touch(&store, "v1", day(offset), "google").await;
    }
    let conversion_id = seed_conversion(&store, "v1", day(4), Some(80.0)).await;

    let first = calculator
        .calculate_for_conversion(conversion_id, AttributionModel::TimeDecay)
        .await
        .unwrap();
    let second = calculator
        .calculate_for_conversion(conversion_id, AttributionModel::TimeDecay)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_time_decay_on_ancient_touches_persists_finite_weights() {
    let (store, calculator) = setup();
    // Touch history thousands of half-lives before the conversion
    seed_touch(&store, "v1", day(-9000), "google").await;
    seed_touch(&store, "v1", day(-8993), "newsletter").await;
    let conversion_id = seed_conversion(&store, "v1", day(0), Some(100.0)).await;

    let rows = calculator
        .calculate_for_conversion(conversion_id, AttributionModel::TimeDecay)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let weight_sum: f64 = rows.iter().map(|r| r.weight).sum();
    assert!((weight_sum - 1.0).abs() < 1e-9, "weights sum to {weight_sum}");
    for row in &rows {
        assert!(row.weight.is_finite());
        assert!(row.credited_value.unwrap().is_finite());
    }

    let stored =
        AttributionResultStore::get(store.as_ref(), conversion_id, AttributionModel::TimeDecay)
            .await
            .unwrap();
    assert!(stored.iter().all(|r| r.weight.is_finite()));
}

#[tokio::test]
async fn test_recompute_overwrites_stale_rows() {
    let (store, calculator) = setup();
    seed_touch(&store, "v1", day(0), "google").await;
    let conversion_id = seed_conversion(&store, "v1", day(3), Some(60.0)).await;

    let before = calculator
        .calculate_for_conversion(conversion_id, AttributionModel::Linear)
        .await
        .unwrap();
    assert_eq!(before.len(), 1);

    // A touch arriving after the first computation leaves stored results
    // stale until an explicit recomputation
    seed_touch(&store, "v1", day(1), "newsletter").await;
    let stale =
        AttributionResultStore::get(store.as_ref(), conversion_id, AttributionModel::Linear)
            .await
            .unwrap();
    assert_eq!(stale.len(), 1);

    let after = calculator
        .calculate_for_conversion(conversion_id, AttributionModel::Linear)
        .await
        .unwrap();
    assert_eq!(after.len(), 2);
}

#[tokio::test]
async fn test_models_are_stored_under_separate_keys() {
    let (store, calculator) = setup();
    seed_touch(&store, "v1", day(0), "google").await;
    seed_touch(&store, "v1", day(1), "newsletter").await;
    let conversion_id = seed_conversion(&store, "v1", day(2), Some(40.0)).await;

    calculator
        .calculate_for_conversion(conversion_id, AttributionModel::FirstTouch)
        .await
        .unwrap();
    calculator
        .calculate_for_conversion(conversion_id, AttributionModel::LastTouch)
        .await
        .unwrap();

    let first =
        AttributionResultStore::get(store.as_ref(), conversion_id, AttributionModel::FirstTouch)
            .await
            .unwrap();
    let last =
        AttributionResultStore::get(store.as_ref(), conversion_id, AttributionModel::LastTouch)
            .await
            .unwrap();
    assert_eq!(first[0].weight, 1.0);
    assert_eq!(last[0].weight, 0.0);
}

// =============================================================================
// ensure_results
// =============================================================================

#[tokio::test]
async fn test_ensure_results_computes_lazily_then_serves_cached() {
    let (store, calculator) = setup();
    seed_touch(&store, "v1", day(0), "google").await;
    let conversion_id = seed_conversion(&store, "v1", day(1), Some(25.0)).await;

    let computed = calculator
        .ensure_results(conversion_id, AttributionModel::PositionBased)
        .await
        .unwrap();
    assert_eq!(computed.len(), 1);

    // New touch does not invalidate; ensure_results serves the stored rows
    seed_touch(&store, "v1", day(0), "newsletter").await;
    let served = calculator
        .ensure_results(conversion_id, AttributionModel::PositionBased)
        .await
        .unwrap();
    assert_eq!(served.len(), 1);
}
