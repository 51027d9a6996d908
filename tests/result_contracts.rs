//! JSON contracts of the result types handed to the response composer.

use parcelassist::adapters::OrderRecord;
use parcelassist::engine::{ResolutionOutcome, ResolutionPath, ResolutionResult};
use parcelassist::normalizer::{TrackingEvent, TrackingRecord};

fn resolved_result() -> ResolutionResult {
    ResolutionResult {
        path: ResolutionPath::OrderNumber,
        outcome: ResolutionOutcome::Resolved,
        tracking_number: Some("LE123456789FR".to_string()),
        order: Some(OrderRecord {
            id: "1234".to_string(),
            country: Some("FR".to_string()),
            tracking_meta: None,
            customer_first_name: Some("Jeanne".to_string()),
            created_at: Some("2026-02-01T10:00:00Z".to_string()),
        }),
        tracking: Some(TrackingRecord {
            status: "in_transit".to_string(),
            history: vec![
                TrackingEvent {
                    timestamp: "2026-03-02T10:00:00Z".to_string(),
                    message: "In transit".to_string(),
                },
                TrackingEvent {
                    timestamp: "2026-03-01T09:00:00Z".to_string(),
                    message: "Picked up".to_string(),
                },
            ],
            destination_country: Some("FR".to_string()),
            tracking_link: Some("https://track.example.com/LE123456789FR".to_string()),
        }),
        is_international: false,
        trace: vec!["order number: fetching order 1234".to_string()],
    }
}

#[test]
fn resolution_result_json_contract() {
    let value = serde_json::to_value(resolved_result()).expect("serialize result");
    let obj = value.as_object().expect("json object");

    for key in [
        "path",
        "outcome",
        "tracking_number",
        "order",
        "tracking",
        "is_international",
        "trace",
    ] {
        assert!(obj.contains_key(key), "missing key: {key}");
    }

    assert_eq!(obj["path"], "order_number");
    assert_eq!(obj["outcome"], "resolved");
    assert_eq!(obj["order"]["customer_first_name"], "Jeanne");
    assert_eq!(obj["tracking"]["history"][0]["message"], "In transit");
    assert_eq!(obj["trace"][0], "order number: fetching order 1234");
}

#[test]
fn summary_json_contract() {
    let summary = resolved_result().summary();
    let value = serde_json::to_value(summary).expect("serialize summary");
    let obj = value.as_object().expect("json object");

    for key in [
        "first_name",
        "tracking_number",
        "tracking_link",
        "status",
        "history_text",
        "found",
        "is_international",
    ] {
        assert!(obj.contains_key(key), "missing key: {key}");
    }

    assert_eq!(obj["first_name"], "Jeanne");
    assert_eq!(obj["found"], true);
    assert_eq!(obj["is_international"], false);
    assert_eq!(
        obj["history_text"],
        "2026-03-02T10:00:00Z: In transit\n2026-03-01T09:00:00Z: Picked up"
    );
}

#[test]
fn no_tracking_summary_still_reports_found() {
    let mut result = resolved_result();
    result.outcome = ResolutionOutcome::ResolvedNoTracking;
    result.tracking_number = None;
    result.tracking = None;

    let summary = result.summary();
    assert!(summary.found);
    assert!(summary.tracking_number.is_none());
    assert!(summary.status.is_none());
    assert_eq!(summary.history_text, "");
}
