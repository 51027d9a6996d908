//! Tracking payload normalization
//! Maps the heterogeneous shapes the carrier returns into one canonical
//! record: fixed status precedence, history capped and newest-first, link
//! fallback chain. Malformed shapes degrade to absent fields, never panic.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConfig;

/// One normalized history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub timestamp: String,
    pub message: String,
}

/// Canonical tracking record handed to the composer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub status: String,
    /// Newest-first, at most `history_cap` entries
    pub history: Vec<TrackingEvent>,
    pub destination_country: Option<String>,
    pub tracking_link: Option<String>,
}

impl TrackingRecord {
    /// History as display text, one line per event, newest first
    pub fn history_text(&self) -> String {
        self.history
            .iter()
            .map(|e| format!("{}: {}", e.timestamp, e.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Candidate keys for the history list, tried in order
const HISTORY_KEYS: &[&str] = &["events", "history", "checkpoints"];

/// Normalize a raw carrier payload into the canonical record.
/// `tracking_number` parameterizes the synthesized link; without one the
/// link is `None`.
pub fn normalize(
    raw: &Value,
    tracking_number: Option<&str>,
    config: &EngineConfig,
) -> TrackingRecord {
    // Some upstreams wrap the record under a `tracking` key
    let obj = if raw["tracking"].is_object() {
        &raw["tracking"]
    } else {
        raw
    };

    let history = normalize_history(obj, config.history_cap);

    // Status precedence: explicit message, carrier code, latest history
    // message, configured fallback
    let status = non_blank(obj["status_message"].as_str())
        .or_else(|| non_blank(obj["status"].as_str()))
        .or_else(|| non_blank(obj["carrier_status"].as_str()))
        .or_else(|| non_blank(obj["status_code"].as_str()))
        .or_else(|| history.first().map(|e| e.message.clone()))
        .unwrap_or_else(|| config.fallback_status.clone());

    let destination_country = non_blank(obj["destination_country"].as_str())
        .or_else(|| non_blank(obj["destination"]["country"].as_str()))
        .or_else(|| non_blank(obj["country"].as_str()));

    let tracking_link = non_blank(obj["carrier_tracking_url"].as_str())
        .or_else(|| non_blank(obj["tracking_url"].as_str()))
        .or_else(|| {
            tracking_number.map(|n| config.tracking_link_template.replace("{tracking_number}", n))
        });

    TrackingRecord {
        status,
        history,
        destination_country,
        tracking_link,
    }
}

/// Extract, orient and truncate the history list. Upstream lists arrive
/// oldest-first or newest-first; timestamps decide, and only the most recent
/// `cap` entries survive, newest-first.
fn normalize_history(obj: &Value, cap: usize) -> Vec<TrackingEvent> {
    let list = HISTORY_KEYS.iter().find_map(|key| obj[*key].as_array());
    let Some(list) = list else {
        return Vec::new();
    };

    let mut events: Vec<TrackingEvent> = list.iter().filter_map(parse_event).collect();

    if is_oldest_first(&events) {
        events.reverse();
    }
    events.truncate(cap);
    events
}

fn parse_event(entry: &Value) -> Option<TrackingEvent> {
    let timestamp = non_blank(entry["timestamp"].as_str())
        .or_else(|| non_blank(entry["date"].as_str()))
        .or_else(|| non_blank(entry["time"].as_str()))?;

    // Carrier message takes priority over the generic status label
    let message = non_blank(entry["carrier_message"].as_str())
        .or_else(|| non_blank(entry["message"].as_str()))
        .or_else(|| non_blank(entry["status"].as_str()))?;

    Some(TrackingEvent { timestamp, message })
}

/// True when the first parseable timestamp predates the last one.
/// Unparseable timestamps leave the list in its given order.
fn is_oldest_first(events: &[TrackingEvent]) -> bool {
    if events.len() < 2 {
        return false;
    }
    match (parse_ts(&events[0].timestamp), parse_ts(&events[events.len() - 1].timestamp)) {
        (Some(first), Some(last)) => first < last,
        _ => false,
    }
}

fn parse_ts(raw: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_status_prefers_explicit_message() {
        let raw = json!({
            "status_message": "Out for delivery",
            "carrier_status": "OFD",
            "events": [{ "timestamp": "2026-03-01T08:00:00Z", "message": "Scanned" }]
        });
        let record = normalize(&raw, Some("X"), &config());
        assert_eq!(record.status, "Out for delivery");
    }

    #[test]
    fn test_status_falls_back_to_carrier_code_then_history() {
        let raw = json!({
            "carrier_status": "IN_TRANSIT",
            "events": [{ "timestamp": "2026-03-01T08:00:00Z", "message": "Scanned" }]
        });
        assert_eq!(normalize(&raw, None, &config()).status, "IN_TRANSIT");

        let raw = json!({
            "events": [{ "timestamp": "2026-03-01T08:00:00Z", "message": "Scanned" }]
        });
        assert_eq!(normalize(&raw, None, &config()).status, "Scanned");
    }

    #[test]
    fn test_status_fallback_string_when_nothing_present() {
        let record = normalize(&json!({}), None, &config());
        assert_eq!(record.status, "processing");
    }

    #[test]
    fn test_history_capped_at_three_newest_first() {
        let raw = json!({
            "events": [
                { "timestamp": "2026-03-04T08:00:00Z", "message": "e4" },
                { "timestamp": "2026-03-03T08:00:00Z", "message": "e3" },
                { "timestamp": "2026-03-02T08:00:00Z", "message": "e2" },
                { "timestamp": "2026-03-01T08:00:00Z", "message": "e1" }
            ]
        });
        let record = normalize(&raw, None, &config());
        assert_eq!(record.history.len(), 3);
        assert_eq!(record.history[0].message, "e4");
        assert_eq!(record.history[2].message, "e2");
    }

    #[test]
    fn test_oldest_first_history_is_reversed() {
        let raw = json!({
            "history": [
                { "timestamp": "2026-03-01T08:00:00Z", "message": "e1" },
                { "timestamp": "2026-03-02T08:00:00Z", "message": "e2" },
                { "timestamp": "2026-03-03T08:00:00Z", "message": "e3" },
                { "timestamp": "2026-03-04T08:00:00Z", "message": "e4" }
            ]
        });
        let record = normalize(&raw, None, &config());
        assert_eq!(record.history.len(), 3);
        assert_eq!(record.history[0].message, "e4");
        assert_eq!(record.history[2].message, "e2");
    }

    #[test]
    fn test_event_message_prefers_carrier_message() {
        let raw = json!({
            "events": [{
                "timestamp": "2026-03-01T08:00:00Z",
                "carrier_message": "Arrived at hub Lyon",
                "status": "IN_TRANSIT"
            }]
        });
        let record = normalize(&raw, None, &config());
        assert_eq!(record.history[0].message, "Arrived at hub Lyon");
    }

    #[test]
    fn test_wrapped_payload_and_nested_destination() {
        let raw = json!({
            "tracking": {
                "status": "delivered",
                "destination": { "country": "CH" }
            }
        });
        let record = normalize(&raw, None, &config());
        assert_eq!(record.status, "delivered");
        assert_eq!(record.destination_country.as_deref(), Some("CH"));
    }

    #[test]
    fn test_link_prefers_upstream_then_synthesizes() {
        let raw = json!({ "carrier_tracking_url": "https://carrier.example/t/1" });
        let record = normalize(&raw, Some("LE123456789FR"), &config());
        assert_eq!(
            record.tracking_link.as_deref(),
            Some("https://carrier.example/t/1")
        );

        let record = normalize(&json!({}), Some("LE123456789FR"), &config());
        assert_eq!(
            record.tracking_link.as_deref(),
            Some("https://track.example.com/LE123456789FR")
        );
    }

    #[test]
    fn test_link_none_without_tracking_number() {
        let record = normalize(&json!({}), None, &config());
        assert!(record.tracking_link.is_none());
    }

    #[test]
    fn test_malformed_payload_degrades_without_panic() {
        for raw in [json!(null), json!("text"), json!(42), json!({ "events": "nope" })] {
            let record = normalize(&raw, None, &config());
            assert_eq!(record.status, "processing");
            assert!(record.history.is_empty());
        }
    }

    #[test]
    fn test_history_text_format() {
        let record = TrackingRecord {
            status: "ok".into(),
            history: vec![
                TrackingEvent {
                    timestamp: "2026-03-02T08:00:00Z".into(),
                    message: "e2".into(),
                },
                TrackingEvent {
                    timestamp: "2026-03-01T08:00:00Z".into(),
                    message: "e1".into(),
                },
            ],
            destination_country: None,
            tracking_link: None,
        };
        assert_eq!(
            record.history_text(),
            "2026-03-02T08:00:00Z: e2\n2026-03-01T08:00:00Z: e1"
        );
    }
}
