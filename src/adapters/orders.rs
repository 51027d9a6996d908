//! Order system client
//! Fetch-by-id and term search over the commerce backend; payload shapes are
//! upstream-specific and normalized here, never assumed stable

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::http::{encode_query, HttpClient};
use super::{AdapterError, OrderApi};
use crate::config::{ConfigError, EngineConfig, UpstreamConfig};

/// Canonical order shape after parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    /// ISO-ish country code; absent is treated as domestic downstream
    pub country: Option<String>,
    /// Tracking number embedded in order metadata, if present
    pub tracking_meta: Option<String>,
    pub customer_first_name: Option<String>,
    pub created_at: Option<String>,
}

pub struct OrdersClient {
    http: HttpClient,
    page_size: usize,
    tracking_meta_keys: Vec<String>,
}

impl OrdersClient {
    pub fn new(config: &UpstreamConfig, engine: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: HttpClient::new("orders", config)?,
            page_size: engine.search_page_size,
            tracking_meta_keys: engine.tracking_meta_keys.clone(),
        })
    }
}

#[async_trait]
impl OrderApi for OrdersClient {
    async fn fetch_order(&self, id: &str) -> Result<Option<OrderRecord>, AdapterError> {
        let payload = self.http.get_optional(&format!("/orders/{}", id)).await?;
        Ok(payload.and_then(|p| parse_order(&p, &self.tracking_meta_keys)))
    }

    async fn search_orders(&self, term: &str) -> Result<Vec<OrderRecord>, AdapterError> {
        // The engine never calls with an empty term; guard anyway
        if term.trim().is_empty() {
            return Err(AdapterError::EmptyTerm);
        }
        let query = encode_query(&[("search", term), ("limit", &self.page_size.to_string())]);
        let payload = self.http.get_optional(&format!("/orders?{}", query)).await?;
        let Some(payload) = payload else {
            return Ok(Vec::new());
        };
        Ok(parse_order_list(&payload, &self.tracking_meta_keys))
    }
}

/// Candidate top-level keys for an order list, tried in order
const ORDER_LIST_KEYS: &[&str] = &["orders", "results", "data"];

/// Parse an order list payload. Upstream returns newest first; order is
/// preserved. Entries that cannot be parsed are skipped.
pub fn parse_order_list(payload: &Value, meta_keys: &[String]) -> Vec<OrderRecord> {
    let list = if payload.is_array() {
        payload.as_array()
    } else {
        ORDER_LIST_KEYS
            .iter()
            .find_map(|key| payload[key].as_array())
    };

    list.map(|entries| {
        entries
            .iter()
            .filter_map(|entry| parse_order(entry, meta_keys))
            .collect()
    })
    .unwrap_or_default()
}

/// Parse one order from its raw payload. Tolerates a wrapping `order` key,
/// string or numeric ids, and country either top-level or nested under the
/// shipping address. Returns `None` only when no id can be found.
pub fn parse_order(payload: &Value, meta_keys: &[String]) -> Option<OrderRecord> {
    let obj = if payload["order"].is_object() {
        &payload["order"]
    } else {
        payload
    };

    let id = field_as_string(obj, &["id", "order_id", "number"])?;

    let country = obj["country"]
        .as_str()
        .or_else(|| obj["shipping_country"].as_str())
        .or_else(|| obj["shipping_address"]["country"].as_str())
        .map(|s| s.to_string());

    let customer_first_name = obj["customer_first_name"]
        .as_str()
        .or_else(|| obj["customer"]["first_name"].as_str())
        .or_else(|| obj["first_name"].as_str())
        .map(|s| s.to_string());

    let created_at = obj["created_at"]
        .as_str()
        .or_else(|| obj["created"].as_str())
        .map(|s| s.to_string());

    Some(OrderRecord {
        id,
        country,
        tracking_meta: tracking_from_metadata(obj, meta_keys),
        customer_first_name,
        created_at,
    })
}

/// Look for an embedded tracking number under the configured metadata keys,
/// checking both the metadata object and the order itself
fn tracking_from_metadata(obj: &Value, meta_keys: &[String]) -> Option<String> {
    for container in [&obj["metadata"], &obj["meta"], obj] {
        for key in meta_keys {
            if let Some(value) = container[key.as_str()].as_str() {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

fn field_as_string(obj: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match &obj[*key] {
            Value::String(s) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Value::Number(n) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta_keys() -> Vec<String> {
        EngineConfig::default().tracking_meta_keys
    }

    #[test]
    fn test_parse_order_flat_shape() {
        let payload = json!({
            "id": "1234",
            "country": "FR",
            "customer_first_name": "Jeanne"
        });
        let order = parse_order(&payload, &meta_keys()).unwrap();
        assert_eq!(order.id, "1234");
        assert_eq!(order.country.as_deref(), Some("FR"));
        assert_eq!(order.customer_first_name.as_deref(), Some("Jeanne"));
        assert!(order.tracking_meta.is_none());
    }

    #[test]
    fn test_parse_order_wrapped_and_nested() {
        let payload = json!({
            "order": {
                "order_id": 98765,
                "shipping_address": { "country": "DE" },
                "customer": { "first_name": "Max" }
            }
        });
        let order = parse_order(&payload, &meta_keys()).unwrap();
        assert_eq!(order.id, "98765");
        assert_eq!(order.country.as_deref(), Some("DE"));
        assert_eq!(order.customer_first_name.as_deref(), Some("Max"));
    }

    #[test]
    fn test_parse_order_without_id_is_none() {
        let payload = json!({ "country": "FR" });
        assert!(parse_order(&payload, &meta_keys()).is_none());
    }

    #[test]
    fn test_tracking_meta_from_allow_listed_keys() {
        let payload = json!({
            "id": "1",
            "metadata": { "tracking_code": "LE123456789FR", "note": "gift" }
        });
        let order = parse_order(&payload, &meta_keys()).unwrap();
        assert_eq!(order.tracking_meta.as_deref(), Some("LE123456789FR"));
    }

    #[test]
    fn test_tracking_meta_ignores_unlisted_keys() {
        let payload = json!({
            "id": "1",
            "metadata": { "shipment_ref": "XYZ" }
        });
        let order = parse_order(&payload, &meta_keys()).unwrap();
        assert!(order.tracking_meta.is_none());
    }

    #[test]
    fn test_parse_order_list_probes_keys_in_order() {
        let payload = json!({
            "results": [
                { "id": "2", "created_at": "2026-02-01T10:00:00Z" },
                { "id": "1", "created_at": "2026-01-01T10:00:00Z" }
            ]
        });
        let orders = parse_order_list(&payload, &meta_keys());
        assert_eq!(orders.len(), 2);
        // Upstream order (newest first) is preserved
        assert_eq!(orders[0].id, "2");
    }

    #[test]
    fn test_parse_order_list_bare_array() {
        let payload = json!([{ "id": "7" }]);
        let orders = parse_order_list(&payload, &meta_keys());
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "7");
    }

    #[test]
    fn test_parse_order_list_unknown_shape_is_empty() {
        let payload = json!({ "unexpected": true });
        assert!(parse_order_list(&payload, &meta_keys()).is_empty());
    }
}
