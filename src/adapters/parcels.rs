//! Shipment lookup client
//! Returns the raw parcel payload for an order number; the payload shape
//! varies by upstream and is interpreted by a shape-tolerant extractor

use async_trait::async_trait;
use serde_json::Value;

use super::http::{encode_query, HttpClient};
use super::{AdapterError, ParcelApi};
use crate::config::{ConfigError, UpstreamConfig};

pub struct ParcelsClient {
    http: HttpClient,
}

impl ParcelsClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: HttpClient::new("parcels", config)?,
        })
    }
}

#[async_trait]
impl ParcelApi for ParcelsClient {
    async fn find_parcel(&self, order_number: &str) -> Result<Option<Value>, AdapterError> {
        let query = encode_query(&[("order_number", order_number)]);
        self.http.get_optional(&format!("/parcels?{}", query)).await
    }
}

/// Candidate top-level keys for the parcel list, tried in order
const PARCEL_LIST_KEYS: &[&str] = &["parcels", "shipments", "results", "data"];

/// Direct tracking-number fields on a parcel entry, tried in order
const DIRECT_TRACKING_KEYS: &[&str] = &["tracking_number", "trackingNumber", "tracking_code"];

/// Extract a tracking number from a raw parcel payload.
///
/// The payload is either a list under one of several keys (first non-empty
/// list wins, first entry is used) or a singular parcel object. The tracking
/// number is read from a direct field first, then from the nested
/// `tracking.number` field. Unexpected shapes yield `None`, never an error.
pub fn extract_tracking_number(payload: &Value) -> Option<String> {
    let entry = first_parcel_entry(payload)?;

    for key in DIRECT_TRACKING_KEYS {
        if let Some(number) = non_blank(entry[*key].as_str()) {
            return Some(number);
        }
    }
    non_blank(entry["tracking"]["number"].as_str())
}

fn first_parcel_entry(payload: &Value) -> Option<&Value> {
    if let Some(list) = payload.as_array() {
        return list.first();
    }
    for key in PARCEL_LIST_KEYS {
        if let Some(list) = payload[*key].as_array() {
            if let Some(first) = list.first() {
                return Some(first);
            }
        }
    }
    // Singular object shape
    payload.is_object().then_some(payload)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}
