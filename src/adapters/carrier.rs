//! Carrier tracking client
//! Required single-resource fetch: any transport or HTTP error surfaces to
//! the caller, which decides whether it is terminal

use async_trait::async_trait;
use serde_json::Value;

use super::http::HttpClient;
use super::{AdapterError, CarrierApi};
use crate::config::{ConfigError, UpstreamConfig};

pub struct CarrierClient {
    http: HttpClient,
}

impl CarrierClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: HttpClient::new("carrier", config)?,
        })
    }
}

#[async_trait]
impl CarrierApi for CarrierClient {
    async fn track(&self, tracking_number: &str) -> Result<Value, AdapterError> {
        self.http
            .get_required(&format!("/trackings/{}", tracking_number))
            .await
    }
}
