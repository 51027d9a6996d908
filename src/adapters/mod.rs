//! Thin adapters to the three upstream systems
//! Stateless clients; not-found is a normal outcome, transport failure is not

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod carrier;
pub mod http;
pub mod orders;
pub mod parcels;

pub use carrier::CarrierClient;
pub use orders::{OrderRecord, OrdersClient};
pub use parcels::ParcelsClient;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("request timeout")]
    Timeout,
    #[error("authentication failed - check the API token")]
    AuthFailed,
    #[error("rate limited - try again later")]
    RateLimited,
    #[error("upstream returned HTTP {status}")]
    Api { status: u16 },
    #[error("response decode error: {0}")]
    Decode(String),
    #[error("empty search term")]
    EmptyTerm,
}

/// Order system boundary (§ order fetch and term search)
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Fetch one order by id. Absent order is `Ok(None)`, never an error.
    async fn fetch_order(&self, id: &str) -> Result<Option<OrderRecord>, AdapterError>;

    /// Search orders by free term (email or normalized phone), newest first,
    /// bounded page size. Callers never pass an empty term.
    async fn search_orders(&self, term: &str) -> Result<Vec<OrderRecord>, AdapterError>;
}

/// Shipment lookup boundary: raw parcel payload for an order number
#[async_trait]
pub trait ParcelApi: Send + Sync {
    /// Raw upstream payload; shape varies and is interpreted by
    /// [`parcels::extract_tracking_number`]. Absent parcel is `Ok(None)`.
    async fn find_parcel(&self, order_number: &str) -> Result<Option<Value>, AdapterError>;
}

/// Carrier tracking boundary: required single-resource fetch
#[async_trait]
pub trait CarrierApi: Send + Sync {
    /// Raw tracking payload. Any transport or HTTP error is an error here;
    /// the caller decides whether it is terminal.
    async fn track(&self, tracking_number: &str) -> Result<Value, AdapterError>;
}
