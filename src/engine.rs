//! Resolution engine
//! Walks the identifier priority chain (order number, email, phone, tracking
//! number), probing the upstream adapters with short-circuit on the first
//! terminal outcome. Phone candidates are probed concurrently with a
//! deterministic generation-order tie-break.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::parcels::extract_tracking_number;
use crate::adapters::{
    CarrierApi, CarrierClient, OrderApi, OrderRecord, OrdersClient, ParcelApi, ParcelsClient,
};
use crate::config::{AppConfig, ConfigError, EngineConfig};
use crate::country::is_international;
use crate::error::ResolveError;
use crate::identifiers::IdentifierSet;
use crate::normalizer::{normalize, TrackingRecord};
use crate::phone;
use crate::trace::ResolutionTrace;

/// Which strategy produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    OrderNumber,
    Email,
    Phone,
    TrackingNumber,
    NotFound,
}

impl std::fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderNumber => write!(f, "order_number"),
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
            Self::TrackingNumber => write!(f, "tracking_number"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

/// Terminal state of one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Tracking number and tracking status resolved
    Resolved,
    /// An order was found but no tracking number exists anywhere;
    /// found-but-incomplete, distinct from not found
    ResolvedNoTracking,
    /// International destination detected; chain stopped early
    International,
    NotFound,
}

impl std::fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved => write!(f, "resolved"),
            Self::ResolvedNoTracking => write!(f, "resolved_no_tracking"),
            Self::International => write!(f, "international"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

/// Immutable result of one resolution, constructed fresh per request
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    pub path: ResolutionPath,
    pub outcome: ResolutionOutcome,
    pub tracking_number: Option<String>,
    pub order: Option<OrderRecord>,
    pub tracking: Option<TrackingRecord>,
    pub is_international: bool,
    pub trace: Vec<String>,
}

impl ResolutionResult {
    pub fn found(&self) -> bool {
        matches!(
            self.outcome,
            ResolutionOutcome::Resolved | ResolutionOutcome::ResolvedNoTracking
        )
    }

    /// Minimal handoff payload for the response composer
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            first_name: self
                .order
                .as_ref()
                .and_then(|o| o.customer_first_name.clone()),
            tracking_number: self.tracking_number.clone(),
            tracking_link: self.tracking.as_ref().and_then(|t| t.tracking_link.clone()),
            status: self.tracking.as_ref().map(|t| t.status.clone()),
            history_text: self
                .tracking
                .as_ref()
                .map(|t| t.history_text())
                .unwrap_or_default(),
            found: self.found(),
            is_international: self.is_international,
        }
    }

    fn not_found(trace: ResolutionTrace) -> Self {
        Self {
            path: ResolutionPath::NotFound,
            outcome: ResolutionOutcome::NotFound,
            tracking_number: None,
            order: None,
            tracking: None,
            is_international: false,
            trace: trace.into_lines(),
        }
    }
}

/// What the out-of-scope composer needs, nothing more
#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub first_name: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_link: Option<String>,
    pub status: Option<String>,
    pub history_text: String,
    pub found: bool,
    pub is_international: bool,
}

/// Intermediate terminal hit while the trace is still being built
struct Hit {
    outcome: ResolutionOutcome,
    tracking_number: Option<String>,
    order: Option<OrderRecord>,
    tracking: Option<TrackingRecord>,
}

impl Hit {
    fn international(order: Option<OrderRecord>, tracking: Option<TrackingRecord>) -> Self {
        Self {
            outcome: ResolutionOutcome::International,
            tracking_number: None,
            order,
            tracking,
        }
    }

    fn no_tracking(order: OrderRecord) -> Self {
        Self {
            outcome: ResolutionOutcome::ResolvedNoTracking,
            tracking_number: None,
            order: Some(order),
            tracking: None,
        }
    }

    fn into_result(self, path: ResolutionPath, trace: ResolutionTrace) -> ResolutionResult {
        let is_international = self.outcome == ResolutionOutcome::International;
        ResolutionResult {
            path,
            outcome: self.outcome,
            tracking_number: self.tracking_number,
            order: self.order,
            tracking: self.tracking,
            is_international,
            trace: trace.into_lines(),
        }
    }
}

/// The engine holds stateless adapter handles and per-call policy only;
/// running many resolutions concurrently needs no locking.
pub struct ResolutionEngine {
    orders: Arc<dyn OrderApi>,
    parcels: Arc<dyn ParcelApi>,
    carrier: Arc<dyn CarrierApi>,
    config: EngineConfig,
}

impl ResolutionEngine {
    pub fn new(
        orders: Arc<dyn OrderApi>,
        parcels: Arc<dyn ParcelApi>,
        carrier: Arc<dyn CarrierApi>,
        config: EngineConfig,
    ) -> Self {
        Self {
            orders,
            parcels,
            carrier,
            config,
        }
    }

    /// Build the engine with the reqwest-backed clients. Configuration
    /// problems fail here, at startup.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Arc::new(OrdersClient::new(&config.orders, &config.engine)?),
            Arc::new(ParcelsClient::new(&config.parcels)?),
            Arc::new(CarrierClient::new(&config.carrier)?),
            config.engine.clone(),
        ))
    }

    /// Resolve an identifier set to a single shipment record.
    ///
    /// Strategies are tried in fixed priority order and the chain stops at
    /// the first terminal outcome. An absent or malformed identifier is
    /// never an error; `Err` only signals a transport failure on a
    /// sequential single-shot upstream call.
    pub async fn resolve(&self, ids: &IdentifierSet) -> Result<ResolutionResult, ResolveError> {
        let mut trace = ResolutionTrace::new();

        if let Some(order_number) = ids.order_number() {
            if let Some(hit) = self.resolve_by_order_number(order_number, &mut trace).await? {
                return Ok(hit.into_result(ResolutionPath::OrderNumber, trace));
            }
        } else {
            trace.push("order number: absent, skipping");
        }

        if let Some(email) = ids.email() {
            trace.push(format!("email: searching orders for {}", email));
            if let Some(hit) = self.search_resolve(email, &mut trace).await? {
                return Ok(hit.into_result(ResolutionPath::Email, trace));
            }
            trace.push("email: no match");
        } else {
            trace.push("email: absent, skipping");
        }

        if let Some(raw_phone) = ids.phone() {
            if let Some(hit) = self.resolve_by_phone(raw_phone, &mut trace).await {
                return Ok(hit.into_result(ResolutionPath::Phone, trace));
            }
        } else {
            trace.push("phone: absent, skipping");
        }

        if let Some(tracking_number) = ids.tracking_number() {
            let hit = self
                .resolve_by_tracking_number(tracking_number, &mut trace)
                .await?;
            return Ok(hit.into_result(ResolutionPath::TrackingNumber, trace));
        }
        trace.push("tracking number: absent, skipping");

        trace.push("resolution exhausted: not found");
        Ok(ResolutionResult::not_found(trace))
    }

    /// Priority 1: direct order fetch, then parcel lookup.
    /// `Ok(None)` means the order does not exist and the chain continues.
    async fn resolve_by_order_number(
        &self,
        order_number: &str,
        trace: &mut ResolutionTrace,
    ) -> Result<Option<Hit>, ResolveError> {
        trace.push(format!("order number: fetching order {}", order_number));
        let order = self
            .orders
            .fetch_order(order_number)
            .await
            .map_err(|e| ResolveError::upstream("order fetch", e))?;

        let Some(order) = order else {
            trace.push(format!("order number: no order {}", order_number));
            return Ok(None);
        };
        trace.push(format!(
            "order number: found order {} (country: {})",
            order.id,
            order.country.as_deref().unwrap_or("unknown")
        ));

        if is_international(order.country.as_deref(), &self.config.home_country) {
            trace.push("order number: international destination, stopping early");
            return Ok(Some(Hit::international(Some(order), None)));
        }

        let hit = self
            .complete_with_tracking(order, "order number", trace)
            .await?;
        Ok(Some(hit))
    }

    /// Shared search-resolve sub-routine (email and each phone candidate).
    /// `Ok(None)` means no order matched the term, a normal outcome.
    async fn search_resolve(
        &self,
        term: &str,
        trace: &mut ResolutionTrace,
    ) -> Result<Option<Hit>, ResolveError> {
        let matches = self
            .orders
            .search_orders(term)
            .await
            .map_err(|e| ResolveError::upstream("order search", e))?;

        if matches.is_empty() {
            trace.push(format!("search '{}': no orders", term));
            return Ok(None);
        }

        let top = &matches[0];
        trace.push(format!(
            "search '{}': {} order(s), top match {} (country: {})",
            term,
            matches.len(),
            top.id,
            top.country.as_deref().unwrap_or("unknown")
        ));

        // A sub-routine international hit terminates the whole resolution,
        // even from inside the phone fan-out
        if is_international(top.country.as_deref(), &self.config.home_country) {
            trace.push(format!(
                "search '{}': international destination, stopping early",
                term
            ));
            return Ok(Some(Hit::international(Some(top.clone()), None)));
        }

        // Fetch the full order for attributes the search entry may lack
        // (first name, metadata)
        trace.push(format!("search '{}': fetching full order {}", term, top.id));
        let order = self
            .orders
            .fetch_order(&top.id)
            .await
            .map_err(|e| ResolveError::upstream("order fetch", e))?
            .unwrap_or_else(|| top.clone());

        let context = format!("search '{}'", term);
        let hit = self.complete_with_tracking(order, &context, trace).await?;
        Ok(Some(hit))
    }

    /// Priority 3: probe all candidates concurrently, wait for every probe,
    /// then select by candidate generation order. A candidate whose probe
    /// fails transport-level degrades to no-match for that candidate only.
    async fn resolve_by_phone(&self, raw: &str, trace: &mut ResolutionTrace) -> Option<Hit> {
        let candidates = phone::candidates(raw);
        if candidates.is_empty() {
            trace.push("phone: no digits in input, skipping");
            return None;
        }
        trace.push(format!(
            "phone: probing {} candidate(s) concurrently",
            candidates.len()
        ));

        let probes = candidates.iter().map(|candidate| async move {
            let mut local = ResolutionTrace::new();
            match self.search_resolve(candidate, &mut local).await {
                Ok(hit) => (local, hit),
                Err(e) => {
                    local.push(format!(
                        "phone candidate {}: upstream failure ({}), treated as no match",
                        candidate, e
                    ));
                    (local, None)
                }
            }
        });

        // Wait-all before selecting: the winner is the first candidate in
        // generation order with a result, regardless of completion order
        let results = join_all(probes).await;

        let mut selected = None;
        for (candidate, (local, hit)) in candidates.iter().zip(results) {
            trace.extend(local);
            if selected.is_none() {
                if let Some(hit) = hit {
                    trace.push(format!("phone: candidate {} selected", candidate));
                    selected = Some(hit);
                }
            }
        }
        if selected.is_none() {
            trace.push("phone: no candidate matched");
        }
        selected
    }

    /// Priority 4 (last fallback): direct carrier fetch. Always terminal;
    /// a transport or HTTP failure here surfaces to the caller.
    async fn resolve_by_tracking_number(
        &self,
        tracking_number: &str,
        trace: &mut ResolutionTrace,
    ) -> Result<Hit, ResolveError> {
        trace.push(format!(
            "tracking number: fetching status for {}",
            tracking_number
        ));
        let raw = self
            .carrier
            .track(tracking_number)
            .await
            .map_err(|e| ResolveError::upstream("tracking fetch", e))?;
        let tracking = normalize(&raw, Some(tracking_number), &self.config);

        if is_international(
            tracking.destination_country.as_deref(),
            &self.config.home_country,
        ) {
            trace.push("tracking number: international destination, stopping early");
            return Ok(Hit::international(None, Some(tracking)));
        }

        trace.push(format!("tracking number: status '{}'", tracking.status));
        Ok(Hit {
            outcome: ResolutionOutcome::Resolved,
            tracking_number: Some(tracking_number.to_string()),
            order: None,
            tracking: Some(tracking),
        })
    }

    /// Found-order tail shared by the order-number path and the search
    /// sub-routine: resolve a tracking number from order metadata or the
    /// parcel lookup, then fetch and normalize the tracking status. An order
    /// with no tracking number anywhere is found-but-incomplete.
    async fn complete_with_tracking(
        &self,
        order: OrderRecord,
        context: &str,
        trace: &mut ResolutionTrace,
    ) -> Result<Hit, ResolveError> {
        let tracking_number = match order.tracking_meta.clone() {
            Some(meta) => {
                trace.push(format!(
                    "{}: tracking number {} found in order metadata",
                    context, meta
                ));
                Some(meta)
            }
            None => {
                trace.push(format!("{}: looking up parcel for order {}", context, order.id));
                let payload = self
                    .parcels
                    .find_parcel(&order.id)
                    .await
                    .map_err(|e| ResolveError::upstream("parcel lookup", e))?;
                let extracted = payload.as_ref().and_then(extract_tracking_number);
                match &extracted {
                    Some(number) => trace.push(format!(
                        "{}: parcel lookup yielded tracking number {}",
                        context, number
                    )),
                    None => trace.push(format!("{}: no tracking number found", context)),
                }
                extracted
            }
        };

        let Some(tracking_number) = tracking_number else {
            return Ok(Hit::no_tracking(order));
        };

        trace.push(format!(
            "{}: fetching tracking status for {}",
            context, tracking_number
        ));
        let raw = self
            .carrier
            .track(&tracking_number)
            .await
            .map_err(|e| ResolveError::upstream("tracking fetch", e))?;
        let tracking = normalize(&raw, Some(&tracking_number), &self.config);
        trace.push(format!("{}: tracking status '{}'", context, tracking.status));

        Ok(Hit {
            outcome: ResolutionOutcome::Resolved,
            tracking_number: Some(tracking_number),
            order: Some(order),
            tracking: Some(tracking),
        })
    }
}
