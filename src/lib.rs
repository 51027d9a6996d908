//! ParcelAssist - shipment identifier resolution for support operators
//!
//! Given a bag of loosely-typed, possibly-wrong identifiers (order number,
//! email, phone, tracking code), the engine probes three upstream systems in
//! a fixed priority order and deterministically resolves a single canonical
//! tracking record, with concurrent fan-out for ambiguous phone numbers and
//! short-circuit on international shipments.

pub mod adapters;
pub mod config;
pub mod country;
pub mod engine;
pub mod error;
pub mod identifiers;
pub mod normalizer;
pub mod phone;
pub mod security;
pub mod trace;

pub use engine::{ResolutionEngine, ResolutionOutcome, ResolutionPath, ResolutionResult};
pub use error::ResolveError;
pub use identifiers::IdentifierSet;
