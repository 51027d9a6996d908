//! Resolution-level error type
//!
//! Not-found is a normal branch outcome, not an error; this type only covers
//! terminal failures the composer must report differently from "not found":
//! a transport failure on a sequential, single-shot upstream call.

use thiserror::Error;

use crate::adapters::AdapterError;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// A required single-resource fetch failed transport-level on the found
    /// path. Fan-out candidate probes never produce this; their failures are
    /// isolated and degraded to no-match for that candidate.
    #[error("upstream failure during {step}: {source}")]
    Upstream {
        step: &'static str,
        #[source]
        source: AdapterError,
    },
}

impl ResolveError {
    pub fn upstream(step: &'static str, source: AdapterError) -> Self {
        Self::Upstream { step, source }
    }
}
