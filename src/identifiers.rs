//! Identifier input model and the extraction boundary
//! Everything here is untrusted: fields may be absent or mis-transcribed,
//! and the engine verifies by lookup, never by pattern-matching alone

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Loosely-typed bag of customer/shipment identifiers, typically produced by
/// an extraction step from a screenshot or pasted text. All fields optional;
/// absence is never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierSet {
    pub email: Option<String>,
    /// Free-form; may contain spaces and symbols
    pub phone: Option<String>,
    pub order_number: Option<String>,
    pub tracking_number: Option<String>,
    pub customer_first_name: Option<String>,
}

impl IdentifierSet {
    /// True when no field carries a usable (non-blank) value
    pub fn is_empty(&self) -> bool {
        self.email().is_none()
            && self.phone().is_none()
            && self.order_number().is_none()
            && self.tracking_number().is_none()
    }

    pub fn email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    pub fn phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    pub fn order_number(&self) -> Option<&str> {
        non_blank(self.order_number.as_deref())
    }

    pub fn tracking_number(&self) -> Option<&str> {
        non_blank(self.tracking_number.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Boundary to the out-of-scope extraction step. Implementations may omit or
/// mis-transcribe any field; no confidence score is assumed.
pub trait IdentifierExtractor: Send + Sync {
    fn extract(&self, text: &str) -> IdentifierSet;
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

// UPU S10 shape: two letters, nine digits, two letters
static TRACKING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2}[0-9]{9}[A-Z]{2}\b").unwrap());

static ORDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:order|commande)\s*#?\s*([0-9]{3,12})").unwrap());

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+|00)?[0-9][0-9 .\-()]{7,}[0-9]").unwrap());

/// Regex-based extractor over free text. Good enough for the CLI's `--text`
/// mode; a vision/OCR front end would sit behind the same trait.
#[derive(Debug, Default)]
pub struct HeuristicExtractor;

impl IdentifierExtractor for HeuristicExtractor {
    fn extract(&self, text: &str) -> IdentifierSet {
        let email = EMAIL_RE.find(text).map(|m| m.as_str().to_string());
        let tracking_number = TRACKING_RE.find(text).map(|m| m.as_str().to_string());
        let order_number = ORDER_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        // Avoid re-reading an order number or tracking code as a phone:
        // only accept runs with at least 8 digits that are not the matched
        // order number
        let phone = PHONE_RE
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .find(|candidate| {
                let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
                digits >= 8 && Some(candidate.as_str()) != order_number.as_deref()
            });

        IdentifierSet {
            email,
            phone,
            order_number,
            tracking_number,
            customer_first_name: None,
        }
    }
}
