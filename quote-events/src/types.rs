//! Type definitions for quote events

use serde::{Deserialize, Serialize};

/// CloudEvents spec version emitted
pub const SPEC_VERSION: &str = "1.0";

/// Content type of every event payload
pub const CONTENT_TYPE: &str = "application/json";

/// Event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Credit quote issued
    CreditQuote,
    /// BNPL quote issued
    BnplQuote,
}

impl EventType {
    /// CloudEvents `type` attribute
    pub fn type_name(&self) -> &'static str {
        match self {
            EventType::CreditQuote => "ocn.okra.credit_quote.v1",
            EventType::BnplQuote => "ocn.okra.bnpl_quote.v1",
        }
    }

    /// Default CloudEvents `source` attribute
    pub fn default_source(&self) -> &'static str {
        match self {
            EventType::CreditQuote => "https://okra.ocn.ai/v1",
            EventType::BnplQuote => "okra",
        }
    }

    /// Look up an event type by its `type` attribute
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "ocn.okra.credit_quote.v1" => Some(EventType::CreditQuote),
            "ocn.okra.bnpl_quote.v1" => Some(EventType::BnplQuote),
            _ => None,
        }
    }

    /// Label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            EventType::CreditQuote => "credit_quote",
            EventType::BnplQuote => "bnpl_quote",
        }
    }
}
