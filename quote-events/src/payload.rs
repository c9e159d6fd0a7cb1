//! Event payloads

use chrono::{DateTime, Utc};
use credit_engine::{decimal_to_f64, BnplFeatures, BnplQuote, CreditQuote, KeySignals};
use serde::{Deserialize, Serialize};

/// Credit quote as published, money as plain numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CreditQuoteResult {
    pub approved: bool,
    pub credit_limit: f64,
    pub apr: f64,
    pub term_months: u32,
    pub monthly_payment: f64,
    pub reasons: Vec<String>,
    pub review_required: bool,
    pub policy_version: String,
}

impl From<&CreditQuote> for CreditQuoteResult {
    fn from(quote: &CreditQuote) -> Self {
        Self {
            approved: quote.approved,
            credit_limit: decimal_to_f64(quote.credit_limit),
            apr: decimal_to_f64(quote.apr),
            term_months: quote.term_months,
            monthly_payment: decimal_to_f64(quote.monthly_payment),
            reasons: quote.reasons.clone(),
            review_required: quote.review_required,
            policy_version: quote.policy_version.clone(),
        }
    }
}

/// Payload of `ocn.okra.credit_quote.v1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditQuoteData {
    /// Quote identifier
    pub quote_id: String,

    /// Actor/borrower identifier
    pub actor_id: String,

    /// AP2 mandate as received
    pub mandate: serde_json::Value,

    /// Quote result
    pub quote_result: CreditQuoteResult,

    /// Policy version used
    pub policy_version: String,

    /// Issue time
    pub timestamp: DateTime<Utc>,
}

impl CreditQuoteData {
    /// Build payload for a quote
    pub fn new(
        quote_id: impl Into<String>,
        actor_id: impl Into<String>,
        mandate: serde_json::Value,
        quote: &CreditQuote,
    ) -> Self {
        Self {
            quote_id: quote_id.into(),
            actor_id: actor_id.into(),
            mandate,
            quote_result: CreditQuoteResult::from(quote),
            policy_version: quote.policy_version.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Emitter metadata attached to BNPL payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PayloadMetadata {
    pub service: String,
    pub version: String,
    pub feature: String,
}

impl Default for PayloadMetadata {
    fn default() -> Self {
        Self {
            service: "okra".to_string(),
            version: "1.0.0".to_string(),
            feature: "bnpl_scoring".to_string(),
        }
    }
}

/// Payload of `ocn.okra.bnpl_quote.v1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BnplQuotePayload {
    /// Offer
    pub quote: BnplQuote,

    /// Normalized features the offer was scored on
    pub features: BnplFeatures,

    /// Key signals from scoring
    pub key_signals: KeySignals,

    /// Issue time
    pub timestamp: DateTime<Utc>,

    /// Emitter metadata
    pub metadata: PayloadMetadata,
}

impl BnplQuotePayload {
    /// Build payload for a quote
    pub fn new(quote: BnplQuote, features: BnplFeatures, key_signals: KeySignals) -> Self {
        Self {
            quote,
            features,
            key_signals,
            timestamp: Utc::now(),
            metadata: PayloadMetadata::default(),
        }
    }
}
