//! Envelope schema validation
//!
//! Checks published envelopes against the attributes and payload fields
//! their event type promises to consumers

use crate::types::{EventType, CONTENT_TYPE, SPEC_VERSION};
use crate::{Error, Result};
use serde_json::Value;
use tracing::debug;

const REQUIRED_ATTRIBUTES: [&str; 8] = [
    "specversion",
    "type",
    "source",
    "id",
    "time",
    "subject",
    "datacontenttype",
    "data",
];

const BNPL_QUOTE_FIELDS: [&str; 6] = [
    "limit",
    "apr",
    "term_months",
    "monthly_payment",
    "score",
    "approved",
];

const CREDIT_DATA_FIELDS: [&str; 6] = [
    "quote_id",
    "actor_id",
    "mandate",
    "quote_result",
    "policy_version",
    "timestamp",
];

const CREDIT_RESULT_FIELDS: [&str; 8] = [
    "approved",
    "credit_limit",
    "apr",
    "term_months",
    "monthly_payment",
    "reasons",
    "review_required",
    "policy_version",
];

/// Schema validator
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Create new schema validator
    pub fn new() -> Self {
        Self
    }

    /// Validate an envelope as JSON
    pub fn validate(&self, event: &Value) -> Result<()> {
        let object = event
            .as_object()
            .ok_or_else(|| invalid("envelope is not an object"))?;

        if let Some(missing) = REQUIRED_ATTRIBUTES.iter().find(|f| !object.contains_key(**f)) {
            return Err(invalid(format!("missing attribute {}", missing)));
        }

        if event["specversion"] != SPEC_VERSION {
            return Err(invalid("specversion must be 1.0"));
        }
        if event["datacontenttype"] != CONTENT_TYPE {
            return Err(invalid("datacontenttype must be application/json"));
        }

        let event_type = event["type"]
            .as_str()
            .and_then(EventType::from_type_name)
            .ok_or_else(|| invalid(format!("unknown event type {}", event["type"])))?;

        if !event["data"].is_object() {
            return Err(invalid("data is not an object"));
        }

        match event_type {
            EventType::BnplQuote => self.validate_bnpl(event)?,
            EventType::CreditQuote => self.validate_credit(&event["data"])?,
        }

        debug!("Schema validation passed for {}", event_type.type_name());
        Ok(())
    }

    /// Convenience wrapper returning a flag
    pub fn is_valid(&self, event: &Value) -> bool {
        self.validate(event).is_ok()
    }

    fn validate_bnpl(&self, event: &Value) -> Result<()> {
        if event["source"] != EventType::BnplQuote.default_source() {
            return Err(invalid("BNPL quote source must be okra"));
        }

        let data = &event["data"];
        // Payloads either nest the offer under `quote` or carry it flat
        let quote = data.get("quote").unwrap_or(data);

        require_fields(quote, &BNPL_QUOTE_FIELDS)?;

        match quote["score"].as_f64() {
            Some(score) if (0.0..=1.0).contains(&score) => {}
            _ => return Err(invalid("score must be a number in [0, 1]")),
        }
        if !quote["approved"].is_boolean() {
            return Err(invalid("approved must be a boolean"));
        }

        Ok(())
    }

    fn validate_credit(&self, data: &Value) -> Result<()> {
        require_fields(data, &CREDIT_DATA_FIELDS)?;
        require_fields(&data["quote_result"], &CREDIT_RESULT_FIELDS)?;

        if !data["mandate"].is_object() {
            return Err(invalid("mandate must be an object"));
        }
        if !data["quote_result"]["reasons"].is_array() {
            return Err(invalid("reasons must be an array"));
        }

        Ok(())
    }
}

fn require_fields(value: &Value, fields: &[&str]) -> Result<()> {
    match fields.iter().find(|f| value.get(**f).is_none()) {
        Some(missing) => Err(invalid(format!("missing field {}", missing))),
        None => Ok(()),
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidSchema(message.into())
}
