//! CloudEvents envelope

use crate::types::{EventType, CONTENT_TYPE, SPEC_VERSION};
use crate::payload::{BnplQuotePayload, CreditQuoteData};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// CloudEvents 1.0 envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    /// Spec version, always "1.0"
    pub specversion: String,

    /// Event ID (UUIDv4)
    pub id: String,

    /// Event source
    pub source: String,

    /// Event type
    #[serde(rename = "type")]
    pub event_type: String,

    /// Subject: actor ID for credit quotes, trace ID for BNPL quotes
    pub subject: Option<String>,

    /// Emission time
    pub time: DateTime<Utc>,

    /// Payload content type
    pub datacontenttype: String,

    /// Payload schema URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataschema: Option<String>,

    /// Payload
    pub data: serde_json::Value,
}

impl CloudEvent {
    /// Create new event
    pub fn new(
        event_type: EventType,
        source: impl Into<String>,
        subject: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            specversion: SPEC_VERSION.to_string(),
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            event_type: event_type.type_name().to_string(),
            subject: Some(subject.into()),
            time: Utc::now(),
            datacontenttype: CONTENT_TYPE.to_string(),
            dataschema: None,
            data,
        }
    }

    /// Credit quote event, subject is the actor ID
    pub fn credit_quote(data: &CreditQuoteData, source: impl Into<String>) -> Result<Self> {
        Ok(Self::new(
            EventType::CreditQuote,
            source,
            data.actor_id.clone(),
            serde_json::to_value(data)?,
        ))
    }

    /// BNPL quote event, subject is the trace ID
    pub fn bnpl_quote(trace_id: impl Into<String>, payload: &BnplQuotePayload) -> Result<Self> {
        Ok(Self::new(
            EventType::BnplQuote,
            EventType::BnplQuote.default_source(),
            trace_id,
            serde_json::to_value(payload)?,
        ))
    }

    /// Set payload schema URI
    pub fn with_dataschema(mut self, dataschema: impl Into<String>) -> Self {
        self.dataschema = Some(dataschema.into());
        self
    }

    /// Known event type, if any
    pub fn kind(&self) -> Option<EventType> {
        EventType::from_type_name(&self.event_type)
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_creation() {
        let event = CloudEvent::new(
            EventType::CreditQuote,
            "https://okra.ocn.ai/v1",
            "user_123",
            json!({"quote_id": "quote_user_123_abc"}),
        );

        assert_eq!(event.specversion, "1.0");
        assert_eq!(event.event_type, "ocn.okra.credit_quote.v1");
        assert_eq!(event.subject.as_deref(), Some("user_123"));
        assert_eq!(event.datacontenttype, "application/json");
        assert_eq!(event.kind(), Some(EventType::CreditQuote));
        assert!(Uuid::parse_str(&event.id).is_ok());
    }

    #[test]
    fn test_event_ids_unique() {
        let a = CloudEvent::new(EventType::BnplQuote, "okra", "trace", json!({}));
        let b = CloudEvent::new(EventType::BnplQuote, "okra", "trace", json!({}));

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_type_attribute_name() {
        let event = CloudEvent::new(EventType::BnplQuote, "okra", "trace", json!({}));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], "ocn.okra.bnpl_quote.v1");
        assert!(value.get("event_type").is_none());
        assert!(value.get("dataschema").is_none());
    }

    #[test]
    fn test_event_serialization() {
        let event = CloudEvent::new(EventType::BnplQuote, "okra", "trace", json!({"score": 0.8}))
            .with_dataschema("https://schemas.ocn.ai/events/v1/okra.bnpl_quote.v1.schema.json");

        let bytes = event.to_bytes().unwrap();
        let decoded = CloudEvent::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, event);
    }
}
