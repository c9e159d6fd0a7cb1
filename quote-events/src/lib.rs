//! CloudEvents for Okra quotes
//!
//! Provides:
//! - CloudEvents 1.0 envelopes for credit and BNPL quotes
//! - Envelope validation against the published event types
//! - Fire-and-forget publishing through pluggable sinks
//! - Observability via Prometheus metrics

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod envelope;
pub mod error;
pub mod metrics;
pub mod payload;
pub mod publisher;
pub mod schema_validator;
pub mod types;

pub use envelope::CloudEvent;
pub use error::{Error, Result};
pub use payload::{BnplQuotePayload, CreditQuoteData, CreditQuoteResult};
pub use publisher::{EventSink, LogSink, MemorySink, Publisher};
pub use schema_validator::SchemaValidator;
pub use types::EventType;
