use crate::config::Config;
use crate::errors::{AgentError, Result};
use crate::metrics::{BNPL_QUOTES_TOTAL, CREDIT_QUOTES_TOTAL};
use crate::models::*;
use crate::quote_id::quote_id;
use credit_engine::{
    BnplConfig, BnplScoringEngine, CreditPolicyEngine, CreditProfile, CreditRequest,
    PolicySnapshot, RawBnplFeatures, DEFAULT_SEED,
};
use quote_events::{BnplQuotePayload, CloudEvent, CreditQuoteData, CreditQuoteResult, Publisher};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

/// Request-facing wrapper around the credit and BNPL engines.
/// Engines are immutable, so one instance serves every worker.
#[derive(Debug)]
pub struct QuoteService {
    credit_engine: CreditPolicyEngine,
    bnpl_engine: BnplScoringEngine,
    publisher: Publisher,
    event_source: String,
}

impl QuoteService {
    pub fn new(
        credit_engine: CreditPolicyEngine,
        bnpl_engine: BnplScoringEngine,
        publisher: Publisher,
        event_source: impl Into<String>,
    ) -> Self {
        Self {
            credit_engine,
            bnpl_engine,
            publisher,
            event_source: event_source.into(),
        }
    }

    /// Build engines from configuration, loading the policy file if one is set
    pub fn from_config(config: &Config, publisher: Publisher) -> Result<Self> {
        let policy = config.load_policy()?;
        let credit_engine = CreditPolicyEngine::new(policy)?;
        let bnpl_engine = BnplScoringEngine::new(BnplConfig::default())?;

        Ok(Self::new(
            credit_engine,
            bnpl_engine,
            publisher,
            config.events.source.clone(),
        ))
    }

    pub fn policies(&self) -> PolicySnapshot {
        self.credit_engine.list_policies()
    }

    /// Evaluate a credit quote and emit its event. Policy declines are
    /// successful quotes; only malformed requests are errors.
    pub async fn credit_quote(&self, request: CreditQuoteRequest) -> Result<CreditQuoteResponse> {
        Validate::validate(&request)?;

        let actor_id = request.mandate.actor_id();
        let amount = Decimal::from_str(&request.requested_amount.to_string())
            .map_err(|e| AgentError::ValidationError(format!("requested_amount: {}", e)))?;

        let credit_request = CreditRequest {
            amount,
            term_months: request.term_months,
            purpose: request.purpose.clone(),
            actor_id: actor_id.clone(),
            profile: parse_profile(request.credit_profile.as_ref()),
        };

        let quote = self.credit_engine.evaluate(&credit_request);
        let quote_id = quote_id(&credit_request)
            .map_err(|e| AgentError::InternalError(format!("Failed to derive quote id: {}", e)))?;

        let decision = quote.decision();
        CREDIT_QUOTES_TOTAL
            .with_label_values(&[decision.as_str()])
            .inc();

        info!(
            quote_id = %quote_id,
            actor_id = %actor_id,
            decision = decision.as_str(),
            "Credit quote evaluated"
        );

        self.emit_credit_event(&quote_id, &actor_id, &request.mandate, &quote)
            .await;

        Ok(CreditQuoteResponse {
            quote_id,
            quote: CreditQuoteResult::from(&quote),
        })
    }

    async fn emit_credit_event(
        &self,
        quote_id: &str,
        actor_id: &str,
        mandate: &Ap2Mandate,
        quote: &credit_engine::CreditQuote,
    ) {
        let mandate = match serde_json::to_value(mandate) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize mandate for {}: {}", quote_id, e);
                return;
            }
        };

        let data = CreditQuoteData::new(quote_id, actor_id, mandate, quote);
        match CloudEvent::credit_quote(&data, self.event_source.clone()) {
            Ok(event) => {
                debug!(event_id = %event.id, "Credit quote event built");
                self.publisher.emit(&event).await;
            }
            Err(e) => warn!("Failed to build credit quote event for {}: {}", quote_id, e),
        }
    }

    /// Score a BNPL application. With `emit_ce` the quote event is
    /// published and echoed back together with its trace ID.
    pub async fn bnpl_quote(
        &self,
        request: BnplQuoteRequest,
        emit_ce: bool,
    ) -> Result<BnplQuoteResponse> {
        Validate::validate(&request)?;

        let features = self
            .bnpl_engine
            .validate_features(&RawBnplFeatures::from(&request));
        let scored = self.bnpl_engine.score(&features, DEFAULT_SEED);
        let quote = self
            .bnpl_engine
            .generate_quote(scored.score, features.amount, features.tenor);

        BNPL_QUOTES_TOTAL
            .with_label_values(&[if quote.approved { "true" } else { "false" }])
            .inc();

        info!(
            score = quote.score,
            approved = quote.approved,
            limit = quote.limit,
            "BNPL quote generated"
        );

        let mut response = BnplQuoteResponse {
            quote,
            key_signals: scored.key_signals,
            components: scored.components,
            cloud_event: None,
            trace_id: None,
        };

        if emit_ce {
            let trace_id = Uuid::new_v4().to_string();
            let payload = BnplQuotePayload::new(quote, features, scored.key_signals);
            let event = CloudEvent::bnpl_quote(trace_id.clone(), &payload)?;

            debug!(event_id = %event.id, trace_id = %trace_id, "BNPL quote event built");
            self.publisher.emit(&event).await;

            response.cloud_event = Some(event);
            response.trace_id = Some(trace_id);
        }

        Ok(response)
    }
}

/// A profile that is missing, empty, malformed or out of range counts as absent
fn parse_profile(raw: Option<&Value>) -> Option<CreditProfile> {
    let raw = raw?;
    match raw {
        Value::Object(fields) if fields.is_empty() => return None,
        Value::Null => return None,
        _ => {}
    }

    let profile = match serde_json::from_value::<CreditProfile>(raw.clone()) {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Discarding malformed credit profile: {}", e);
            return None;
        }
    };

    match profile.validate() {
        Ok(()) => Some(profile),
        Err(e) => {
            warn!("Discarding invalid credit profile: {}", e);
            None
        }
    }
}
