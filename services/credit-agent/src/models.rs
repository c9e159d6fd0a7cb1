use credit_engine::{BnplQuote, KeySignals, RawBnplFeatures, ScoreComponents};
use quote_events::{CloudEvent, CreditQuoteResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

// ===== AP2 Mandate =====
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ap2Mandate {
    pub actor: Map<String, Value>,
    pub cart: Map<String, Value>,
    pub payment: Map<String, Value>,
}

impl Ap2Mandate {
    /// `actor.id`, or "unknown" when the mandate carries none
    pub fn actor_id(&self) -> String {
        match self.actor.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => "unknown".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

// ===== Credit Quote =====
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreditQuoteRequest {
    pub mandate: Ap2Mandate,

    /// Kept untyped so a malformed profile can be dropped instead of
    /// failing the request
    #[serde(default)]
    pub credit_profile: Option<Value>,

    #[validate(range(min = 1000.0, max = 50000.0))]
    pub requested_amount: f64,

    #[validate(range(min = 1, max = 60))]
    pub term_months: u32,

    #[serde(default = "default_purpose")]
    pub purpose: String,
}

fn default_purpose() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditQuoteResponse {
    pub quote_id: String,

    #[serde(flatten)]
    pub quote: CreditQuoteResult,
}

// ===== BNPL Quote =====
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BnplQuoteRequest {
    #[validate(range(min = 100.0, max = 5000.0))]
    pub amount: f64,

    #[validate(range(min = 1, max = 12))]
    pub tenor: u32,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub on_time_rate: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub utilization: f64,
}

impl From<&BnplQuoteRequest> for RawBnplFeatures {
    fn from(request: &BnplQuoteRequest) -> Self {
        Self {
            amount: Some(request.amount),
            tenor: Some(f64::from(request.tenor)),
            on_time_rate: Some(request.on_time_rate),
            utilization: Some(request.utilization),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BnplQuoteQuery {
    #[serde(default)]
    pub emit_ce: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BnplQuoteResponse {
    #[serde(flatten)]
    pub quote: BnplQuote,

    pub key_signals: KeySignals,

    pub components: ScoreComponents,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_event: Option<CloudEvent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

// ===== Service Info =====
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Endpoints {
    pub credit_quote: String,
    pub bnpl_quote: String,
    pub policies: String,
    pub health: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "Okra Credit Agent".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            status: "operational".to_string(),
            endpoints: Endpoints {
                credit_quote: "/credit/quote".to_string(),
                bnpl_quote: "/bnpl/quote".to_string(),
                policies: "/policies".to_string(),
                health: "/health".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
