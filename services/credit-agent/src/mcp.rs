//! MCP verb shim served over HTTP at `/mcp/invoke`

use crate::models::CreditQuoteRequest;
use crate::services::QuoteService;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

pub const POLICIES_URI: &str = "okra://policies";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub verb: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub ok: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl McpResponse {
    fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

pub async fn invoke(service: &QuoteService, request: McpRequest) -> McpResponse {
    debug!(verb = %request.verb, "MCP invoke");

    match request.verb.as_str() {
        "getStatus" => McpResponse::success(json!({"agent": "okra", "status": "active"})),
        "listTools" => McpResponse::success(json!({ "tools": tool_descriptors() })),
        "getCreditQuote" => get_credit_quote(service, request.args).await,
        "listPolicies" => snapshot(service),
        "listResources" => McpResponse::success(json!({ "resources": resource_descriptors() })),
        "readResource" => match request.args.get("uri") {
            Some(Value::String(uri)) if uri == POLICIES_URI => snapshot(service),
            Some(Value::String(uri)) => McpResponse::failure(format!("Unknown resource: {}", uri)),
            _ => McpResponse::failure("Missing required argument: uri"),
        },
        other => McpResponse::failure(format!("Unsupported verb: {}", other)),
    }
}

async fn get_credit_quote(service: &QuoteService, args: Map<String, Value>) -> McpResponse {
    for name in ["mandate", "requested_amount", "term_months"] {
        if !args.contains_key(name) {
            return McpResponse::failure(format!("Missing required argument: {}", name));
        }
    }

    let request: CreditQuoteRequest = match serde_json::from_value(Value::Object(args)) {
        Ok(request) => request,
        Err(e) => return McpResponse::failure(format!("Invalid arguments: {}", e)),
    };

    match service.credit_quote(request).await {
        Ok(response) => match serde_json::to_value(&response) {
            Ok(data) => McpResponse::success(data),
            Err(e) => McpResponse::failure(e.to_string()),
        },
        Err(e) => McpResponse::failure(e.to_string()),
    }
}

fn snapshot(service: &QuoteService) -> McpResponse {
    match serde_json::to_value(service.policies()) {
        Ok(data) => McpResponse::success(data),
        Err(e) => McpResponse::failure(e.to_string()),
    }
}

fn tool_descriptors() -> Value {
    json!([
        {
            "name": "getCreditQuote",
            "description": "Get a credit quote based on AP2 mandate and credit profile",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "mandate": {
                        "type": "object",
                        "description": "AP2-aligned mandate with actor, cart, and payment context",
                        "properties": {
                            "actor": {"type": "object"},
                            "cart": {"type": "object"},
                            "payment": {"type": "object"}
                        },
                        "required": ["actor", "cart", "payment"]
                    },
                    "credit_profile": {
                        "type": "object",
                        "properties": {
                            "credit_score": {"type": "integer", "minimum": 300, "maximum": 850},
                            "annual_income": {"type": "number", "minimum": 0},
                            "debt_to_income_ratio": {"type": "number", "minimum": 0, "maximum": 1},
                            "employment_status": {"type": "string"},
                            "credit_history_months": {"type": "integer", "minimum": 0}
                        }
                    },
                    "requested_amount": {"type": "number", "minimum": 1000, "maximum": 50000},
                    "term_months": {"type": "integer", "minimum": 1, "maximum": 60},
                    "purpose": {"type": "string", "default": "general"}
                },
                "required": ["mandate", "requested_amount", "term_months"]
            }
        },
        {
            "name": "listPolicies",
            "description": "List current credit policies and parameters",
            "inputSchema": {"type": "object", "properties": {}, "required": []}
        }
    ])
}

fn resource_descriptors() -> Value {
    json!([{
        "uri": POLICIES_URI,
        "name": "Credit Policies",
        "description": "Current credit policies and parameters",
        "mimeType": "application/json"
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_engine::{BnplScoringEngine, CreditPolicyEngine};
    use quote_events::Publisher;

    fn service() -> QuoteService {
        QuoteService::new(
            CreditPolicyEngine::default(),
            BnplScoringEngine::default(),
            Publisher::disabled(),
            "https://okra.ocn.ai/v1",
        )
    }

    fn request(verb: &str, args: Value) -> McpRequest {
        serde_json::from_value(json!({"verb": verb, "args": args})).unwrap()
    }

    #[tokio::test]
    async fn test_get_status() {
        let response = invoke(&service(), request("getStatus", json!({}))).await;

        assert!(response.ok);
        assert_eq!(response.data.unwrap(), json!({"agent": "okra", "status": "active"}));
    }

    #[tokio::test]
    async fn test_list_tools() {
        let response = invoke(&service(), request("listTools", json!({}))).await;
        let data = response.data.unwrap();
        let names: Vec<&str> = data["tools"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|tool| tool["name"].as_str())
            .collect();

        assert_eq!(names, vec!["getCreditQuote", "listPolicies"]);
    }

    #[tokio::test]
    async fn test_get_credit_quote_evaluates() {
        let response = invoke(
            &service(),
            request(
                "getCreditQuote",
                json!({
                    "mandate": {"actor": {"id": "agent_7"}, "cart": {}, "payment": {}},
                    "credit_profile": {"credit_score": 680, "annual_income": 60000},
                    "requested_amount": 10000,
                    "term_months": 24
                }),
            ),
        )
        .await;

        assert!(response.ok);
        let data = response.data.unwrap();
        assert_eq!(data["review_required"], json!(true));
        assert_eq!(data["apr"], json!(12.99));
        assert!(data["quote_id"].as_str().unwrap().starts_with("quote_agent_7_"));
    }

    #[tokio::test]
    async fn test_get_credit_quote_missing_argument() {
        let response = invoke(
            &service(),
            request(
                "getCreditQuote",
                json!({"mandate": {"actor": {}, "cart": {}, "payment": {}}, "term_months": 12}),
            ),
        )
        .await;

        assert!(!response.ok);
        assert_eq!(
            response.error.as_deref(),
            Some("Missing required argument: requested_amount")
        );
    }

    #[tokio::test]
    async fn test_read_resource() {
        let svc = service();

        let policies = invoke(&svc, request("readResource", json!({"uri": POLICIES_URI}))).await;
        assert!(policies.ok);
        assert_eq!(policies.data.unwrap()["policy_version"], json!("v1.0.0"));

        let unknown = invoke(&svc, request("readResource", json!({"uri": "okra://quotes"}))).await;
        assert!(!unknown.ok);
        assert_eq!(unknown.error.as_deref(), Some("Unknown resource: okra://quotes"));
    }

    #[tokio::test]
    async fn test_unsupported_verb() {
        let response = invoke(&service(), request("deleteEverything", json!({}))).await;

        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("Unsupported verb: deleteEverything"));
    }
}
