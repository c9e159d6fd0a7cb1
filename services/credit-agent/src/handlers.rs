use crate::errors::AgentError;
use crate::mcp::{self, McpRequest};
use crate::metrics;
use crate::models::*;
use crate::services::QuoteService;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

// ===== Service Info =====
/// Service name, version and endpoint map
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ServiceInfo::default())
}

/// Liveness check
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "okra-credit-agent".to_string(),
    })
}

/// Active policy thresholds and rate tiers
pub async fn get_policies(service: web::Data<Arc<QuoteService>>) -> HttpResponse {
    HttpResponse::Ok().json(service.policies())
}

// ===== Credit Quote =====
/// Evaluate an AP2 mandate into a credit quote
pub async fn credit_quote(
    service: web::Data<Arc<QuoteService>>,
    request: web::Json<CreditQuoteRequest>,
) -> Result<HttpResponse, AgentError> {
    let response = service.credit_quote(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Quote lookup; quotes are not stored
pub async fn get_quote_by_id(_quote_id: web::Path<String>) -> Result<HttpResponse, AgentError> {
    Err(AgentError::NotImplemented(
        "Quote retrieval by ID not yet implemented".to_string(),
    ))
}

// ===== BNPL Quote =====
/// Score a BNPL application, optionally emitting its CloudEvent
pub async fn bnpl_quote(
    service: web::Data<Arc<QuoteService>>,
    request: web::Json<BnplQuoteRequest>,
    query: web::Query<BnplQuoteQuery>,
) -> Result<HttpResponse, AgentError> {
    let response = service
        .bnpl_quote(request.into_inner(), query.emit_ce)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

// ===== MCP =====
/// Dispatch an MCP verb
pub async fn mcp_invoke(
    service: web::Data<Arc<QuoteService>>,
    request: web::Json<McpRequest>,
) -> HttpResponse {
    HttpResponse::Ok().json(mcp::invoke(&service, request.into_inner()).await)
}

// ===== Metrics =====
/// Prometheus text exposition
pub async fn metrics_endpoint() -> Result<HttpResponse, AgentError> {
    let body = metrics::render().map_err(|e| AgentError::InternalError(e.to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

// ===== Route Configuration =====
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and queries share the validation error shape
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AgentError::ValidationError(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AgentError::ValidationError(err.to_string()).into()
    }))
    .route("/", web::get().to(root))
    .route("/health", web::get().to(health_check))
    .route("/policies", web::get().to(get_policies))
    .route("/credit/quote", web::post().to(credit_quote))
    .route("/credit/quote/{quote_id}", web::get().to(get_quote_by_id))
    .route("/bnpl/quote", web::post().to(bnpl_quote))
    .route("/mcp/invoke", web::post().to(mcp_invoke))
    .route("/metrics", web::get().to(metrics_endpoint));
}
