use actix_web::{http::StatusCode, test, web, App};
use credit_agent::{handlers, QuoteService};
use credit_engine::{BnplScoringEngine, CreditPolicyEngine};
use quote_events::{MemorySink, Publisher, SchemaValidator};
use serde_json::{json, Value};
use std::sync::Arc;

fn quote_service(sink: Arc<MemorySink>) -> Arc<QuoteService> {
    Arc::new(QuoteService::new(
        CreditPolicyEngine::default(),
        BnplScoringEngine::default(),
        Publisher::new(sink),
        "https://okra.ocn.ai/v1",
    ))
}

macro_rules! app {
    ($sink:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(quote_service($sink)))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

fn mandate() -> Value {
    json!({
        "actor": {"id": "user_123", "type": "individual"},
        "cart": {"total": 15000, "currency": "USD"},
        "payment": {"method": "credit"}
    })
}

#[actix_web::test]
async fn test_root_and_health() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["service"], "Okra Credit Agent");
    assert_eq!(body["status"], "operational");
    assert_eq!(body["endpoints"]["bnpl_quote"], "/bnpl/quote");

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({"status": "healthy", "service": "okra-credit-agent"}));
}

#[actix_web::test]
async fn test_policies() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::get().uri("/policies").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["policy_version"], "v1.0.0");
    assert_eq!(body["thresholds"]["min_credit_score_auto_approve"], 720);
    assert_eq!(body["thresholds"]["max_dti_ratio"], json!(0.45));
    assert_eq!(body["rate_tiers"][0], json!({"min_score": 720, "apr": 8.99}));
    assert_eq!(body["rate_tiers"].as_array().unwrap().len(), 5);
}

#[actix_web::test]
async fn test_credit_quote_approved() {
    let sink = Arc::new(MemorySink::new());
    let app = app!(sink.clone());

    let req = test::TestRequest::post()
        .uri("/credit/quote")
        .set_json(json!({
            "mandate": mandate(),
            "credit_profile": {
                "credit_score": 750,
                "annual_income": 80000,
                "debt_to_income_ratio": 0.25,
                "employment_status": "employed",
                "credit_history_months": 60
            },
            "requested_amount": 15000,
            "term_months": 36,
            "purpose": "home_improvement"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["approved"], json!(true));
    assert_eq!(body["review_required"], json!(false));
    assert_eq!(body["credit_limit"], json!(15000.0));
    assert_eq!(body["apr"], json!(8.99));
    assert_eq!(body["monthly_payment"], json!(476.93));
    assert_eq!(body["term_months"], json!(36));
    assert!(body["quote_id"].as_str().unwrap().starts_with("quote_user_123_"));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    let event = serde_json::to_value(&events[0]).unwrap();
    assert!(SchemaValidator::new().is_valid(&event));
    assert_eq!(event["data"]["mandate"]["actor"]["id"], "user_123");
}

#[actix_web::test]
async fn test_credit_quote_declined_is_not_an_error() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::post()
        .uri("/credit/quote")
        .set_json(json!({
            "mandate": mandate(),
            "credit_profile": {"credit_score": 580, "annual_income": 50000},
            "requested_amount": 5000,
            "term_months": 12
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["approved"], json!(false));
    assert_eq!(body["review_required"], json!(false));
    assert_eq!(body["credit_limit"], json!(0.0));
    assert_eq!(body["apr"], json!(0.0));
    assert_eq!(body["reasons"][0], "Credit score 580 below minimum threshold");
}

#[actix_web::test]
async fn test_credit_quote_without_profile_goes_to_review() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::post()
        .uri("/credit/quote")
        .set_json(json!({
            "mandate": {"actor": {}, "cart": {}, "payment": {}},
            "requested_amount": 45000,
            "term_months": 48
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["review_required"], json!(true));
    assert_eq!(body["credit_limit"], json!(40000.0));
    assert_eq!(body["apr"], json!(12.99));
    assert!(body["quote_id"].as_str().unwrap().starts_with("quote_unknown_"));
    assert_eq!(
        body["reasons"][0],
        "No credit profile provided - manual review required"
    );
}

#[actix_web::test]
async fn test_identical_requests_share_quote_id() {
    let app = app!(Arc::new(MemorySink::new()));
    let payload = json!({
        "mandate": mandate(),
        "credit_profile": {"credit_score": 700},
        "requested_amount": 12000,
        "term_months": 24
    });

    let first: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri("/credit/quote").set_json(&payload).to_request(),
    )
    .await;
    let second: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri("/credit/quote").set_json(&payload).to_request(),
    )
    .await;

    assert_eq!(first["quote_id"], second["quote_id"]);
}

#[actix_web::test]
async fn test_credit_quote_validation_errors() {
    let app = app!(Arc::new(MemorySink::new()));

    let cases = vec![
        json!({"mandate": mandate(), "requested_amount": 500, "term_months": 12}),
        json!({"mandate": mandate(), "requested_amount": 5000, "term_months": 61}),
        json!({"mandate": {"actor": {}, "cart": {}}, "requested_amount": 5000, "term_months": 12}),
        json!({"requested_amount": 5000, "term_months": 12}),
    ];

    for payload in cases {
        let req = test::TestRequest::post()
            .uri("/credit/quote")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{}", payload);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}

#[actix_web::test]
async fn test_malformed_json_is_validation_error() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::post()
        .uri("/credit/quote")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_get_quote_by_id_not_implemented() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::get()
        .uri("/credit/quote/quote_user_123_abc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_IMPLEMENTED");
    assert_eq!(body["message"], "Quote retrieval by ID not yet implemented");
}

#[actix_web::test]
async fn test_bnpl_quote() {
    let sink = Arc::new(MemorySink::new());
    let app = app!(sink.clone());

    let req = test::TestRequest::post()
        .uri("/bnpl/quote")
        .set_json(json!({"amount": 1500, "tenor": 6, "on_time_rate": 0.95, "utilization": 0.3}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["score"], json!(0.78));
    assert_eq!(body["approved"], json!(true));
    assert_eq!(body["term_months"], json!(6));
    assert_eq!(body["key_signals"]["risk_signal"], "medium_risk");
    assert!(body["components"]["on_time_score"].is_number());
    assert!(body.get("cloud_event").is_none());
    assert!(body.get("trace_id").is_none());
    assert!(sink.is_empty());
}

#[actix_web::test]
async fn test_bnpl_quote_with_cloud_event() {
    let sink = Arc::new(MemorySink::new());
    let app = app!(sink.clone());

    let req = test::TestRequest::post()
        .uri("/bnpl/quote?emit_ce=true")
        .set_json(json!({"amount": 1500, "tenor": 6, "on_time_rate": 0.95, "utilization": 0.3}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let event = &body["cloud_event"];
    assert_eq!(event["type"], "ocn.okra.bnpl_quote.v1");
    assert_eq!(event["source"], "okra");
    assert_eq!(event["subject"], body["trace_id"]);
    assert_eq!(event["data"]["quote"]["score"], body["score"]);
    assert!(SchemaValidator::new().is_valid(event));
    assert_eq!(sink.len(), 1);
}

#[actix_web::test]
async fn test_bnpl_quote_defaults_and_validation() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::post()
        .uri("/bnpl/quote")
        .set_json(json!({"amount": 1000, "tenor": 3}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    for payload in [
        json!({"amount": 50, "tenor": 6}),
        json!({"amount": 1000, "tenor": 0}),
        json!({"amount": 1000, "tenor": 6, "on_time_rate": 1.2}),
    ] {
        let req = test::TestRequest::post()
            .uri("/bnpl/quote")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{}", payload);
    }
}

#[actix_web::test]
async fn test_mcp_invoke() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::post()
        .uri("/mcp/invoke")
        .set_json(json!({"verb": "getStatus"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["data"]["agent"], "okra");

    let req = test::TestRequest::post()
        .uri("/mcp/invoke")
        .set_json(json!({"verb": "listPolicies", "args": {}}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["policy_version"], "v1.0.0");

    let req = test::TestRequest::post()
        .uri("/mcp/invoke")
        .set_json(json!({"verb": "unknown"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], "Unsupported verb: unknown");
}

#[actix_web::test]
async fn test_metrics_endpoint() {
    let app = app!(Arc::new(MemorySink::new()));

    let req = test::TestRequest::post()
        .uri("/credit/quote")
        .set_json(json!({"mandate": mandate(), "requested_amount": 5000, "term_months": 12}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("credit_quotes_total"));
}
