//! API Integration Tests
//!
//! End-to-end through the full router (middleware included) on the
//! in-memory application state.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use obra_financeiro::api;

mod common;

fn app() -> (Router, common::TestApp) {
    let test_app = common::setup_test_app();
    (api::build_router(test_app.state.clone()), test_app)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let req = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn conta_pagar_body(valor: &str) -> Value {
    json!({
        "fornecedor_id": null,
        "obra_id": null,
        "fornecedor_nome": "Madeireira Central",
        "descricao": "Tábuas de pinus",
        "valor": valor,
        "data_vencimento": (Utc::now() + Duration::days(10)).to_rfc3339(),
        "numero_documento": null,
        "observacoes": null
    })
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_conta_pagar_e2e() {
    let (app, _) = app();

    // 1. Create
    let (status, conta) = send(&app, "POST", "/api/v1/contas-pagar", Some(conta_pagar_body("500.00"))).await;
    assert_eq!(status, StatusCode::CREATED, "creation failed: {}", conta);
    assert_eq!(conta["status"], "PENDENTE");
    assert_eq!(conta["categoria"], "FORNECEDOR");
    let id = conta["id"].as_str().unwrap().to_string();

    // 2. Partial payment
    let (status, conta) = send(
        &app,
        "POST",
        &format!("/api/v1/contas-pagar/{}/pagamentos", id),
        Some(json!({ "valor": "100.00", "forma_pagamento": "PIX", "observacoes": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conta["status"], "PARCIAL");

    // 3. Overpayment is rejected
    let (status, err) = send(
        &app,
        "POST",
        &format!("/api/v1/contas-pagar/{}/pagamentos", id),
        Some(json!({ "valor": "1000.00", "forma_pagamento": null, "observacoes": null })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["error_code"], "overpayment");

    // 4. Cancellation after a payment is refused
    let (status, err) = send(
        &app,
        "POST",
        &format!("/api/v1/contas-pagar/{}/cancelar", id),
        Some(json!({ "motivo": "Desistência" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error_code"], "already_paid");

    // 5. State is what the accepted payment left
    let (status, conta) = send(&app, "GET", &format!("/api/v1/contas-pagar/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conta["status"], "PARCIAL");
}

#[tokio::test]
async fn test_invalid_amount_is_bad_request() {
    let (app, _) = app();
    let (status, err) = send(&app, "POST", "/api/v1/contas-pagar", Some(conta_pagar_body("-5"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_code"], "invalid_amount");
}

#[tokio::test]
async fn test_unknown_conta_is_not_found() {
    let (app, _) = app();
    let (status, err) = send(
        &app,
        "GET",
        &format!("/api/v1/contas-receber/{}", Uuid::new_v4()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error_code"], "not_found");
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let (app, _) = app();
    let (_, primeira) = send(&app, "POST", "/api/v1/contas-pagar", Some(conta_pagar_body("50.00"))).await;
    send(&app, "POST", "/api/v1/contas-pagar", Some(conta_pagar_body("70.00"))).await;
    let id = primeira["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        &format!("/api/v1/contas-pagar/{}/cancelar", id),
        None,
    )
    .await;

    let (status, lista) = send(&app, "GET", "/api/v1/contas-pagar?status=CANCELADO", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lista["total"], 1);
    assert_eq!(lista["itens"][0]["id"], id.as_str());

    let (_, lista) = send(&app, "GET", "/api/v1/contas-pagar?limit=10&offset=0", None).await;
    assert_eq!(lista["total"], 2);

    let (status, _) = send(&app, "GET", "/api/v1/contas-pagar?status=QUALQUER", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_usuario_header_is_rejected() {
    let (app, _) = app();
    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/contas-pagar")
        .header("X-Usuario-Id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let (app, _) = app();
    let correlation_id = Uuid::new_v4();
    let req = Request::builder()
        .method("GET")
        .uri("/api/v1/contas-receber")
        .header("X-Correlation-Id", correlation_id.to_string())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        correlation_id.to_string().as_str()
    );
}

#[tokio::test]
async fn test_budget_approval_through_api_creates_payable() {
    let (app, test_app) = app();
    let orcamento = test_app.seed_orcamento("Em Análise", rust_decimal_macros::dec!(1250)).await;
    let obra_id = orcamento.obra_id.unwrap();

    let (status, resumo) = send(
        &app,
        "PATCH",
        &format!("/api/v1/orcamentos/{}/status", orcamento.id),
        Some(json!({ "novo_status": "Aprovado" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resumo["status"], "Aprovado");

    let uri = format!("/api/v1/contas-pagar?obra_id={}", obra_id);
    let criada = common::eventually(|| {
        let app = app.clone();
        let uri = uri.clone();
        async move { send(&app, "GET", &uri, None).await.1["total"] == 1 }
    })
    .await;
    assert!(criada, "payable was not derived from the approved budget");

    let (_, lista) = send(&app, "GET", &uri, None).await;
    assert_eq!(lista["itens"][0]["orcamento_id"], orcamento.id.to_string());
    assert_eq!(lista["itens"][0]["categoria"], "FORNECEDOR");
}

#[tokio::test]
async fn test_cronograma_endpoints() {
    let (app, _) = app();
    let obra_id = Uuid::new_v4();
    let vencimento = (Utc::now() + Duration::days(15)).to_rfc3339();

    let (status, criado) = send(
        &app,
        "POST",
        "/api/v1/cronogramas",
        Some(json!({
            "obra_id": obra_id,
            "obra_nome": "Residencial Aurora",
            "cliente": "Construtora Silva",
            "etapas": [
                { "descricao": "Fundação", "valor": "1000.00", "data_vencimento": vencimento },
                { "descricao": "Estrutura", "valor": "2000.00", "data_vencimento": vencimento }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(criado["total"], 2);

    let (status, lista) = send(&app, "GET", &format!("/api/v1/obras/{}/cronogramas", obra_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lista["total"], 2);

    let (status, err) = send(
        &app,
        "POST",
        "/api/v1/cronogramas",
        Some(json!({
            "obra_id": obra_id,
            "obra_nome": "Residencial Aurora",
            "cliente": "Construtora Silva",
            "etapas": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error_code"], "validation_error");
}

#[tokio::test]
async fn test_overdue_sweep_endpoint() {
    let (app, _) = app();
    let mut body = conta_pagar_body("80.00");
    body["data_vencimento"] = json!((Utc::now() - Duration::days(2)).to_rfc3339());
    let (_, conta) = send(&app, "POST", "/api/v1/contas-pagar", Some(body)).await;

    let (status, report) = send(&app, "POST", "/api/v1/financeiro/vencimentos/processar", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["vencimentos"]["contas_pagar"]["marcados"], 1);
    assert!(report["errors"].as_array().unwrap().is_empty());

    let id = conta["id"].as_str().unwrap();
    let (_, conta) = send(&app, "GET", &format!("/api/v1/contas-pagar/{}", id), None).await;
    assert_eq!(conta["status"], "VENCIDO");
}
