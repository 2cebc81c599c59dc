use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use flock_core::View;
use flock_node::api::{MutationResponse, ViewResponse};
use flock_node::config::{
    BackendConfig, BootstrapMethod, CentralizedConfig, ProviderConfig, RpcClientConfig,
};
use flock_node::errors::{ErrorKind, ErrorResponse};
use flock_node::network::{Address, RpcClient};
use flock_node::provider::{Provider, ProviderArgs};
use flock_node::server::{build_router, ProviderRegistry};
use serde_json::json;
use tower::ServiceExt; // for oneshot

async fn provider(id: u16, group: BackendConfig, view: View) -> Arc<Provider> {
    let config = ProviderConfig {
        group,
        file: None,
        bootstrap: BootstrapMethod::FromView,
    };
    let args = ProviderArgs {
        initial_view: Some(view),
        file: None,
    };
    let rpc = RpcClient::new(&RpcClientConfig::default()).unwrap();
    let address = Address::parse("127.0.0.1:4000").unwrap();
    Arc::new(Provider::new(address, id, config, args, rpc).await.unwrap())
}

async fn app() -> Router {
    let registry = Arc::new(ProviderRegistry::new());
    let central = BackendConfig::Centralized(CentralizedConfig::default());
    registry
        .insert(provider(1, central, View::from_self("x", 1)).await)
        .unwrap();
    registry
        .insert(provider(2, BackendConfig::Static, View::from_self("y", 2)).await)
        .unwrap();
    build_router(registry)
}

fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn error_kind(response: axum::response::Response) -> ErrorKind {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    err.error.kind
}

#[tokio::test]
async fn test_fetch_view_returns_document_and_digest() {
    let app = app().await;
    let response = app.oneshot(post("/flock/v1/1/view", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let body: ViewResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.view.len(), 1);
    assert!(body.view.contains("x", 1));
    assert_eq!(body.view.digest(), body.digest);
}

#[tokio::test]
async fn test_unknown_provider_is_404() {
    let app = app().await;
    let response = app.oneshot(post("/flock/v1/99/view", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_kind(response).await, ErrorKind::ProviderNotFound);
}

#[tokio::test]
async fn test_mutation_status_codes() {
    let app = app().await;

    let dup = app
        .clone()
        .oneshot(post("/flock/v1/1/join", json!({"address": "x", "provider_id": 1})))
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::CONFLICT);
    assert_eq!(error_kind(dup).await, ErrorKind::DuplicateMember);

    let missing = app
        .clone()
        .oneshot(post("/flock/v1/1/leave", json!({"address": "z", "provider_id": 3})))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_kind(missing).await, ErrorKind::MemberNotFound);

    let refused = app
        .clone()
        .oneshot(post("/flock/v1/2/metadata", json!({"key": "k", "value": "v"})))
        .await
        .unwrap();
    assert_eq!(refused.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_kind(refused).await, ErrorKind::Unsupported);

    let ok = app
        .oneshot(post("/flock/v1/1/join", json!({"address": "w", "provider_id": 5})))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(ok.into_body(), 64 * 1024).await.unwrap();
    let body: MutationResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.version, 1);
}

#[tokio::test]
async fn test_ping_and_metrics() {
    let app = app().await;
    let pong = app
        .clone()
        .oneshot(post("/flock/v1/2/ping", json!({})))
        .await
        .unwrap();
    assert_eq!(pong.status(), StatusCode::OK);

    let metrics = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
}
