//! HTTP-level tests for the API-mode front door

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use permset::node::{routes, AppState};
use permset::{NodeConfig, PermSetNode, ProvisioningMode};
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn api_state(storage: &std::path::Path) -> web::Data<AppState> {
    let config = NodeConfig::new(storage.join("db"), ProvisioningMode::Api);
    let node = Arc::new(PermSetNode::new(config).expect("Failed to create node"));
    web::Data::new(AppState { node })
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(Cors::default().allow_any_origin().allow_any_method().allow_any_header())
                .app_data($state.clone())
                .service(
                    web::scope("/api")
                        .route(
                            "/permission-sets",
                            web::post().to(routes::upsert_permission_set),
                        )
                        .route(
                            "/permission-sets/{name}",
                            web::delete().to(routes::delete_permission_set),
                        ),
                ),
        )
    };
}

#[tokio::test]
async fn test_post_upsert_returns_ack() {
    let dir = tempdir().unwrap();
    let state = api_state(dir.path());
    let app = test_app!(state).await;

    let req = test::TestRequest::post()
        .uri("/api/permission-sets")
        .set_json(json!({
            "name": "readonly",
            "document": {"Statement": [{"Effect": "Allow"}]}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["name"], "readonly");
    assert_eq!(body["data"]["created"], true);

    let stored = state.node.get_permission_set("readonly").unwrap();
    assert_eq!(stored, Some(json!({"Statement": [{"Effect": "Allow"}]})));
}

#[tokio::test]
async fn test_post_malformed_document_is_bad_request() {
    let dir = tempdir().unwrap();
    let state = api_state(dir.path());
    let app = test_app!(state).await;

    let req = test::TestRequest::post()
        .uri("/api/permission-sets")
        .set_json(json!({"name": "x", "document": {}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Validation"));
    assert!(state.node.get_permission_set("x").unwrap().is_none());
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let dir = tempdir().unwrap();
    let state = api_state(dir.path());
    let app = test_app!(state).await;

    state
        .node
        .upsert_permission_set("admin", &json!({"Statement": []}))
        .unwrap();

    let req = test::TestRequest::delete()
        .uri("/api/permission-sets/admin")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["existed"], true);

    // Second delete: the record is already absent, still a success
    let req = test::TestRequest::delete()
        .uri("/api/permission-sets/admin")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["existed"], false);
}
