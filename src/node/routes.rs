use super::http_server::AppState;
use crate::error::PermSetError;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};

/// Body of the single API-mode ingestion operation
#[derive(Deserialize)]
pub struct UpsertRequest {
    pub name: String,
    pub document: Value,
}

/// `POST /api/permission-sets` — validate and upsert a permission set.
///
/// Validation failures are the caller's to fix (400, never retried); store
/// failures are transient and mapped to 502 so the caller retries with
/// backoff.
pub async fn upsert_permission_set(
    request: web::Json<UpsertRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let UpsertRequest { name, document } = request.into_inner();

    match state.node.upsert_permission_set(&name, &document) {
        Ok(ack) => HttpResponse::Ok().json(json!({"data": ack})),
        Err(e) => error_response(e),
    }
}

/// `DELETE /api/permission-sets/{name}` — explicit API-mode deletion.
/// Deleting an absent name is a success; the response reports whether a
/// record existed.
pub async fn delete_permission_set(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> impl Responder {
    let name = path.into_inner();

    match state.node.delete_permission_set(&name) {
        Ok(existed) => HttpResponse::Ok().json(json!({"data": {"name": name, "existed": existed}})),
        Err(e) => error_response(e),
    }
}

fn error_response(error: PermSetError) -> HttpResponse {
    let body = json!({"error": error.to_string()});
    match error {
        PermSetError::Validation(_) => HttpResponse::BadRequest().json(body),
        PermSetError::Config(_) => HttpResponse::NotImplemented().json(body),
        ref e if e.is_retryable() => HttpResponse::BadGateway().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}
