//! HTTP surface of the payment relay.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use kassacore::api::{ApiClient, CreateRequest, RequestType};
use kassacore::catalog;
use kassacore::config;

use crate::qr;

/// Shared state for all endpoints.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<ApiClient>,
    pub images_dir: Option<PathBuf>,
}

/// Resolves the bank-icon directory once at startup. A missing directory is
/// logged here; the route then answers 404 for everything.
pub fn resolve_images_dir() -> Option<PathBuf> {
    match config::IMAGES_DIR.as_deref() {
        None => {
            log::warn!("IMAGES_DIR is not set; bank icons will not be served");
            None
        }
        Some(dir) => {
            let path = PathBuf::from(dir);
            if path.is_dir() {
                Some(path)
            } else {
                log::warn!("Images directory not found: {dir}; bank icons will not be served");
                None
            }
        }
    }
}

/// Builds the relay router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/pay", get(pay))
        .route("/api/generate-qr", post(generate_qr))
        .route("/api/create-request", post(create_request))
        .route("/static/images/{name}", get(bank_image))
        .layer(cors)
        .with_state(Arc::new(state))
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[derive(Debug, Deserialize)]
struct PayParams {
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    qr: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    casino_id: Option<String>,
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// Payment page. The query parameters, the bank catalog, and the countdown
/// deadline are injected into the template as a JSON context.
async fn pay(Query(params): Query<PayParams>) -> Html<String> {
    let ttl = chrono::Duration::seconds(config::payment::PAGE_TTL_SECS as i64);
    let expires_timestamp = (Utc::now() + ttl).timestamp_millis();

    let banks: Vec<Value> = catalog::DEPOSIT_BANKS
        .iter()
        .map(|b| json!({"id": b.id, "name": b.name, "icon": b.icon}))
        .collect();

    let context = json!({
        "amount": params.amount.unwrap_or_else(|| "0".to_string()),
        "qr_hash": params.qr.unwrap_or_default(),
        "request_id": params.request_id.unwrap_or_default(),
        "user_id": params.user_id.unwrap_or_default(),
        "casino_id": params.casino_id.unwrap_or_default(),
        "account_id": params.account_id.unwrap_or_default(),
        "username": params.username.unwrap_or_default(),
        "first_name": params.first_name.unwrap_or_default(),
        "last_name": params.last_name.unwrap_or_default(),
        "banks": banks,
        "expires_timestamp": expires_timestamp,
    });

    // The context lands inside a <script> block; keep `<` out of it.
    let context = context.to_string().replace('<', "\\u003c");
    Html(include_str!("../static/pay.html").replace("__PAY_CONTEXT__", &context))
}

#[derive(Debug, Deserialize)]
struct GenerateQrBody {
    amount: f64,
    #[serde(default = "default_bank")]
    bank: String,
}

fn default_bank() -> String {
    "omoney".to_string()
}

/// Requests a QR hash from the remote API and renders it as an inline
/// image. Remote refusal is the caller's fault (400); anything local or
/// transport-level is ours (500).
async fn generate_qr(State(state): State<Arc<AppState>>, Json(body): Json<GenerateQrBody>) -> Response {
    match state.api.generate_qr(body.amount, &body.bank).await {
        Ok(result) if result.success => {
            let Some(hash) = result.qr_hash else {
                return failure(StatusCode::BAD_REQUEST, "Failed to generate QR");
            };
            match qr::render_qr_data_url(&hash) {
                Ok(image) => Json(json!({
                    "success": true,
                    "qr_hash": hash,
                    "qr_image": image,
                    "all_bank_urls": result.all_bank_urls.clone(),
                    // legacy alias kept for older page revisions
                    "bank_urls": result.all_bank_urls,
                }))
                .into_response(),
                Err(e) => {
                    log::error!("QR rendering failed: {e}");
                    failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
                }
            }
        }
        Ok(result) => failure(
            StatusCode::BAD_REQUEST,
            result.error.as_deref().unwrap_or("Failed to generate QR"),
        ),
        Err(e) => {
            log::error!("generate-qr remote call failed: {e}");
            failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfirmBody {
    user_id: Value,
    amount: f64,
    casino_id: String,
    account_id: String,
    #[serde(default)]
    bank: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// "I paid" confirmation: this is the point where the deposit request is
/// actually created against the remote ledger.
async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ConfirmBody>,
) -> Response {
    let user_id = match &body.user_id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let mut request = CreateRequest::new(user_id, RequestType::Deposit, body.amount);
    request.bookmaker = Some(body.casino_id);
    request.account_id = Some(body.account_id);
    request.bank = body.bank;
    request.telegram_username = body.username;
    request.telegram_first_name = body.first_name;
    request.telegram_last_name = body.last_name;

    match state.api.create_request(&request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            log::error!("create-request remote call failed: {e}");
            failure(StatusCode::BAD_GATEWAY, &e.to_string())
        }
    }
}

/// Bank icons from the shared admin directory; 404 on anything else.
async fn bank_image(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    let Some(dir) = &state.images_dir else {
        return StatusCode::NOT_FOUND.into_response();
    };
    // Single path segment only
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return StatusCode::NOT_FOUND.into_response();
    }

    match tokio::fs::read(dir.join(&name)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type_for(&name))], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn failure(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({"success": false, "error": error}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_cover_the_catalog_icons() {
        for bank in catalog::DEPOSIT_BANKS {
            let name = bank.icon.rsplit('/').next().unwrap();
            assert_ne!(content_type_for(name), "application/octet-stream", "{name}");
        }
    }

    #[test]
    fn script_context_escapes_closing_tags() {
        let raw = json!({"first_name": "</script><script>alert(1)"}).to_string();
        let escaped = raw.replace('<', "\\u003c");
        assert!(!escaped.contains("</script>"));
    }
}
