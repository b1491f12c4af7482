// HTTP surface of the console: pages, form posts, phone masking, assets.

pub mod manage;
pub mod register;
pub mod views;

use axum::{
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::client::ApiClient;
use crate::metrics;
use crate::phone::{apply_phone_edit, PhoneEdit};
use crate::seal::UserSeal;
use crate::submit_guard::SubmitGuard;

const APP_CSS: &str = include_str!("../../static/app.css");
const PHONE_JS: &str = include_str!("../../static/phone.js");

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub client: ApiClient,
    pub guard: SubmitGuard,
    pub seal: UserSeal,
}

impl AppState {
    pub fn new(client: ApiClient, seal: UserSeal) -> Self {
        Self {
            client,
            guard: SubmitGuard::new(),
            seal,
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(register::page))
        .route("/register", post(register::submit))
        .route("/manage", get(manage::page))
        .route("/manage/search", get(manage::search))
        .route("/manage/edit", post(manage::edit))
        .route("/manage/score", post(manage::submit_score))
        .route("/api/phone/format", post(format_phone))
        .route("/static/app.css", get(app_css))
        .route("/static/phone.js", get(phone_js))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

// ── Small handlers ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PhoneFormatRequest {
    pub value: String,
}

async fn format_phone(Json(req): Json<PhoneFormatRequest>) -> Json<PhoneEdit> {
    Json(apply_phone_edit(&req.value))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "game-admin" }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

async fn app_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], APP_CSS)
}

async fn phone_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        PHONE_JS,
    )
}
