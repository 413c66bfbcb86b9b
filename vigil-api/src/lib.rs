use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use vigil_monitor::Controller;
use vigil_types::{AccountKind, CacheSnapshot, Pubkey};

#[derive(Clone)]
pub struct AppState {
    pub controllers: Arc<HashMap<AccountKind, Arc<Controller>>>,
    pub metrics: Arc<Registry>,
}

impl AppState {
    pub fn new(controllers: HashMap<AccountKind, Arc<Controller>>, metrics: Registry) -> Self {
        Self {
            controllers: Arc::new(controllers),
            metrics: Arc::new(metrics),
        }
    }

    fn controller(&self, kind: &str) -> Result<&Arc<Controller>, ApiError> {
        let kind: AccountKind = kind.parse().map_err(|_| ApiError::NotFound(format!("unknown kind {kind}")))?;
        self.controllers
            .get(&kind)
            .ok_or_else(|| ApiError::NotFound(format!("{kind} monitoring is not enabled")))
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AddAccountRequest {
    pub address: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Changed {
    pub changed: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MonitoringStatus {
    pub kind: AccountKind,
    pub monitoring: bool,
    pub accounts: usize,
}

fn parse_address(raw: &str) -> Result<Pubkey, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid address {raw}: {e}")))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/accounts/:kind", get(list_accounts).post(add_account))
        .route("/accounts/:kind/:address", get(account_status).delete(remove_account))
        .route("/check/:kind", post(force_check))
        .route("/monitoring/:kind", get(monitoring))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn root() -> &'static str {
    "Vigil automation keeper"
}

async fn list_accounts(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let controller = state.controller(&kind)?;
    let accounts = controller.get_monitored_accounts().await;
    Ok(Json(accounts.iter().map(Pubkey::to_string).collect()))
}

async fn add_account(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<AddAccountRequest>,
) -> Result<Json<Changed>, ApiError> {
    let controller = state.controller(&kind)?;
    let address = parse_address(&req.address)?;
    let changed = controller.add_account_to_monitor(address).await;
    Ok(Json(Changed { changed }))
}

async fn remove_account(
    State(state): State<AppState>,
    Path((kind, address)): Path<(String, String)>,
) -> Result<Json<Changed>, ApiError> {
    let controller = state.controller(&kind)?;
    let address = parse_address(&address)?;
    let changed = controller.remove_account_from_monitor(&address).await;
    Ok(Json(Changed { changed }))
}

async fn account_status(
    State(state): State<AppState>,
    Path((kind, address)): Path<(String, String)>,
) -> Result<Json<CacheSnapshot>, ApiError> {
    let controller = state.controller(&kind)?;
    let address = parse_address(&address)?;
    controller
        .get_account_status(&address)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{address} is not monitored")))
}

async fn force_check(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<CacheSnapshot>>, ApiError> {
    let controller = state.controller(&kind)?;
    Ok(Json(controller.force_check().await))
}

async fn monitoring(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<MonitoringStatus>, ApiError> {
    let controller = state.controller(&kind)?;
    Ok(Json(MonitoringStatus {
        kind: controller.kind(),
        monitoring: controller.is_currently_monitoring(),
        accounts: controller.get_monitored_accounts().await.len(),
    }))
}

async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut body = String::new();
    encode(&mut body, &state.metrics).map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        ApiError::Internal("metrics encoding failed".into())
    })?;
    Ok((
        [(header::CONTENT_TYPE, "application/openmetrics-text; version=1.0.0; charset=utf-8")],
        body,
    )
        .into_response())
}
