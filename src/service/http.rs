//! HTTP endpoint
//!
//! `POST /layout` takes one JSON request and always answers 200 with either
//! a layout or `{"error": "..."}`. `OPTIONS /layout` is a no-op for
//! preflight checks, `GET /healthz` reports liveness.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::{ConfigError, ServiceConfig};
use crate::layout::LayoutConfig;
use crate::{resolve_json, LayoutResponse};

#[derive(Clone)]
pub struct AppState {
    config: Arc<LayoutConfig>,
}

impl AppState {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

fn cors_layer(origin: &str) -> Result<CorsLayer, ConfigError> {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(origin)
            .map_err(|_| ConfigError::Invalid(format!("invalid CORS origin '{origin}'")))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-requested-with")]))
}

/// Build the router with CORS applied
pub fn app(state: AppState, origin: &str) -> Result<Router, ConfigError> {
    Ok(Router::new()
        .route("/layout", post(layout).options(preflight))
        .route("/healthz", get(healthz))
        .layer(cors_layer(origin)?)
        .with_state(state))
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let router = app(
        AppState::new(config.layout_config()),
        &config.server.origin,
    )?;
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(%address, origin = %config.server.origin, "layout solver listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn failure(message: String) -> Json<LayoutResponse> {
    Json(LayoutResponse {
        tree: None,
        error: Some(message),
    })
}

/// Solve one request; invalid UTF-8 is answered like any other parse error
pub async fn layout(State(state): State<AppState>, body: Bytes) -> Json<LayoutResponse> {
    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "request body is not UTF-8");
            return failure(format!("parse error: request body is not valid UTF-8 ({e})"));
        }
    };
    let config = Arc::clone(&state.config);
    let response = tokio::task::spawn_blocking(move || resolve_json(&body, &config)).await;

    match response {
        Ok(response) => Json(response),
        Err(e) => {
            tracing::warn!(error = %e, "layout task failed");
            failure(format!("internal error: {e}"))
        }
    }
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn healthz() -> &'static str {
    "ok"
}
