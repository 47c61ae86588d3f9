//! REST server setup.
//!
//! # Responsibilities
//! - Create the Axum router for the configuration endpoints
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Pick a free port from `rest.port` / `rest.portRange`
//! - Serve until the shutdown signal fires
//!
//! # Routes
//! ```text
//! GET  /management/v1/configuration/            full dump
//! GET  /management/v1/configuration/{selector}  subtree or leaf
//! POST /management/v1/configuration/            multi-root update
//! ```

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::configurator::Registry;
use crate::error::ConfigError;
use crate::http::request::MakeRequestUuid;
use crate::http::response::ApiError;
use crate::modules::rest;
use crate::observability::metrics;
use crate::presentation::ConfigurationPresentation;

pub const CONF_URL: &str = "/management/v1/configuration";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot start REST endpoint. All ports in range [{start}, {end}) are in use.")]
    PortsInUse { start: i64, end: i64 },

    #[error("Cannot start REST endpoint on port {port}: {source}")]
    Bind {
        port: i64,
        #[source]
        source: io::Error,
    },
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub presentation: ConfigurationPresentation,
}

pub struct RestServer {
    router: Router,
}

impl RestServer {
    pub fn new(presentation: ConfigurationPresentation) -> Self {
        let router = Self::build_router(AppState { presentation });
        Self { router }
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let collection = format!("{}/", CONF_URL);
        let by_selector = format!("{}/{{selector}}", CONF_URL);
        Router::new()
            .route(CONF_URL, get(get_all).post(update))
            .route(&collection, get(get_all).post(update))
            .route(&by_selector, get(get_by_path))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "REST endpoint started");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("REST endpoint stopped");
        Ok(())
    }
}

/// Bind the REST listener on `host` using the `rest` root.
///
/// With `portRange = 0` only `port` is tried. Otherwise every port in
/// `[port, port + portRange)` is tried in order and the first free one wins.
pub async fn bind_rest_endpoint(host: Ipv4Addr, registry: &Registry) -> Result<TcpListener, StartError> {
    let port = registry.property(rest::PORT)?.to_json().as_i64().unwrap_or(rest::DEFAULT_PORT);
    let range = registry.property(rest::PORT_RANGE)?.to_json().as_i64().unwrap_or(0);

    if range == 0 {
        return try_bind(host, port)
            .await
            .map_err(|source| StartError::Bind { port, source });
    }

    let end = port + range;
    for candidate in port..end {
        match try_bind(host, candidate).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                tracing::debug!(port = candidate, error = %e, "Port unavailable, trying next");
            }
        }
    }

    let err = StartError::PortsInUse { start: port, end };
    tracing::warn!("{}", err);
    Err(err)
}

async fn try_bind(host: Ipv4Addr, port: i64) -> io::Result<TcpListener> {
    let port = u16::try_from(port)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid port {}", port)))?;
    TcpListener::bind(SocketAddr::from((host, port))).await
}

async fn get_all(State(state): State<AppState>) -> Response {
    json_response(StatusCode::OK, state.presentation.present())
}

async fn get_by_path(
    State(state): State<AppState>,
    Path(selector): Path<String>,
) -> Result<Response, ApiError> {
    let body = state.presentation.present_by_path(&selector)?;
    Ok(json_response(StatusCode::OK, body))
}

async fn update(State(state): State<AppState>, body: String) -> Result<Response, ApiError> {
    let presentation = state.presentation.clone();
    // Commits take the writer lock and hit storage.
    tokio::task::spawn_blocking(move || presentation.update(&body))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))??;

    Ok(json_response(StatusCode::OK, state.presentation.present()))
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_http(&method, response.status().as_u16());
    response
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
