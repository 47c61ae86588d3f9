//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use confgate::modules;
use confgate::presentation::{converter, ConfigurationPresentation, Format};
use confgate::storage::{ConfigurationStorage, InMemoryStorage};
use confgate::{Registry, RestServer, Shutdown};

pub const CONF_URL: &str = "/management/v1/configuration/";

/// Registry of the built-in roots over in-memory storage.
pub fn registry(bootstrap: Value) -> Arc<Registry> {
    registry_with(bootstrap, Arc::new(InMemoryStorage::new()))
}

pub fn registry_with(bootstrap: Value, storage: Arc<dyn ConfigurationStorage>) -> Arc<Registry> {
    Arc::new(modules::build_registry(&bootstrap, storage).unwrap())
}

pub fn router(registry: Arc<Registry>) -> Router {
    RestServer::new(ConfigurationPresentation::new(registry, converter(Format::Json))).router()
}

/// Send one request through the router and return status, body and request ID.
pub async fn call(router: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, String, Option<String>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap(), request_id)
}

/// Serve the registry on an ephemeral local port.
pub async fn start_node(registry: Arc<Registry>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = RestServer::new(ConfigurationPresentation::new(registry, converter(Format::Json)));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
