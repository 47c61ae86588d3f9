//! Client tests against a node served on a real socket.

use serde_json::{json, Value};

mod common;

use confgate::client::{ClientError, ConfigurationClient, EndpointError, NodeEndpoint};

fn endpoint(addr: std::net::SocketAddr) -> NodeEndpoint {
    NodeEndpoint::new("127.0.0.1", addr.port())
}

#[tokio::test]
async fn test_get_returns_pretty_json() {
    let (addr, shutdown) = common::start_node(common::registry(json!({}))).await;
    let client = ConfigurationClient::new().unwrap();

    let text = client.get(&endpoint(addr)).await.unwrap();
    assert!(text.contains('\n'));
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["rest"]["port"], json!(8080));

    shutdown.trigger();
}

#[tokio::test]
async fn test_set_hocon_then_get() {
    let registry = common::registry(json!({}));
    let (addr, shutdown) = common::start_node(registry.clone()).await;
    let client = ConfigurationClient::new().unwrap();

    let out = client
        .set(&endpoint(addr), "rest.portRange = 10\nbaseline.autoAdjust { enabled = true, timeout = 3 }")
        .await
        .unwrap();
    assert_eq!(out, "");

    assert_eq!(registry.property("rest.portRange").unwrap().to_json(), json!(10));
    assert_eq!(registry.property("baseline.autoAdjust.timeout").unwrap().to_json(), json!(3));

    shutdown.trigger();
}

#[tokio::test]
async fn test_set_rejected_surfaces_status_and_body() {
    let (addr, shutdown) = common::start_node(common::registry(json!({}))).await;
    let client = ConfigurationClient::new().unwrap();

    let err = client
        .set(&endpoint(addr), "baseline.autoAdjust.timeout = 10")
        .await
        .unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("Http error code: 400\nError message: "), "{text}");
    assert!(text.contains("CONFIG_VALIDATION_FAILED"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = ConfigurationClient::new().unwrap().get(&endpoint(addr)).await.unwrap_err();
    assert!(matches!(err, ClientError::Connection(_)));
    assert_eq!(err.to_string(), "Connection issues while trying to send http request");
}

#[test]
fn test_bad_endpoint_fails_before_network() {
    let err = "badformat".parse::<NodeEndpoint>().unwrap_err();
    assert_eq!(err, EndpointError::Format);
}
