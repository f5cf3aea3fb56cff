//! Integration tests for the HTTP backend using wiremock.
//!
//! These tests verify request shape (target header, body fields, auth) and
//! the mapping of service error responses to typed errors.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use conveyor_backend::config::BackendConfig;
use conveyor_backend::error::BackendError;
use conveyor_backend::http::HttpBackend;
use conveyor_backend::ids::StreamName;
use conveyor_backend::traits::DeliveryStreamBackend;

// =============================================================================
// Test Helpers
// =============================================================================

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(BackendConfig::new(server.uri())).unwrap()
}

fn orders() -> StreamName {
    StreamName::parse("orders").unwrap()
}

fn target(action: &str) -> String {
    format!("Firehose_20150804.{action}")
}

fn service_error(error_type: &str, message: &str) -> serde_json::Value {
    json!({
        "__type": format!("com.amazonaws.firehose#{error_type}"),
        "message": message,
    })
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_sends_name_and_configuration() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("X-Amz-Target", target("CreateDeliveryStream").as_str()))
        .and(header("Content-Type", "application/x-amz-json-1.1"))
        .and(body_partial_json(json!({
            "DeliveryStreamName": "orders",
            "DeliveryStreamType": "DirectPut",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DeliveryStreamARN": "arn:aws:firehose:eu-west-1:123456789012:deliverystream/orders"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = backend(&server)
        .create_stream(&orders(), &json!({"DeliveryStreamType": "DirectPut"}))
        .await
        .unwrap();

    assert_eq!(
        created.arn.as_str(),
        "arn:aws:firehose:eu-west-1:123456789012:deliverystream/orders"
    );
}

#[tokio::test]
async fn test_create_rejects_non_object_configuration() {
    let server = MockServer::start().await;

    let err = backend(&server)
        .create_stream(&orders(), &json!(["not", "an", "object"]))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::InvalidArgument { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_maps_limit_exceeded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(service_error("LimitExceededException", "stream quota reached")),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .create_stream(&orders(), &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::LimitExceeded { ref message } if message == "stream quota reached"));
}

#[tokio::test]
async fn test_create_maps_invalid_kms_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(service_error("InvalidKMSResourceException", "key disabled")),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .create_stream(&orders(), &json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), "INVALID_KMS_RESOURCE");
}

#[tokio::test]
async fn test_create_missing_arn_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = backend(&server)
        .create_stream(&orders(), &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Serialization { .. }));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_requests_force_delete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", target("DeleteDeliveryStream").as_str()))
        .and(body_partial_json(json!({
            "DeliveryStreamName": "orders",
            "AllowForceDelete": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server).delete_stream(&orders(), true).await.unwrap();
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(backend(&server).delete_stream(&orders(), false).await.is_ok());
}

#[tokio::test]
async fn test_delete_maps_resource_in_use() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(service_error("ResourceInUseException", "stream is CREATING")),
        )
        .mount(&server)
        .await;

    let err = backend(&server)
        .delete_stream(&orders(), true)
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::ResourceInUse { .. }));
}

// =============================================================================
// Describe
// =============================================================================

#[tokio::test]
async fn test_describe_parses_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Amz-Target", target("DescribeDeliveryStream").as_str()))
        .and(body_partial_json(json!({"DeliveryStreamName": "orders"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DeliveryStreamDescription": {
                "DeliveryStreamName": "orders",
                "DeliveryStreamARN": "arn:aws:firehose:eu-west-1:123456789012:deliverystream/orders",
                "DeliveryStreamStatus": "CREATING",
                "DeliveryStreamType": "DirectPut"
            }
        })))
        .mount(&server)
        .await;

    let description = backend(&server).describe_stream(&orders()).await.unwrap();

    assert_eq!(description.name, orders());
    assert_eq!(description.status.as_str(), "CREATING");
    assert!(description.arn.is_some());
}

#[tokio::test]
async fn test_describe_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(service_error(
            "ResourceNotFoundException",
            "Firehose orders under account 123456789012 not found.",
        )))
        .mount(&server)
        .await;

    let err = backend(&server).describe_stream(&orders()).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "resource not found: orders");
}

#[tokio::test]
async fn test_describe_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = backend(&server).describe_stream(&orders()).await.unwrap_err();

    assert!(matches!(err, BackendError::Service { status: 500, .. }));
}

#[tokio::test]
async fn test_describe_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = backend(&server).describe_stream(&orders()).await.unwrap_err();

    assert!(matches!(err, BackendError::Serialization { .. }));
}

// =============================================================================
// Authentication and transport
// =============================================================================

#[tokio::test]
async fn test_bearer_token_sent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer test-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DeliveryStreamDescription": {
                "DeliveryStreamName": "orders",
                "DeliveryStreamStatus": "ACTIVE"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = BackendConfig::new(server.uri()).with_bearer_token("test-token-123");
    let backend = HttpBackend::new(config).unwrap();

    let description = backend.describe_stream(&orders()).await.unwrap();
    assert!(description.status.is("ACTIVE"));
    assert!(description.arn.is_none());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Port 9 (discard) on localhost is expected to refuse connections.
    let config = BackendConfig::new("http://127.0.0.1:9").with_connect_timeout(1);
    let backend = HttpBackend::new(config).unwrap();

    let err = backend.describe_stream(&orders()).await.unwrap_err();

    assert!(matches!(err, BackendError::Network { .. }));
}
