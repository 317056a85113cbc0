mod common;

use common::{collaborators, test_settings, InMemoryStore};
use customer_api::config::SmsConfig;
use customer_api::error::SmsError;
use customer_api::sms::{HttpSmsGateway, SmsDispatcher, SmsReceipt};
use customer_api::AppState;
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn gateway(server: &MockServer) -> HttpSmsGateway {
    HttpSmsGateway::new(&SmsConfig {
        endpoint: format!("{}/invoke", server.uri()),
        timeout_secs: 5,
    })
    .expect("Failed to build SMS gateway")
}

fn wrapped_request() -> serde_json::Value {
    json!({
        "body": json!({ "phoneNumber": "+15550100", "message": "Your code is 1234" }).to_string(),
    })
}

#[tokio::test]
async fn test_send_returns_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .and(header("X-Amz-Invocation-Type", "RequestResponse"))
        .and(body_json(wrapped_request()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "body": json!({ "phoneNumber": "+15550100", "message": "Your code is 1234" }).to_string(),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = gateway(&server)
        .send("+15550100", "Your code is 1234")
        .await
        .unwrap();

    assert_eq!(
        receipt,
        SmsReceipt {
            phone_number: "+15550100".to_string(),
            message: "Your code is 1234".to_string(),
        }
    );
}

#[tokio::test]
async fn test_send_surfaces_inner_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 500,
            "body": json!({ "error": "Invalid phone number" }).to_string(),
        })))
        .mount(&server)
        .await;

    let result = gateway(&server).send("+15550100", "Your code is 1234").await;
    match result {
        Err(SmsError::Rejected(reason)) => assert_eq!(reason, "Invalid phone number"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_send_surfaces_function_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Amz-Function-Error", "Unhandled")
                .set_body_string("Task timed out"),
        )
        .mount(&server)
        .await;

    let result = gateway(&server).send("+15550100", "Your code is 1234").await;
    assert!(matches!(result, Err(SmsError::FunctionError(detail)) if detail == "Task timed out"));
}

#[tokio::test]
async fn test_send_rejects_malformed_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "statusCode": 200,
            "body": "not json",
        })))
        .mount(&server)
        .await;

    let result = gateway(&server).send("+15550100", "Your code is 1234").await;
    assert!(matches!(result, Err(SmsError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_send_detached_uses_event_invocation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .and(header("X-Amz-Invocation-Type", "Event"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server)
        .send_detached("+15550100", "Your code is 1234")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_detached_rejected_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = gateway(&server).send_detached("+15550100", "hi").await;
    assert!(matches!(result, Err(SmsError::Rejected(_))));
}

#[tokio::test]
async fn test_app_state_dispatches_through_configured_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .and(header("X-Amz-Invocation-Type", "Event"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let store = InMemoryStore::new();
    let mut parts = collaborators(&store);
    parts.sms = Arc::new(gateway(&server));
    let state = AppState::from_parts(test_settings(), parts).expect("Failed to build app state");

    state.sms.send_detached("+15550100", "Welcome").await.unwrap();
}
