mod common;

use actix_web::{test, web, App};
use chrono::DateTime;
use common::{collaborators, test_settings, InMemoryStore};
use customer_api::{routes, AppState};

#[actix_web::test]
async fn test_health_check() {
    // Create test app state
    let store = InMemoryStore::new();
    let state = AppState::from_parts(test_settings(), collaborators(&store))
        .expect("Failed to build app state");

    // Create test app
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes),
    )
    .await;

    // Send request
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    // Assert response
    assert!(resp.status().is_success());

    // Parse response body
    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    // Verify response format
    assert_eq!(json["status"], "healthy");
    assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
}
