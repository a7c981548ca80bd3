use std::sync::Arc;

use reqwest::StatusCode;

use crate::helpers::{TestApp, UnavailableRepo};

#[tokio::test]
async fn is_present() {
    let app = TestApp::spawn().await;

    let res = app.health_check().await.expect("Failed to execute request");

    assert!(res.status().is_success());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!("OK", body["status"]);
    assert_eq!("Connected", body["database"]);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn reports_disconnected_store() {
    let app = TestApp::spawn_with(Arc::new(UnavailableRepo)).await;

    let res = app.health_check().await.expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());

    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!("Disconnected", body["database"]);
}

#[tokio::test]
async fn unknown_routes_return_json_not_found() {
    let app = TestApp::spawn().await;

    for path in ["api/nothing-here", "api/waitlist/nothing-here", "index.html"] {
        let res = app
            .client
            .get(app.url(path))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(StatusCode::NOT_FOUND, res.status(), "for path {}", path);

        let body: serde_json::Value = res.json().await.expect("Failed to parse body");
        assert_eq!(false, body["success"]);
        assert_eq!("API endpoint not found", body["message"]);
    }
}
