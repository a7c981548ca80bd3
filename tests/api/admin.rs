use std::sync::Arc;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::StatusCode;

use uuid::Uuid;

use crate::helpers::{expected_export_filename, TestApp, UnavailableRepo};

async fn list_body(app: &TestApp, params: &[(&str, &str)]) -> serde_json::Value {
    let res = app.list(params).await.expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    res.json().await.expect("Failed to parse body")
}

fn emails(body: &serde_json::Value) -> Vec<String> {
    body["data"]["entries"]
        .as_array()
        .expect("Entries are not an array")
        .iter()
        .map(|entry| entry["email"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn list_paginates_entries() {
    let app = TestApp::spawn().await;
    app.seed(120).await;

    let first = list_body(&app, &[("page", "1"), ("limit", "50")]).await;
    assert_eq!(true, first["success"]);
    assert_eq!(50, emails(&first).len());

    let pagination = &first["data"]["pagination"];
    assert_eq!(1, pagination["currentPage"]);
    assert_eq!(3, pagination["totalPages"]);
    assert_eq!(120, pagination["totalCount"]);
    assert_eq!(true, pagination["hasNextPage"]);
    assert_eq!(false, pagination["hasPrevPage"]);
    assert_eq!(50, pagination["limit"]);

    let last = list_body(&app, &[("page", "3"), ("limit", "50")]).await;
    assert_eq!(20, emails(&last).len());
    assert_eq!(false, last["data"]["pagination"]["hasNextPage"]);
    assert_eq!(true, last["data"]["pagination"]["hasPrevPage"]);
}

#[tokio::test]
async fn list_pages_do_not_overlap() {
    let app = TestApp::spawn().await;
    app.seed(120).await;

    let mut seen = Vec::new();
    for page in ["1", "2", "3"] {
        let body = list_body(&app, &[("page", page), ("limit", "50")]).await;
        seen.extend(emails(&body));
    }
    seen.sort();
    seen.dedup();

    assert_eq!(120, seen.len());
}

#[tokio::test]
async fn list_uses_defaults_without_params() {
    let app = TestApp::spawn().await;
    app.seed(3).await;

    let body = list_body(&app, &[]).await;

    assert_eq!(3, emails(&body).len());
    assert_eq!(1, body["data"]["pagination"]["currentPage"]);
    assert_eq!(50, body["data"]["pagination"]["limit"]);

    let entry = &body["data"]["entries"][0];
    assert!(entry["_id"].is_string());
    assert!(entry["createdAt"].is_string());
    assert_eq!("landing-page", entry["source"]);
}

#[tokio::test]
async fn list_sorts_by_requested_field() {
    let app = TestApp::spawn().await;
    app.seed(5).await;

    let asc = list_body(&app, &[("sortBy", "email"), ("sortOrder", "asc")]).await;
    assert_eq!(
        vec![
            "user000@test.com",
            "user001@test.com",
            "user002@test.com",
            "user003@test.com",
            "user004@test.com",
        ],
        emails(&asc)
    );

    let desc = list_body(&app, &[("sortBy", "email"), ("sortOrder", "desc")]).await;
    assert_eq!("user004@test.com", emails(&desc)[0]);
}

#[tokio::test]
async fn list_falls_back_to_defaults_for_garbage_params() {
    let app = TestApp::spawn().await;
    app.seed(3).await;

    let body = list_body(
        &app,
        &[
            ("page", "zero"),
            ("limit", "-1"),
            ("sortBy", "password"),
            ("sortOrder", "sideways"),
        ],
    )
    .await;

    assert_eq!(3, emails(&body).len());
    assert_eq!(1, body["data"]["pagination"]["currentPage"]);
    assert_eq!(50, body["data"]["pagination"]["limit"]);
}

#[tokio::test]
async fn list_reads_leading_digits_of_params() {
    let app = TestApp::spawn().await;
    app.seed(5).await;

    let body = list_body(&app, &[("page", "2.5"), ("limit", "2abc")]).await;

    assert_eq!(2, emails(&body).len());
    assert_eq!(2, body["data"]["pagination"]["currentPage"]);
    assert_eq!(2, body["data"]["pagination"]["limit"]);
}

#[tokio::test]
async fn list_past_the_end_is_empty() {
    let app = TestApp::spawn().await;
    app.seed(3).await;

    let body = list_body(&app, &[("page", "9"), ("limit", "2")]).await;

    assert!(emails(&body).is_empty());
    assert_eq!(2, body["data"]["pagination"]["totalPages"]);
    assert_eq!(false, body["data"]["pagination"]["hasNextPage"]);
}

#[tokio::test]
async fn list_reports_storage_failures() {
    let app = TestApp::spawn_with(Arc::new(UnavailableRepo)).await;

    let res = app.list(&[]).await.expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!(false, body["success"]);
    assert_eq!("Failed to retrieve waitlist entries", body["message"]);
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let app = TestApp::spawn().await;
    app.seed(2).await;

    let res = app.export().await.expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let content_type = res.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/csv"));
    assert_eq!(
        format!("attachment; filename=\"{}\"", expected_export_filename()),
        res.headers()[CONTENT_DISPOSITION].to_str().unwrap()
    );

    let body = res.text().await.expect("Failed to read body");
    let lines: Vec<&str> = body.lines().collect();

    assert_eq!(3, lines.len());
    assert_eq!("Email,Created At,Source,IP Address,User Agent", lines[0]);

    let mut exported: Vec<&str> = lines[1..]
        .iter()
        .map(|line| line.split(',').next().unwrap())
        .collect();
    exported.sort();
    assert_eq!(vec!["\"user000@test.com\"", "\"user001@test.com\""], exported);
}

#[tokio::test]
async fn export_of_empty_waitlist_is_header_only() {
    let app = TestApp::spawn().await;

    let res = app.export().await.expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body = res.text().await.expect("Failed to read body");
    assert_eq!(vec!["Email,Created At,Source,IP Address,User Agent"], body.lines().collect::<Vec<_>>());
}

#[tokio::test]
async fn export_reports_storage_failures() {
    let app = TestApp::spawn_with(Arc::new(UnavailableRepo)).await;

    let res = app.export().await.expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!("Failed to export waitlist", body["message"]);
}

#[tokio::test]
async fn delete_removes_entry_once() {
    let app = TestApp::spawn().await;
    app.seed(2).await;

    let entries = app.repo.fetch_all().await.expect("Failed to fetch entries");
    let id = entries[0].id.to_string();

    let res = app.delete(&id).await.expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!(true, body["success"]);
    assert_eq!("Entry deleted successfully", body["message"]);
    assert_eq!(1, app.count().await);

    let res = app.delete(&id).await.expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, res.status());
    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!(false, body["success"]);
    assert_eq!("Entry not found", body["message"]);
    assert_eq!(1, app.count().await);
}

#[tokio::test]
async fn delete_of_unknown_or_malformed_id_is_not_found() {
    let app = TestApp::spawn().await;
    app.seed(1).await;

    for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let res = app.delete(&id).await.expect("Failed to execute request");

        assert_eq!(StatusCode::NOT_FOUND, res.status(), "Unexpected status for id {}", id);
        let body: serde_json::Value = res.json().await.expect("Failed to parse body");
        assert_eq!("Entry not found", body["message"]);
    }

    assert_eq!(1, app.count().await);
}

#[tokio::test]
async fn delete_reports_storage_failures() {
    let app = TestApp::spawn_with(Arc::new(UnavailableRepo)).await;

    let res = app
        .delete(&Uuid::new_v4().to_string())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    let body: serde_json::Value = res.json().await.expect("Failed to parse body");
    assert_eq!("Failed to delete entry", body["message"]);
}
