use std::time::Duration;

use claims::{assert_err, assert_matches, assert_ok};

use reqwest::StatusCode;

use waitlist::client::{ClientError, WaitlistClient};
use waitlist::model::{ListQuery, Sort, SortField, SortOrder};

use crate::helpers::{expected_export_filename, unreachable_url, TestApp};

#[tokio::test]
async fn client_signs_up_and_detects_duplicates() {
    let app = TestApp::spawn().await;
    let client = app.api_client();

    let registration = assert_ok!(client.add_to_waitlist(" Someone@Example.com").await);
    assert_eq!("someone@example.com", registration.email);

    let error = assert_err!(client.add_to_waitlist("someone@example.com").await);
    assert_eq!(Some(StatusCode::CONFLICT), error.status());
    assert_eq!("This email is already on our waitlist!", error.to_string());
}

#[tokio::test]
async fn client_surfaces_validation_message() {
    let app = TestApp::spawn().await;
    let client = app.api_client();

    let error = assert_err!(client.add_to_waitlist("not-an-email").await);

    assert_eq!(Some(StatusCode::BAD_REQUEST), error.status());
    assert_eq!("Please provide a valid email address", error.to_string());
}

#[tokio::test]
async fn client_checks_existing_email() {
    let app = TestApp::spawn().await;
    let client = app.api_client();

    assert!(!client.check_existing_email("someone@example.com").await);

    assert_ok!(client.add_to_waitlist("someone@example.com").await);

    assert!(client.check_existing_email("SOMEONE@example.com ").await);
}

#[tokio::test]
async fn client_reads_health_and_stats() {
    let app = TestApp::spawn().await;
    app.seed(4).await;
    let client = app.api_client();

    let health = assert_ok!(client.health().await);
    assert_eq!("OK", health.status);

    let stats = assert_ok!(client.stats().await);
    assert_eq!(4, stats.total_count);
}

#[tokio::test]
async fn client_manages_entries() {
    let app = TestApp::spawn().await;
    app.seed(7).await;
    let client = app.api_client();

    let query = ListQuery::new(
        2,
        5,
        Sort {
            field: SortField::Email,
            order: SortOrder::Asc,
        },
    );
    let page = assert_ok!(client.list_entries(&query).await);

    assert_eq!(2, page.entries.len());
    assert_eq!("user005@test.com", page.entries[0].email);
    assert_eq!(2, page.pagination.total_pages);
    assert!(page.pagination.has_prev_page);

    let export = assert_ok!(client.export_csv().await);
    assert_eq!(expected_export_filename(), export.filename);
    assert_eq!(8, export.body.lines().count());

    let id = page.entries[0].id;
    assert_ok!(client.delete_entry(id).await);
    assert_eq!(6, app.count().await);

    let error = assert_err!(client.delete_entry(id).await);
    assert_eq!(Some(StatusCode::NOT_FOUND), error.status());
    assert_eq!("Entry not found", error.to_string());
}

#[tokio::test]
async fn unreachable_service_is_reported_as_connection_error() {
    let client = WaitlistClient::new(unreachable_url(), Duration::from_secs(1))
        .expect("Failed to create client");

    assert!(!client.check_existing_email("someone@example.com").await);

    let error = assert_err!(client.add_to_waitlist("someone@example.com").await);
    assert_matches!(error, ClientError::Connection(_));
    assert_eq!(None, error.status());
}
