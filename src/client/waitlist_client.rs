use std::time::Duration;

use chrono::Utc;

use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use serde::de::DeserializeOwned;

use thiserror::Error;

use url::Url;

use uuid::Uuid;

use crate::model::{
    DataResponse, EmailRequest, EntriesPage, ExistsResponse, HealthStatus, ListQuery,
    MessageResponse, Registration, WaitlistStats,
};
use crate::service::export_filename;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The service could not be reached at all
    #[error("Unable to reach the waitlist service. Please check your connection and try again.")]
    Connection(#[source] reqwest::Error),
    /// The service answered with a failure, `message` is its explanation
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("Unexpected response from the waitlist service")]
    Decode(#[source] reqwest::Error),
}

impl ClientError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Downloaded CSV export
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

/// Client for the waitlist REST API, covering both the signup and the admin endpoints
#[derive(Debug, Clone)]
pub struct WaitlistClient {
    client: Client,
    base_url: String,
}

impl WaitlistClient {
    /// `base_url` is the API root, e.g. `http://localhost:5001/api`
    pub fn new(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request, turning non-2xx answers into `ClientError::Api`
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await.map_err(ClientError::Connection)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<MessageResponse>().await {
            Ok(body) => body.message,
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Api { status, message })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        response.json().await.map_err(ClientError::Decode)
    }

    #[tracing::instrument(name = "Waitlist API health check", skip(self))]
    pub async fn health(&self) -> ClientResult<HealthStatus> {
        let response = self.send(self.client.get(self.endpoint("health"))).await?;
        Self::json(response).await
    }

    #[tracing::instrument(name = "Get waitlist statistics", skip(self))]
    pub async fn stats(&self) -> ClientResult<WaitlistStats> {
        let response = self
            .send(self.client.get(self.endpoint("waitlist/stats")))
            .await?;
        let body: DataResponse<WaitlistStats> = Self::json(response).await?;
        Ok(body.data)
    }

    /// Sign an email up. A duplicate comes back as `ClientError::Api` with status 409.
    #[tracing::instrument(name = "Add to waitlist", skip(self))]
    pub async fn add_to_waitlist(&self, email: &str) -> ClientResult<Registration> {
        let body = EmailRequest {
            email: email.trim().to_lowercase(),
        };
        let response = self
            .send(self.client.post(self.endpoint("waitlist")).json(&body))
            .await?;
        let body: DataResponse<Registration> = Self::json(response).await?;
        Ok(body.data)
    }

    /// Whether an email is already registered.
    /// Any failure counts as "not registered" so that a signup is never blocked by it.
    #[tracing::instrument(name = "Check existing waitlist email", skip(self))]
    pub async fn check_existing_email(&self, email: &str) -> bool {
        let body = EmailRequest {
            email: email.trim().to_lowercase(),
        };
        let result = async {
            let response = self
                .send(self.client.post(self.endpoint("waitlist/check")).json(&body))
                .await?;
            Self::json::<ExistsResponse>(response).await
        }
        .await;

        match result {
            Ok(body) => body.exists,
            Err(error) => {
                tracing::warn!(error.cause_chain = ?error, "Failed to check email, assuming it is not registered");
                false
            }
        }
    }

    #[tracing::instrument(name = "List waitlist entries", skip(self))]
    pub async fn list_entries(&self, query: &ListQuery) -> ClientResult<EntriesPage> {
        let params = [
            ("page", query.page().to_string()),
            ("limit", query.limit().to_string()),
            ("sortBy", query.sort.field.key().to_string()),
            ("sortOrder", query.sort.order.key().to_string()),
        ];
        let response = self
            .send(
                self.client
                    .get(self.endpoint("admin/waitlist"))
                    .query(&params),
            )
            .await?;
        let body: DataResponse<EntriesPage> = Self::json(response).await?;
        Ok(body.data)
    }

    #[tracing::instrument(name = "Export waitlist", skip(self))]
    pub async fn export_csv(&self) -> ClientResult<CsvExport> {
        let response = self
            .send(self.client.get(self.endpoint("admin/waitlist/export")))
            .await?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| export_filename(Utc::now().date_naive()));
        let body = response.text().await.map_err(ClientError::Decode)?;

        Ok(CsvExport { filename, body })
    }

    #[tracing::instrument(name = "Delete waitlist entry", skip(self))]
    pub async fn delete_entry(&self, id: Uuid) -> ClientResult<()> {
        self.send(
            self.client
                .delete(self.endpoint(&format!("admin/waitlist/{}", id))),
        )
        .await?;
        Ok(())
    }
}

/// The `filename` parameter of a `Content-Disposition` value, without quotes
fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .find(|name| !name.is_empty())
}
