use actix_web::dev::HttpServiceFactory;
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, web, HttpResponse};

use chrono::Utc;

use serde::Deserialize;

use uuid::Uuid;

use crate::error::{Error, RestError, RestResult};
use crate::model::{DataResponse, ListQuery, MessageResponse, Sort, SortField, SortOrder};
use crate::service::{export_filename, WaitlistAdmin};

const ENTRY_NOT_FOUND: &str = "Entry not found";

/// Raw listing parameters. Anything unparseable falls back to its default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

/// Leading decimal digits of `value`, so `2.5` reads as 2 and `20abc` as 20.
/// Zero when there are none.
fn leading_number(value: &str) -> u64 {
    let value = value.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().unwrap_or(0)
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        let number = |value: Option<String>| value.as_deref().map(leading_number).unwrap_or(0);

        let field = params
            .sort_by
            .as_deref()
            .and_then(SortField::from_key)
            .unwrap_or_default();
        let order = params
            .sort_order
            .as_deref()
            .map(SortOrder::from_key)
            .unwrap_or_default();

        ListQuery::new(number(params.page), number(params.limit), Sort { field, order })
    }
}

/// Paginated, sorted listing of waitlist entries
#[tracing::instrument(name = "Admin list waitlist", skip(admin))]
#[get("")]
async fn list(
    admin: web::Data<WaitlistAdmin>,
    params: web::Query<ListParams>,
) -> RestResult<HttpResponse> {
    let page = admin
        .list(params.into_inner().into())
        .await
        .map_err(|error| RestError::internal("Failed to retrieve waitlist entries", &error))?;

    Ok(HttpResponse::Ok().json(DataResponse::new(page)))
}

/// Whole waitlist as a CSV download
#[tracing::instrument(name = "Admin export waitlist", skip(admin))]
#[get("/export")]
async fn export(admin: web::Data<WaitlistAdmin>) -> RestResult<HttpResponse> {
    let csv = admin
        .export_csv()
        .await
        .map_err(|error| RestError::internal("Failed to export waitlist", &error))?;

    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(export_filename(
            Utc::now().date_naive(),
        ))],
    };

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((header::CONTENT_DISPOSITION, disposition))
        .body(csv))
}

/// Delete one entry. IDs that are not UUIDs cannot match anything.
#[tracing::instrument(name = "Admin delete waitlist entry", skip(admin))]
#[delete("/{id}")]
async fn remove(
    admin: web::Data<WaitlistAdmin>,
    path: web::Path<(String,)>,
) -> RestResult<HttpResponse> {
    let (id,) = path.into_inner();
    let id: Uuid = id
        .parse()
        .map_err(|_| RestError::NotFound(ENTRY_NOT_FOUND.into()))?;

    admin.delete(id).await.map_err(|error| match error {
        Error::NotFound => RestError::NotFound(ENTRY_NOT_FOUND.into()),
        other => RestError::internal("Failed to delete entry", &other),
    })?;

    Ok(HttpResponse::Ok().json(MessageResponse::success("Entry deleted successfully")))
}

/// Administrative waitlist endpoints.
/// NOTE: Unauthenticated; an access guard belongs on this scope.
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/admin/waitlist")
        .service(list)
        .service(export)
        .service(remove)
}
