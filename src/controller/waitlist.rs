use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse};

use crate::error::{Error, RestError, RestResult};
use crate::model::{
    timestamp_now, DataResponse, EmailRequest, ExistsResponse, RequestMetadata, WaitlistStats,
};
use crate::service::{RegistrationService, WaitlistAdmin};

const INVALID_EMAIL: &str = "Please provide a valid email address";
const ALREADY_REGISTERED: &str = "This email is already on our waitlist!";
const REGISTER_FAILED: &str = "Internal server error. Please try again later.";

/// Unreadable bodies and bodies without an email are treated as an empty email,
/// which then fails validation like any other malformed address
fn raw_email(body: Result<web::Json<EmailRequest>, actix_web::Error>) -> String {
    match body {
        Ok(body) => body.into_inner().email,
        Err(error) => {
            tracing::debug!(%error, "Unreadable email request body");
            String::new()
        }
    }
}

/// Sign an email up for the waitlist
#[tracing::instrument(name = "Add to waitlist", skip(service, body))]
#[post("")]
async fn create(
    service: web::Data<RegistrationService>,
    metadata: RequestMetadata,
    body: Result<web::Json<EmailRequest>, actix_web::Error>,
) -> RestResult<HttpResponse> {
    let registration = service
        .register(&raw_email(body), metadata)
        .await
        .map_err(|error| match error {
            Error::InvalidEmail(_) => RestError::BadRequest(INVALID_EMAIL.into()),
            Error::DuplicateEmail => RestError::Conflict(ALREADY_REGISTERED.into()),
            other => RestError::internal(REGISTER_FAILED, &other),
        })?;

    Ok(HttpResponse::Created()
        .json(DataResponse::new(registration).with_message("Successfully added to waitlist")))
}

/// Advisory check for an already registered email
#[tracing::instrument(name = "Check waitlist email", skip(service, body))]
#[post("/check")]
async fn check(
    service: web::Data<RegistrationService>,
    body: Result<web::Json<EmailRequest>, actix_web::Error>,
) -> RestResult<HttpResponse> {
    let exists = service
        .exists(&raw_email(body))
        .await
        .map_err(|error| match error {
            Error::InvalidEmail(_) => RestError::BadRequest("Invalid email format".into()),
            other => RestError::internal("Failed to check email", &other),
        })?;

    Ok(HttpResponse::Ok().json(ExistsResponse {
        success: true,
        exists,
    }))
}

#[tracing::instrument(name = "Waitlist statistics", skip(admin))]
#[get("/stats")]
async fn stats(admin: web::Data<WaitlistAdmin>) -> RestResult<HttpResponse> {
    let total_count = admin
        .count()
        .await
        .map_err(|error| RestError::internal("Failed to get waitlist statistics", &error))?;

    Ok(HttpResponse::Ok().json(DataResponse::new(WaitlistStats {
        total_count,
        timestamp: timestamp_now(),
    })))
}

/// Public waitlist endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/waitlist")
        .service(create)
        .service(check)
        .service(stats)
}
