use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;

use actix_web::dev::Server;
use actix_web::http::header;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::controller::{admin, waitlist};
use crate::model::{timestamp_now, HealthStatus, MessageResponse};
use crate::repo::WaitlistRepo;
use crate::service::{RegistrationService, WaitlistAdmin};

/// Largest accepted JSON request body
const JSON_LIMIT: usize = 10 * 1024 * 1024;

/// Liveness, along with whether the store is reachable
#[tracing::instrument(name = "Health check", skip(repo))]
#[get("/health")]
async fn health_check(repo: web::Data<dyn WaitlistRepo>) -> impl Responder {
    HttpResponse::Ok().json(HealthStatus {
        status: "OK".into(),
        timestamp: timestamp_now(),
        database: repo.is_connected().await.into(),
    })
}

/// Fallback for every unmatched route
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(MessageResponse::failure("API endpoint not found"))
}

/// Cross-origin policy for the browser frontends.
/// Requests without an `Origin` header are not affected.
fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::CONTENT_DISPOSITION])
        .max_age(3600)
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    repo: Arc<dyn WaitlistRepo>,
    allowed_origins: &[String],
) -> anyhow::Result<Server> {
    // Wrap application data
    let registration = web::Data::new(RegistrationService::new(repo.clone()));
    let waitlist_admin = web::Data::new(WaitlistAdmin::new(repo.clone()));
    let repo: web::Data<dyn WaitlistRepo> = web::Data::from(repo);
    let allowed_origins = allowed_origins.to_vec();

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&allowed_origins))
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .app_data(repo.clone())
            .app_data(registration.clone())
            .app_data(waitlist_admin.clone())
            .service(
                web::scope("/api")
                    .service(health_check)
                    .service(waitlist::scope())
                    .service(admin::scope()),
            )
            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
