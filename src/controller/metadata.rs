use std::future::{ready, Ready};

use actix_web::http::header;
use actix_web::{dev, FromRequest, HttpRequest};

use crate::model::RequestMetadata;

/// Captures the peer address and `User-Agent` header, either of which may be missing
impl FromRequest for RequestMetadata {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let ip_address = req.peer_addr().map(|addr| addr.ip().to_string());
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        ready(Ok(Self {
            ip_address,
            user_agent,
        }))
    }
}
