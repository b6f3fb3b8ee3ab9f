use super::*;
use actix_web::FromRequest;
use actix_web::HttpMessage;
use actix_web::HttpRequest;
use actix_web::dev::Payload;
use std::future::Ready;
use std::future::ready;

/// Context installed by the server's context middleware, reattached to this request.
impl FromRequest for Context<HttpRequest> {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Context<()>>()
                .cloned()
                .map(|context| context.with(req.clone()))
                .ok_or_else(|| {
                    log::error!("request context missing on {}", req.path());
                    actix_web::error::ErrorInternalServerError("request context missing")
                }),
        )
    }
}

/// Extractor for handlers wrapped in [`authenticated`].
pub struct Signed(pub Authed<HttpRequest>);

impl Signed {
    pub fn user(&self) -> &Member {
        self.0.user()
    }
}

impl FromRequest for Signed {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        ready(
            Context::<HttpRequest>::from_request(req, payload)
                .into_inner()
                .and_then(|context| {
                    authenticated()
                        .check(context)
                        .map(Signed)
                        .map_err(actix_web::Error::from)
                }),
        )
    }
}

/// Extractor for handlers wrapped in `authenticated` then `role_restricted(developer)`.
pub struct Developer(pub Authed<HttpRequest>);

impl Developer {
    pub fn user(&self) -> &Member {
        self.0.user()
    }
}

impl FromRequest for Developer {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;
    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        ready(
            Context::<HttpRequest>::from_request(req, payload)
                .into_inner()
                .and_then(|context| {
                    authenticated()
                        .then(role_restricted(Role::Developer))
                        .check(context)
                        .map(Developer)
                        .map_err(actix_web::Error::from)
                }),
        )
    }
}
