use super::*;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::ResponseError;
use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use serde::Serialize;

/// Successful RPC response body: `{ status, message, data }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(skip)]
    code: StatusCode,
    status: u16,
    message: String,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(code: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            status: code.as_u16(),
            message: message.into(),
            data,
        }
    }
    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, "ok", data)
    }
    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, "ok", data)
    }
    pub fn respond(self) -> HttpResponse {
        HttpResponse::build(self.code).json(self)
    }
    pub fn respond_with<C>(self, cookies: C) -> HttpResponse
    where
        C: IntoIterator<Item = Cookie<'static>>,
    {
        let mut builder = HttpResponse::build(self.code);
        for cookie in cookies {
            builder.cookie(cookie);
        }
        builder.json(self)
    }
}

impl Envelope<Vec<()>> {
    /// Envelope with an empty `data` array.
    pub fn done() -> Self {
        Self::ok(Vec::new())
    }
}

impl<T: Serialize> Responder for Envelope<T> {
    type Body = BoxBody;
    fn respond_to(self, _: &HttpRequest) -> HttpResponse<Self::Body> {
        self.respond()
    }
}

#[derive(Serialize)]
struct Failure<'a> {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

/// JSON error body shared by every error type that reaches the transport.
pub fn failure(
    code: StatusCode,
    kind: &'static str,
    message: String,
    fields: Option<&[FieldError]>,
) -> HttpResponse {
    HttpResponse::build(code).json(Failure {
        kind,
        message,
        fields,
    })
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    fn error_response(&self) -> HttpResponse {
        let fields = match self {
            Self::Invalid(fields) => Some(fields.as_slice()),
            Self::Internal(detail) => {
                log::error!("internal failure: {}", detail);
                None
            }
            _ => None,
        };
        failure(self.status_code(), self.kind(), self.to_string(), fields)
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
    fn error_response(&self) -> HttpResponse {
        log::error!("{}", self);
        AuthError::Internal(self.to_string()).error_response()
    }
}

impl ResponseError for Rejection {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthorized | Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
    fn error_response(&self) -> HttpResponse {
        failure(self.status_code(), self.kind(), self.to_string(), None)
    }
}
