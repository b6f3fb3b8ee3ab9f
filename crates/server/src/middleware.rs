use actix_web::Error;
use actix_web::HttpMessage;
use actix_web::ResponseError;
use actix_web::body::BoxBody;
use actix_web::body::MessageBody;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::web;
use agora_auth::ContextBuilder;
use agora_auth::Cookies;
use agora_auth::Inbound;
use agora_core::ACCESS_COOKIE;
use agora_core::LOCALE_HEADER;
use agora_core::REFRESH_COOKIE;

fn inbound(req: &ServiceRequest) -> Inbound {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    Inbound {
        method: req.method().as_str().to_string(),
        origin: header(header::ORIGIN.as_str()),
        access: req.cookie(ACCESS_COOKIE).map(|c| c.value().to_string()),
        refresh: req.cookie(REFRESH_COOKIE).map(|c| c.value().to_string()),
        locale: header(LOCALE_HEADER),
        accept_language: header(header::ACCEPT_LANGUAGE.as_str()),
    }
}

/// Resolves the request [`Context`](agora_auth::Context) and stores it in the
/// request extensions. A cross-origin mutation is refused with 403; a rotated
/// token pair is exposed to handlers and written back as cookies unless the
/// handler set session cookies itself.
pub async fn context(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(builder) = req.app_data::<web::Data<ContextBuilder>>().cloned() else {
        log::error!("context builder not registered");
        return Err(actix_web::error::ErrorInternalServerError("server misconfigured"));
    };
    let cookies = req
        .app_data::<web::Data<Cookies>>()
        .map(|c| *c.get_ref())
        .unwrap_or(Cookies::new(true));
    let built = match builder.build(&inbound(&req), ()).await {
        Ok(built) => built,
        Err(rejection) => return Ok(req.into_response(rejection.error_response())),
    };
    req.extensions_mut().insert(built.context);
    if let Some(tokens) = built.rotated.clone() {
        req.extensions_mut().insert(tokens);
    }
    let mut res = next.call(req).await?.map_into_boxed_body();
    let handled = res
        .response()
        .cookies()
        .any(|c| c.name() == ACCESS_COOKIE || c.name() == REFRESH_COOKIE);
    if let Some(tokens) = built.rotated.filter(|_| !handled) {
        for cookie in cookies.issue(&tokens) {
            if let Err(e) = res.response_mut().add_cookie(&cookie) {
                log::warn!("could not set rotated {} cookie: {}", cookie.name(), e);
            }
        }
    }
    Ok(res)
}
