use actix_web::Error;
use actix_web::HttpMessage;
use actix_web::HttpResponse;
use actix_web::body::BoxBody;
use actix_web::body::MessageBody;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::LOCATION;
use actix_web::middleware::Next;
use actix_web::web;
use agora_auth::Context;
use agora_auth::Member;
use agora_auth::Role;

#[rustfmt::skip]
const PROTECTED:  &[&str] = &["/discussion", "/group", "/account", "/logout"];
#[rustfmt::skip]
const GUEST:      &[&str] = &["/login", "/register"];
#[rustfmt::skip]
const ROLE_GATED: &[(&str, Role)] = &[("/manage-post", Role::Developer)];
#[rustfmt::skip]
const UNGATED:    &[&str] = &["/rpc", "/health"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Redirect(&'static str),
}

/// Page prefix rules applied before any handler runs.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    maintenance: Vec<String>,
}

impl Gate {
    pub fn new(maintenance: Vec<String>) -> Self {
        Self { maintenance }
    }

    pub fn judge(&self, path: &str, user: Option<&Member>) -> Verdict {
        if UNGATED.iter().any(|p| under(path, p)) {
            return Verdict::Pass;
        }
        if self.maintenance.iter().any(|p| under(path, p)) {
            return Verdict::Redirect("/");
        }
        if let Some((_, role)) = ROLE_GATED.iter().find(|(p, _)| under(path, p)) {
            return match user {
                None => Verdict::Redirect("/login"),
                Some(user) if user.role() != *role => Verdict::Redirect("/discussion"),
                Some(_) => Verdict::Pass,
            };
        }
        match user {
            None if PROTECTED.iter().any(|p| under(path, p)) => Verdict::Redirect("/login"),
            Some(_) if GUEST.iter().any(|p| under(path, p)) => Verdict::Redirect("/discussion"),
            _ => Verdict::Pass,
        }
    }
}

/// Segment-wise prefix match: `/group` covers `/group/1` but not `/groups`.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Redirects page requests according to [`Gate::judge`]. Runs after the context middleware.
pub async fn gate(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let verdict = match req.app_data::<web::Data<Gate>>() {
        Some(gate) => {
            let extensions = req.extensions();
            let user = extensions.get::<Context<()>>().and_then(|c| c.user());
            gate.judge(req.path(), user)
        }
        None => Verdict::Pass,
    };
    match verdict {
        Verdict::Pass => Ok(next.call(req).await?.map_into_boxed_body()),
        Verdict::Redirect(to) => {
            log::debug!("gate redirects {} to {}", req.path(), to);
            let response = HttpResponse::SeeOther()
                .insert_header((LOCATION, to))
                .finish();
            Ok(req.into_response(response))
        }
    }
}
