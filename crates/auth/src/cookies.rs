use super::*;
use actix_web::cookie::Cookie;
use actix_web::cookie::SameSite;
use actix_web::cookie::time::OffsetDateTime;
use agora_core::ACCESS_COOKIE;
use agora_core::REFRESH_COOKIE;
use std::time::SystemTime;

/// Session cookie factory. Both cookies are `HttpOnly`, scoped to `/`, and
/// carry the absolute expiry of the token inside them.
#[derive(Debug, Clone, Copy)]
pub struct Cookies {
    secure: bool,
}

impl Cookies {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn issue(&self, tokens: &TokenPair) -> [Cookie<'static>; 2] {
        [
            self.bake(ACCESS_COOKIE, tokens.access.clone(), Some(tokens.access_expires)),
            self.bake(REFRESH_COOKIE, tokens.refresh.clone(), Some(tokens.refresh_expires)),
        ]
    }

    pub fn clear(&self) -> [Cookie<'static>; 2] {
        [ACCESS_COOKIE, REFRESH_COOKIE].map(|name| {
            let mut cookie = self.bake(name, String::new(), None);
            cookie.make_removal();
            cookie
        })
    }

    fn bake(&self, name: &'static str, value: String, expires: Option<SystemTime>) -> Cookie<'static> {
        let mut cookie = Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .finish();
        if let Some(expires) = expires {
            cookie.set_expires(OffsetDateTime::from(expires));
        }
        cookie
    }
}
