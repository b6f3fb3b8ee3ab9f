use super::*;
use std::sync::Arc;
use std::time::SystemTime;

/// Resolved identity, locale and request handle for one inbound call.
/// Built once by [`ContextBuilder`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Context<R> {
    user: Option<Member>,
    locale: Locale,
    request: R,
}

impl<R> Context<R> {
    pub fn new(user: Option<Member>, locale: Locale, request: R) -> Self {
        Self {
            user,
            locale,
            request,
        }
    }
    pub fn user(&self) -> Option<&Member> {
        self.user.as_ref()
    }
    pub fn locale(&self) -> Locale {
        self.locale
    }
    pub fn request(&self) -> &R {
        &self.request
    }
    /// Same identity and locale over a different request handle.
    pub fn with<S>(self, request: S) -> Context<S> {
        Context {
            user: self.user,
            locale: self.locale,
            request,
        }
    }
    pub fn into_parts(self) -> (Option<Member>, Locale, R) {
        (self.user, self.locale, self.request)
    }
}

/// The parts of an HTTP request the context depends on.
#[derive(Debug, Clone, Default)]
pub struct Inbound {
    pub method: String,
    pub origin: Option<String>,
    pub access: Option<String>,
    pub refresh: Option<String>,
    pub locale: Option<String>,
    pub accept_language: Option<String>,
}

impl Inbound {
    pub fn read_only(&self) -> bool {
        matches!(self.method.to_ascii_uppercase().as_str(), "GET" | "HEAD" | "OPTIONS")
    }
}

/// A freshly built context, plus the token pair to hand back when a refresh rotated it.
#[derive(Debug)]
pub struct Built<R> {
    pub context: Context<R>,
    pub rotated: Option<TokenPair>,
}

pub struct ContextBuilder {
    sessions: Arc<SessionManager>,
    origin: String,
}

impl ContextBuilder {
    pub fn new(sessions: Arc<SessionManager>, base_url: &str) -> Self {
        Self {
            sessions,
            origin: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Mutating requests must come from our own origin.
    pub fn csrf(&self, inbound: &Inbound) -> Result<(), Rejection> {
        match inbound.read_only() || inbound.origin.as_deref() == Some(self.origin.as_str()) {
            true => Ok(()),
            false => {
                log::warn!(
                    "refused {} from origin {:?}",
                    inbound.method,
                    inbound.origin
                );
                Err(Rejection::Forbidden)
            }
        }
    }

    pub async fn build<R>(&self, inbound: &Inbound, request: R) -> Result<Built<R>, Rejection> {
        self.build_at(inbound, request, SystemTime::now()).await
    }

    /// Only a CSRF mismatch is an error. Every authentication failure yields
    /// an anonymous context.
    pub async fn build_at<R>(
        &self,
        inbound: &Inbound,
        request: R,
        now: SystemTime,
    ) -> Result<Built<R>, Rejection> {
        self.csrf(inbound)?;
        let locale = Locale::resolve(
            inbound.locale.as_deref(),
            inbound.accept_language.as_deref(),
        );
        let (user, rotated) = match (inbound.access.as_deref(), inbound.refresh.as_deref()) {
            (Some(access), _) => (self.sessions.verify_at(access, now).await, None),
            (None, Some(refresh)) => match self.sessions.refresh_at(refresh, now).await {
                Some(pair) => (self.sessions.verify_at(&pair.access, now).await, Some(pair)),
                None => (None, None),
            },
            (None, None) => (None, None),
        };
        Ok(Built {
            context: Context::new(user, locale, request),
            rotated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::ID;
    use agora_core::Unique;

    const BASE: &str = "https://agora.example";

    async fn fixture() -> (ContextBuilder, Member, TokenPair) {
        let memory = Arc::new(Memory::default());
        let alice = Member::new(ID::default(), "Alice".into(), "alice".into(), Role::Member);
        memory.create(&alice, "unused").await.unwrap();
        let manager = Arc::new(SessionManager::new(
            memory.clone(),
            memory,
            Crypto::new(b"test-secret"),
            Policy::default(),
        ));
        let tokens = manager.issue(alice.id()).await.unwrap();
        (ContextBuilder::new(manager, "https://agora.example/"), alice, tokens)
    }

    fn get() -> Inbound {
        Inbound {
            method: "GET".into(),
            ..Inbound::default()
        }
    }

    fn post(origin: Option<&str>) -> Inbound {
        Inbound {
            method: "POST".into(),
            origin: origin.map(String::from),
            ..Inbound::default()
        }
    }

    #[tokio::test]
    async fn base_url_is_normalised() {
        let (builder, _, _) = fixture().await;
        assert_eq!(builder.origin(), BASE);
    }

    #[tokio::test]
    async fn mutation_without_matching_origin_is_forbidden() {
        let (builder, _, _) = fixture().await;
        for origin in [None, Some("https://evil.example"), Some("https://agora.example/")] {
            let result = builder.build(&post(origin), ()).await;
            assert_eq!(result.err(), Some(Rejection::Forbidden));
        }
        assert!(builder.build(&post(Some(BASE)), ()).await.is_ok());
    }

    #[tokio::test]
    async fn reads_skip_the_origin_check() {
        let (builder, _, _) = fixture().await;
        for method in ["GET", "head", "OPTIONS"] {
            let inbound = Inbound {
                method: method.into(),
                ..Inbound::default()
            };
            assert!(builder.build(&inbound, ()).await.is_ok());
        }
    }

    #[tokio::test]
    async fn access_cookie_resolves_user() {
        let (builder, alice, tokens) = fixture().await;
        let inbound = Inbound {
            access: Some(tokens.access),
            ..get()
        };
        let built = builder.build(&inbound, ()).await.unwrap();
        assert_eq!(built.context.user(), Some(&alice));
        assert!(built.rotated.is_none());
    }

    #[tokio::test]
    async fn refresh_cookie_alone_rotates() {
        let (builder, alice, tokens) = fixture().await;
        let inbound = Inbound {
            refresh: Some(tokens.refresh.clone()),
            ..get()
        };
        let built = builder.build(&inbound, ()).await.unwrap();
        assert_eq!(built.context.user(), Some(&alice));
        let rotated = built.rotated.unwrap();
        assert_ne!(rotated.refresh, tokens.refresh);
        let replay = builder.build(&inbound, ()).await.unwrap();
        assert!(replay.context.user().is_none());
        assert!(replay.rotated.is_none());
    }

    #[tokio::test]
    async fn garbage_cookie_is_anonymous() {
        let (builder, _, _) = fixture().await;
        let inbound = Inbound {
            access: Some("garbage".into()),
            locale: Some("id".into()),
            ..get()
        };
        let built = builder.build(&inbound, ()).await.unwrap();
        assert!(built.context.user().is_none());
        assert_eq!(built.context.locale().as_str(), "id");
    }

    #[tokio::test]
    async fn with_swaps_only_the_request() {
        let (builder, alice, tokens) = fixture().await;
        let inbound = Inbound {
            access: Some(tokens.access),
            ..get()
        };
        let context = builder.build(&inbound, ()).await.unwrap().context.with("handle");
        assert_eq!(context.user(), Some(&alice));
        assert_eq!(*context.request(), "handle");
    }
}
