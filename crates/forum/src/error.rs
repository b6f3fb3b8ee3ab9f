use agora_auth::FieldError;
use agora_auth::StoreError;

/// Failure of a forum operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForumError {
    NotFound,
    /// Caller is signed in but does not own the target.
    NotOwner,
    /// Caller is signed in but not a member of the target's group.
    NotMember,
    Invalid(Vec<FieldError>),
    Store(StoreError),
}

impl ForumError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::NotOwner | Self::NotMember => "FORBIDDEN",
            Self::Invalid(_) => "BAD_REQUEST",
            Self::Store(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for ForumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found"),
            Self::NotOwner => f.write_str("only the owner may do this"),
            Self::NotMember => f.write_str("only group members may do this"),
            Self::Invalid(fields) => write!(f, "invalid input ({} fields)", fields.len()),
            Self::Store(_) => f.write_str("something went wrong"),
        }
    }
}

impl std::error::Error for ForumError {}

impl From<StoreError> for ForumError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[cfg(feature = "server")]
mod response {
    use super::*;
    use actix_web::HttpResponse;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    impl ResponseError for ForumError {
        fn status_code(&self) -> StatusCode {
            match self {
                Self::NotFound => StatusCode::NOT_FOUND,
                Self::NotOwner | Self::NotMember => StatusCode::FORBIDDEN,
                Self::Invalid(_) => StatusCode::BAD_REQUEST,
                Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
        fn error_response(&self) -> HttpResponse {
            let fields = match self {
                Self::Invalid(fields) => Some(fields.as_slice()),
                Self::Store(e) => {
                    log::error!("forum store failure: {}", e);
                    None
                }
                _ => None,
            };
            agora_auth::failure(self.status_code(), self.kind(), self.to_string(), fields)
        }
    }
}
