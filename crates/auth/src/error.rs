/// Failure reported by a credential or session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    Conflict,
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict => write!(f, "uniqueness constraint violated"),
            Self::Backend(s) => write!(f, "store failure: {}", s),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "database")]
impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        match e.code() {
            Some(code) if *code == tokio_postgres::error::SqlState::UNIQUE_VIOLATION => {
                Self::Conflict
            }
            _ => Self::Backend(e.to_string()),
        }
    }
}

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Outcome of a failed credential operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown username and wrong password are deliberately indistinguishable.
    InvalidCredentials,
    AlreadyExists,
    Invalid(Vec<FieldError>),
    Internal(String),
}

impl AuthError {
    pub const CREDENTIALS: &'static str = "invalid username or password";

    /// Stable machine-readable kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AlreadyExists => "CONFLICT",
            Self::Invalid(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => f.write_str(Self::CREDENTIALS),
            Self::AlreadyExists => f.write_str("username already taken"),
            Self::Invalid(fields) => write!(f, "invalid input ({} fields)", fields.len()),
            Self::Internal(_) => f.write_str("something went wrong"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => Self::AlreadyExists,
            StoreError::Backend(s) => Self::Internal(s),
        }
    }
}

/// Guard refusal. Distinct from an anonymous identity, which is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No user on the context.
    Unauthenticated,
    /// User present but lacking the required role.
    Unauthorized,
    /// Mutating request whose Origin is not ours.
    Forbidden,
}

impl Rejection {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("sign in required"),
            Self::Unauthorized => f.write_str("insufficient role"),
            Self::Forbidden => f.write_str("cross-origin request refused"),
        }
    }
}

impl std::error::Error for Rejection {}
