//! Length checks for user-supplied fields.
use super::*;
use agora_core::*;

/// Character-count bound on one field.
pub fn bounded(field: &'static str, value: &str, min: usize, max: usize) -> Option<FieldError> {
    let n = value.chars().count();
    if n < min {
        Some(FieldError::new(
            field,
            format!("{} must be at least {} characters", field, min),
        ))
    } else if n > max {
        Some(FieldError::new(
            field,
            format!("{} must be at most {} characters", field, max),
        ))
    } else {
        None
    }
}

fn verdict(errors: Vec<FieldError>) -> Result<(), AuthError> {
    match errors.is_empty() {
        true => Ok(()),
        false => Err(AuthError::Invalid(errors)),
    }
}

pub fn registration(name: &str, username: &str, password: &str) -> Result<(), AuthError> {
    verdict(
        [
            bounded("name", name, NAME_MIN, NAME_MAX),
            bounded("username", username, USERNAME_MIN, USERNAME_MAX),
            bounded("password", password, PASSWORD_MIN, PASSWORD_MAX),
        ]
        .into_iter()
        .flatten()
        .collect(),
    )
}

pub fn profile(name: &str, username: &str, bio: Option<&str>) -> Result<(), AuthError> {
    verdict(
        [
            bounded("name", name, NAME_MIN, NAME_MAX),
            bounded("username", username, USERNAME_MIN, USERNAME_MAX),
            bio.and_then(|b| bounded("bio", b, 0, BIO_MAX)),
        ]
        .into_iter()
        .flatten()
        .collect(),
    )
}

pub fn password(password: &str) -> Result<(), AuthError> {
    verdict(
        bounded("password", password, PASSWORD_MIN, PASSWORD_MAX)
            .into_iter()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(result: Result<(), AuthError>) -> Vec<&'static str> {
        match result {
            Err(AuthError::Invalid(errors)) => errors.into_iter().map(|e| e.field).collect(),
            _ => vec![],
        }
    }

    #[test]
    fn accepts_boundary_lengths() {
        assert!(registration("Alice", "alice", "password123").is_ok());
        assert!(registration(&"n".repeat(20), &"u".repeat(20), &"p".repeat(255)).is_ok());
    }

    #[test]
    fn reports_every_violated_field() {
        assert_eq!(fields(registration("Al", "al", "short")), ["name", "username", "password"]);
        assert_eq!(fields(registration("Alice", "alice", &"p".repeat(256))), ["password"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(bounded("name", "ééééé", 5, 5).is_none());
    }

    #[test]
    fn bio_is_optional_but_bounded() {
        assert!(profile("Alice", "alice", None).is_ok());
        assert_eq!(fields(profile("Alice", "alice", Some(&"b".repeat(101)))), ["bio"]);
    }
}
