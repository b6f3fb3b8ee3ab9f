//! Argon2 hashing. The async entry points run on the blocking pool.
use super::*;
use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    use rand::Rng;
    let ref mut bytes = [0u8; 16];
    rand::rng().fill(bytes);
    SaltString::encode_b64(bytes)
}

pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Hash computed once and verified against when a username does not exist,
/// so either failure costs one full Argon2 verification.
fn decoy() -> &'static str {
    static DECOY: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    DECOY.get_or_init(|| hash("agora-decoy-password").unwrap_or_default())
}

pub async fn hashed(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash(&password))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(|e| AuthError::Internal(e.to_string()))
}

pub async fn matches(password: String, hashword: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify(&password, &hashword))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))
}

/// Burns one verification against the decoy hash. Always false.
pub async fn decoyed(password: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        let _ = verify(&password, decoy());
        false
    })
    .await
    .map_err(|e| AuthError::Internal(e.to_string()))
}
