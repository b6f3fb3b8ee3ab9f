use super::*;
use agora_core::Unique;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Editable profile fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    pub username: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Username or username fragment.
#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    #[serde(default)]
    pub username: String,
}

/// Public view of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: uuid::Uuid,
    pub name: String,
    pub username: String,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
}

impl From<&Member> for UserInfo {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id().inner(),
            name: member.name().to_string(),
            username: member.username().to_string(),
            image: member.image().map(String::from),
            bio: member.bio().map(String::from),
            role: member.role(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsernameInfo {
    pub username: String,
}

impl From<&Member> for UsernameInfo {
    fn from(member: &Member) -> Self {
        Self {
            username: member.username().to_string(),
        }
    }
}
