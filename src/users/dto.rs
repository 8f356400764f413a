use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;
use crate::auth::Role;
use crate::error::{AppError, AppResult};

/// Request body for registration. Missing fields read as blank.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial update; absent (or null) fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(crate) fn check_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be blank."));
    }
    Ok(())
}

pub(crate) fn check_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::validation("Email cannot be blank."));
    }
    if !email.contains('@') {
        return Err(AppError::validation("Email must contain `@`."));
    }
    Ok(())
}

pub(crate) fn check_password(password: &str) -> AppResult<()> {
    if password.trim().is_empty() {
        return Err(AppError::validation("Password cannot be blank."));
    }
    Ok(())
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        check_name(&self.name)?;
        check_email(&self.email)?;
        check_password(&self.password)
    }
}

impl LoginRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.email.trim().is_empty() {
            return Err(AppError::validation("Email cannot be blank."));
        }
        check_password(&self.password)
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            roles: u.roles.to_vec(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}
