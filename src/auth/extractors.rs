use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use super::{claims::Claims, jwt::JwtKeys, roles::Role};
use crate::error::AppError;

/// Identity attached to a request after its token has been verified.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
}

impl From<Claims> for Principal {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            email: c.email,
            roles: c.roles,
        }
    }
}

impl Principal {
    /// Passes when the principal holds at least one of `required`.
    pub fn authorize(&self, required: &[Role]) -> Result<(), AppError> {
        if self.roles.is_empty() {
            warn!(user_id = %self.id, email = %self.email, "principal has no role");
            return Err(AppError::forbidden());
        }
        if !self.roles.iter().any(|r| required.contains(r)) {
            warn!(user_id = %self.id, email = %self.email, roles = ?self.roles, "insufficient role");
            return Err(AppError::forbidden());
        }
        Ok(())
    }
}

/// Reads the bearer token (prefix optional) and verifies it.
pub fn authenticate(headers: &HeaderMap, keys: &JwtKeys) -> Result<Principal, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::auth("Token not informed."))?;

    let invalid = || AppError::auth("Token is invalid or expired.");
    let raw = header.to_str().map_err(|_| invalid())?.trim();
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();

    match keys.verify(token) {
        Ok(claims) => Ok(claims.into()),
        Err(e) => {
            warn!(error = %e, "rejected token");
            Err(invalid())
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }
        let keys = JwtKeys::from_ref(state);
        let principal = authenticate(&parts.headers, &keys)?;
        parts.extensions.insert(principal.clone());
        Ok(principal)
    }
}

/// Authenticated principal holding the ADMIN role.
pub struct AdminPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        principal.authorize(&[Role::Admin])?;
        Ok(AdminPrincipal(principal))
    }
}
