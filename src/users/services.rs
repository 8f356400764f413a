use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{
    check_email, check_name, check_password, normalize_email, normalize_name, LoginRequest,
    RegisterRequest, UpdateUserRequest,
};
use super::repo::UserStore;
use super::repo_types::{NewUser, User, UserChanges};
use crate::auth::{CredentialHasher, JwtKeys, Role, Roles};
use crate::config::AdminSeed;
use crate::error::{AppError, AppResult};

/// Registration, login and record lifecycle rules on top of a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: CredentialHasher,
    keys: JwtKeys,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: CredentialHasher, keys: JwtKeys) -> Self {
        Self {
            store,
            hasher,
            keys,
        }
    }

    pub async fn register(
        &self,
        req: RegisterRequest,
        roles: Option<Roles>,
    ) -> AppResult<(User, String)> {
        req.validate()?;
        let email = normalize_email(&req.email);

        // Fast path only; the store's unique constraint is authoritative.
        if self.store.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AppError::email_taken());
        }

        let password_hash = self.hash(req.password).await?;
        let user = self
            .store
            .insert(NewUser {
                name: normalize_name(&req.name),
                email,
                password_hash,
                roles: roles.unwrap_or_default(),
            })
            .await?;

        let token = self.keys.issue(&user)?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok((user, token))
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<(User, String)> {
        req.validate()?;
        let email = normalize_email(&req.email);

        let Some(user) = self.store.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(AppError::user_not_found());
        };

        if !self.verify(req.password, user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::auth("Invalid password."));
        }

        let token = self.keys.issue(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok((user, token))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::user_not_found)
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn update(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<User> {
        let mut changes = UserChanges::default();

        if let Some(email) = req.email.as_deref() {
            check_email(email)?;
            let email = normalize_email(email);
            if let Some(existing) = self.store.find_by_email(&email).await? {
                if existing.id != id {
                    warn!(user_id = %id, email = %email, "email taken by another user");
                    return Err(AppError::email_taken());
                }
            }
            changes.email = Some(email);
        }

        if let Some(name) = req.name.as_deref() {
            check_name(name)?;
            changes.name = Some(normalize_name(name));
        }

        if let Some(password) = req.password {
            check_password(&password)?;
            changes.password_hash = Some(self.hash(password).await?);
        }

        if changes.is_empty() {
            return Err(AppError::validation("No field completed for updating."));
        }

        let user = self
            .store
            .update_by_id(id, changes)
            .await?
            .ok_or_else(AppError::user_not_found)?;
        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_by_id(id).await? {
            return Err(AppError::user_not_found());
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Creates the configured administrator unless the email is already taken.
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> AppResult<Option<User>> {
        if self
            .store
            .find_by_email(&normalize_email(&seed.email))
            .await?
            .is_some()
        {
            return Ok(None);
        }
        let req = RegisterRequest {
            name: seed.name.clone(),
            email: seed.email.clone(),
            password: seed.password.clone(),
        };
        match self.register(req, Some(Roles::new([Role::Admin, Role::User]))).await {
            Ok((user, _)) => {
                info!(user_id = %user.id, "admin account created");
                Ok(Some(user))
            }
            // Lost a race with another instance seeding the same account.
            Err(AppError::Conflict(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn hash(&self, password: String) -> AppResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("password hashing task failed")?
    }

    async fn verify(&self, password: String, hash: String) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .context("password verification task failed")?)
    }
}
