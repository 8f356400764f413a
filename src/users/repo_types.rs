use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::{Role, Roles};

/// User record as held by the store.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,                   // assigned by the store
    pub name: String,               // lowercased
    pub email: String,              // trimmed + lowercased, unique
    pub password_hash: String,      // Argon2 PHC string, never serialized
    pub roles: Roles,               // never empty
    pub created_at: OffsetDateTime, // creation timestamp
    pub updated_at: OffsetDateTime, // last write timestamp
}

/// Raw `users` row.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let roles = r
            .roles
            .iter()
            .map(|s| s.parse::<Role>())
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
            roles: Roles::new(roles),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated, normalized data for a new record.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Roles,
}

/// Fields to overwrite on update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password_hash.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(roles: &[&str]) -> UserRow {
        let now = OffsetDateTime::now_utc();
        UserRow {
            id: Uuid::new_v4(),
            name: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$...".into(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_roles_become_a_set() {
        let user = User::try_from(row(&["ADMIN", "USER"])).unwrap();
        assert!(user.roles.contains(Role::Admin));
        assert!(user.roles.contains(Role::User));
    }

    #[test]
    fn unknown_stored_role_is_an_error() {
        assert!(User::try_from(row(&["SUPERUSER"])).is_err());
    }

    #[test]
    fn empty_changes() {
        assert!(UserChanges::default().is_empty());
        let changes = UserChanges {
            name: Some("x".into()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
