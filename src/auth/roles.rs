use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// Non-empty set of roles held by a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roles(BTreeSet<Role>);

impl Roles {
    /// Builds a role set, falling back to `{USER}` when nothing is given.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        let set: BTreeSet<Role> = roles.into_iter().collect();
        if set.is_empty() {
            Self::default()
        } else {
            Self(set)
        }
    }

    #[cfg(test)]
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Role> {
        self.iter().collect()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl Default for Roles {
    fn default() -> Self {
        Self(BTreeSet::from([Role::User]))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Role),
    Many(Vec<Role>),
}

/// Reads either a single role string or a list of roles.
pub fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Role>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_defaults_to_user() {
        let roles = Roles::new(Vec::new());
        assert_eq!(roles.to_vec(), vec![Role::User]);
    }

    fn roles_from(json: &str) -> Roles {
        let mut de = serde_json::Deserializer::from_str(json);
        Roles::new(one_or_many(&mut de).unwrap())
    }

    #[test]
    fn single_role_string_is_a_one_element_set() {
        assert_eq!(roles_from(r#""ADMIN""#).to_vec(), vec![Role::Admin]);
        assert_eq!(
            roles_from(r#"["ADMIN","USER","ADMIN"]"#).to_vec(),
            vec![Role::User, Role::Admin]
        );
        assert_eq!(roles_from("[]").to_vec(), vec![Role::User]);
    }

    #[test]
    fn serializes_as_uppercase_array() {
        let json = serde_json::to_string(&Roles::new([Role::Admin])).unwrap();
        assert_eq!(json, r#"["ADMIN"]"#);
    }

    #[test]
    fn parses_stored_strings() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }
}
