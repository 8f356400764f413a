use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::roles::{one_or_many, Role};

/// JWT payload identifying a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // user ID
    pub email: String, // normalized email
    #[serde(default, alias = "role", deserialize_with = "one_or_many")]
    pub roles: Vec<Role>,
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
}
