pub mod claims;
pub mod extractors;
pub mod jwt;
pub mod password;
pub mod roles;

pub use extractors::{AdminPrincipal, Principal};
pub use jwt::JwtKeys;
pub use password::CredentialHasher;
pub use roles::{Role, Roles};
