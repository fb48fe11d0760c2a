//! `merx-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: tokens,
//! credentials and the permission matrix live here; loading users and
//! attaching request context is the API layer's job.

pub mod claims;
pub mod matrix;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod token;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use matrix::{Action, PermissionMatrix, UserKind, evaluate};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::Permission;
pub use roles::Role;
pub use token::{Hs256JwtKey, JwtSigner, JwtValidator, TokenError};
