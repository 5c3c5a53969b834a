//! Account authentication.
//!
//! - [`password`]: Argon2id hashing and verification.
//! - [`jwt`]: HS256 bearer token issue and validation.
//! - [`extractor`]: the `AuthUser` extractor for protected handlers.
//! - [`handlers`]: `/api/auth/*` routes.

pub mod extractor;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use extractor::AuthUser;
