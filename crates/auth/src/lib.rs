//! `comercio-auth` — authentication/session boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage engines: it
//! models role labels, token claims, and the client-held session snapshot.
//! The external identity provider (which proves who the caller is) lives
//! outside this system; everything here starts from its verified uid.

pub mod claims;
pub mod roles;
pub mod session;
pub mod store;

pub use claims::{Hs256Jwt, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use roles::Role;
pub use session::{EmployeeProfile, SessionUser, UserSession};
pub use store::SessionStore;
