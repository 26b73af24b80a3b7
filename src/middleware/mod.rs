pub mod auth;

pub use auth::{require_principal, AuthContext, IdentityVerifier, Principal};
