//! Request middleware

pub mod auth;

pub use auth::{identity_middleware, AuthUser, CurrentUser, USERNAME_HEADER};
