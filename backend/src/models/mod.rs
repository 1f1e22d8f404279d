//! Models for the Cold Storage Management Platform
//!
//! Re-exports models from the shared crate; row types live next to the
//! service that queries them.

pub use shared::models::*;
