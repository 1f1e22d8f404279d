//! HTTP handlers

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod geo;
pub mod health;
pub mod stocks;

pub use auth::*;
pub use catalog::*;
pub use clients::*;
pub use geo::*;
pub use health::*;
pub use stocks::*;
