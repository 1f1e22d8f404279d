//! Business logic services for the Cold Storage Management Platform

pub mod auth;
pub mod catalog;
pub mod client;
pub mod geo;
pub mod stock;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use client::ClientService;
pub use geo::GeoService;
pub use stock::StockService;
