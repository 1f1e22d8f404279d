//! External API integrations

pub mod geo;

pub use geo::{GeoClient, GeoState};
