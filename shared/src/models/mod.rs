//! Domain models for the Cold Storage Management Platform

mod catalog;
mod client;
mod stock;
mod user;

pub use catalog::*;
pub use client::*;
pub use stock::*;
pub use user::*;
