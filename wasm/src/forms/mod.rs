//! Form state for each dashboard panel

pub mod acceptance;
pub mod client;
pub mod commodity;
pub mod delivery;

pub use acceptance::AcceptanceForm;
pub use client::{ClientDraft, ClientField, ClientForm};
pub use commodity::CommodityForm;
pub use delivery::DeliveryForm;

use rust_decimal::Decimal;

use crate::error::FormError;
use shared::validate_quantity;

fn parse_client_id(raw: &str) -> Result<i64, FormError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| FormError::Invalid("Client ID must be a positive number".to_string()))
}

fn parse_quantity(raw: &str) -> Result<Decimal, FormError> {
    let quantity = raw
        .trim()
        .parse::<Decimal>()
        .map_err(|_| FormError::Invalid("Quantity must be a number".to_string()))?;
    validate_quantity(quantity).map_err(|m| FormError::Invalid(m.to_string()))?;
    Ok(quantity)
}
