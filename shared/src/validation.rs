//! Validation and normalization utilities for the Cold Storage Management Platform
//!
//! Includes India-specific formats (10-digit mobile numbers, 6-digit PIN codes)
//! and the naming conventions shared by the browser forms and the server.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{ClientInput, ClientType};

/// A validation failure attributed to one input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Upper-case the first character of every word and lower-case the rest.
///
/// Words are maximal runs of alphanumerics/underscore; everything between
/// them (spaces, hyphens, apostrophes, dots) is copied through unchanged,
/// so `"o'neil-SMITH"` becomes `"O'Neil-Smith"`.
pub fn capitalize_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;

    for c in input.chars() {
        if is_word_char(c) {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Organisation name used for farmers: "first last", trimmed
pub fn farmer_org_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string()
}

fn code_prefix(name: &str) -> String {
    name.trim().chars().take(3).collect::<String>().to_uppercase()
}

/// Derive the commodity code for a commodity/variety pair.
///
/// `("Wheat", "Sharbati")` → `"WHE-SHA"`. Names shorter than three characters
/// contribute the whole name.
pub fn derive_commodity_code(commodity: &str, variety: &str) -> String {
    format!("{}-{}", code_prefix(commodity), code_prefix(variety))
}

// ============================================================================
// Field Validations
// ============================================================================

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

/// Validate an Indian mobile number: exactly 10 digits, no separators
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if is_digits(phone, 10) {
        Ok(())
    } else {
        Err("Phone must be a 10-digit number.")
    }
}

/// Validate an Indian postal PIN code: exactly 6 digits
pub fn validate_pincode(pincode: &str) -> Result<(), &'static str> {
    if is_digits(pincode, 6) {
        Ok(())
    } else {
        Err("Pincode must be a 6-digit number.")
    }
}

/// Validate email shape: `local@domain.tld`
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if validator::validate_email(email) && email.rsplit_once('@').map_or(false, |(_, d)| d.contains('.')) {
        Ok(())
    } else {
        Err("Email is not valid.")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a stock movement quantity
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

// ============================================================================
// Client Validations
// ============================================================================

/// Which endpoint the client payload is headed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientWrite {
    Create,
    Update,
}

/// Widths of the `clients` text columns, in characters
fn length_limits(input: &ClientInput) -> [(&'static str, &'static str, &Option<String>, usize); 11] {
    [
        ("first_name", "First Name", &input.first_name, 80),
        ("last_name", "Last Name", &input.last_name, 80),
        ("org_name", "Org Name", &input.org_name, 120),
        ("s_o", "S/o", &input.s_o, 100),
        ("address", "Address", &input.address, 200),
        ("village", "Village", &input.village, 100),
        ("mandal", "Mandal", &input.mandal, 100),
        ("district", "District", &input.district, 100),
        ("state", "State", &input.state, 100),
        ("city", "City", &input.city, 100),
        ("email", "Email", &input.email, 100),
    ]
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}

/// Validate a normalized client payload.
///
/// Creates must carry the full required set; updates only have their
/// supplied fields checked.
pub fn validate_client_input(input: &ClientInput, mode: ClientWrite) -> Result<(), FieldError> {
    if mode == ClientWrite::Create {
        let required: [(&'static str, bool); 6] = [
            ("first_name", present(&input.first_name)),
            ("last_name", present(&input.last_name)),
            ("client_type", input.client_type.is_some()),
            ("village", present(&input.village)),
            ("mandal", present(&input.mandal)),
            ("phone", present(&input.phone)),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(field, _)| *field)
            .collect();
        if let Some(first) = missing.first() {
            return Err(FieldError::new(
                first,
                format!("Missing fields: {}", missing.join(", ")),
            ));
        }

        match input.client_type {
            Some(ClientType::Farmer) if !present(&input.s_o) => {
                return Err(FieldError::new("s_o", "S/o is required for Farmers"));
            }
            Some(ClientType::Trader) if !present(&input.org_name) => {
                return Err(FieldError::new(
                    "org_name",
                    "Org Name is required for Traders",
                ));
            }
            _ => {}
        }
    }

    for (field, label, value, max) in length_limits(input) {
        if value.as_deref().map_or(false, |v| v.chars().count() > max) {
            return Err(FieldError::new(
                field,
                format!("{} must be at most {} characters.", label, max),
            ));
        }
    }

    if let Some(phone) = &input.phone {
        validate_phone(phone).map_err(|m| FieldError::new("phone", m))?;
    }
    if let Some(alt_phone) = &input.alt_phone {
        validate_phone(alt_phone)
            .map_err(|_| FieldError::new("alt_phone", "Alt Phone must be a 10-digit number."))?;
    }
    if let Some(pincode) = &input.pincode {
        validate_pincode(pincode).map_err(|m| FieldError::new("pincode", m))?;
    }
    if let Some(email) = &input.email {
        validate_email(email).map_err(|m| FieldError::new("email", m))?;
    }

    Ok(())
}
