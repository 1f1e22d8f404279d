//! WebAssembly client for the Cold Storage Management Platform
//!
//! Provides the browser-side state behind the dashboard:
//! - Typed API client identifying the user with `X-Username`
//! - Session persistence in `localStorage`
//! - Cascading commodity/variety/grade and state/city selectors
//! - Client, catalog, acceptance and delivery forms
//! - Role-based form gating

use wasm_bindgen::prelude::*;

pub mod api;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod selector;
pub mod session;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, WarehouseApi};
pub use dashboard::{permitted_forms, Dashboard, FormKind};
pub use error::{ClientError, FormError};
pub use selector::{CascadingSelector, GeoSelector, Resolution};
pub use session::{MemoryStore, SessionHolder, SessionState, SessionStore};

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&JsValue::from_str("cold storage client ready"));
}

/// Word-capitalize a free-text field as it will be stored
#[wasm_bindgen]
pub fn capitalize_name(input: &str) -> String {
    capitalize_words(input)
}

/// Commodity code for a commodity/variety pair, e.g. "WHE-SHA"
#[wasm_bindgen]
pub fn commodity_code_for(commodity: &str, variety: &str) -> String {
    derive_commodity_code(commodity, variety)
}

/// Organisation name shown for a farmer while the name is typed
#[wasm_bindgen]
pub fn farmer_org_name_for(first_name: &str, last_name: &str) -> String {
    farmer_org_name(first_name, last_name)
}

#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    validate_phone(phone.trim()).is_ok()
}

#[wasm_bindgen]
pub fn is_valid_pincode(pincode: &str) -> bool {
    validate_pincode(pincode.trim()).is_ok()
}

#[wasm_bindgen]
pub fn is_valid_email(email: &str) -> bool {
    validate_email(email.trim()).is_ok()
}

/// Check a new-client payload the way the server will
#[wasm_bindgen]
pub fn check_client_json(client_json: &str) -> Result<(), JsValue> {
    let input: ClientInput = serde_json::from_str(client_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid client JSON: {}", e)))?;

    validate_client_input(&input.normalized(), ClientWrite::Create)
        .map_err(|e| JsValue::from_str(&e.message))
}

/// Form names to render for a role; an unknown role gets the login form
#[wasm_bindgen]
pub fn forms_for_role(role: &str) -> js_sys::Array {
    let session = role.parse::<Role>().ok().map(|role| Session {
        username: String::new(),
        role,
    });

    permitted_forms(session.as_ref())
        .into_iter()
        .map(|kind| JsValue::from_str(kind.as_str()))
        .collect()
}
