//! Authentication and authorization tests
//!
//! Property-based and unit tests for:
//! - Role parsing and wire format
//! - Role capability enforcement
//! - Login response → persisted session

use proptest::prelude::*;
use shared::{Capability, CreateUserInput, LoginResponse, Role, Session};
use validator::Validate;

// ============================================================================
// Property Test Strategies
// ============================================================================

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Manager), Just(Role::Staff)]
}

/// A role name with arbitrary letter casing
fn role_name_strategy() -> impl Strategy<Value = (Role, String)> {
    (role_strategy(), prop::collection::vec(any::<bool>(), 7)).prop_map(|(role, upper)| {
        let name = role
            .as_str()
            .chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect();
        (role, name)
    })
}

fn username_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{2,20}"
}

fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Role names parse regardless of case
    #[test]
    fn test_role_parsing_is_case_insensitive((role, name) in role_name_strategy()) {
        prop_assert_eq!(name.parse::<Role>(), Ok(role));
    }

    /// Every capability granted to staff is also granted to managers and
    /// admins
    #[test]
    fn test_capabilities_are_nested(role in role_strategy()) {
        for capability in role.capabilities() {
            prop_assert!(Role::Admin.can(*capability));
        }
        if role == Role::Staff {
            for capability in role.capabilities() {
                prop_assert!(Role::Manager.can(*capability));
            }
        }
    }

    /// The session persisted after login carries the same user and role
    #[test]
    fn test_session_from_login(username in username_strategy(), role in role_strategy()) {
        let response = LoginResponse {
            message: "Login successful".to_string(),
            username: username.clone(),
            role,
        };
        let json = serde_json::to_string(&response).unwrap();
        let parsed: LoginResponse = serde_json::from_str(&json).unwrap();
        let session = Session::from(parsed);

        prop_assert_eq!(session.username, username);
        prop_assert_eq!(session.role, role);
    }

    #[test]
    fn test_valid_user_input_passes(
        username in username_strategy(),
        password in password_strategy(),
        role in role_strategy(),
    ) {
        let input = CreateUserInput { username, password, role };
        prop_assert!(input.validate().is_ok());
    }

    #[test]
    fn test_short_password_rejected(
        username in username_strategy(),
        password in "[a-z0-9]{0,7}",
    ) {
        let input = CreateUserInput { username, password, role: Role::Staff };
        let errors = input.validate().unwrap_err();
        prop_assert!(errors.field_errors().contains_key("password"));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_role_wire_format() {
    assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), r#""manager""#);
    let role: Role = serde_json::from_str(r#""staff""#).unwrap();
    assert_eq!(role, Role::Staff);
    assert!("owner".parse::<Role>().is_err());
}

#[test]
fn test_staff_capabilities() {
    assert!(Role::Staff.can(Capability::AcceptStock));
    assert!(Role::Staff.can(Capability::DeliverStock));
    assert!(!Role::Staff.can(Capability::ManageClients));
    assert!(!Role::Staff.can(Capability::ManageCatalog));
    assert!(!Role::Staff.can(Capability::ViewStockLedger));
    assert!(!Role::Staff.can(Capability::ManageUsers));
}

#[test]
fn test_manager_capabilities() {
    assert!(Role::Manager.can(Capability::ManageClients));
    assert!(Role::Manager.can(Capability::ViewStockLedger));
    assert!(!Role::Manager.can(Capability::ManageCatalog));
    assert!(!Role::Manager.can(Capability::ManageUsers));
}

#[test]
fn test_admin_has_every_capability() {
    assert_eq!(Role::Admin.capabilities().len(), 6);
}
