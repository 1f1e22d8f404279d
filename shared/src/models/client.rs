//! Client registry models

use serde::{Deserialize, Serialize};

use crate::validation::{capitalize_words, farmer_org_name};

/// Kind of party storing goods in the warehouse
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ClientType {
    Farmer,
    Trader,
}

impl ClientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Farmer => "Farmer",
            ClientType::Trader => "Trader",
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClientType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Farmer" | "farmer" => Ok(ClientType::Farmer),
            "Trader" | "trader" => Ok(ClientType::Trader),
            _ => Err("Client type must be Farmer or Trader"),
        }
    }
}

/// A registered client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: i64,
    pub client_type: ClientType,
    pub first_name: String,
    pub last_name: String,
    pub org_name: String,
    pub s_o: Option<String>,
    pub address: Option<String>,
    pub village: Option<String>,
    pub mandal: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub phone: String,
    pub alt_phone: Option<String>,
    pub email: Option<String>,
}

/// Create/update payload for a client.
///
/// Every field is optional on the wire: `POST /clients` enforces the required
/// set, `PUT /clients/:id` applies only the fields present. On update a field
/// sent as `""` is present, so it clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_type: Option<ClientType>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub s_o: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub mandal: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub alt_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Free-text fields that are word-capitalized before they are stored
pub const CAPITALIZED_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "s_o",
    "address",
    "village",
    "mandal",
    "district",
    "state",
    "city",
    "org_name",
];

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_capitalized(value: Option<String>) -> Option<String> {
    clean(value).map(|v| capitalize_words(&v))
}

impl ClientInput {
    /// Trim every field, drop blanks, capitalize the free-text fields and
    /// derive the organisation name for farmers.
    pub fn normalized(self) -> Self {
        let mut out = Self {
            client_type: self.client_type,
            first_name: clean_capitalized(self.first_name),
            last_name: clean_capitalized(self.last_name),
            org_name: clean_capitalized(self.org_name),
            s_o: clean_capitalized(self.s_o),
            address: clean_capitalized(self.address),
            village: clean_capitalized(self.village),
            mandal: clean_capitalized(self.mandal),
            district: clean_capitalized(self.district),
            state: clean_capitalized(self.state),
            city: clean_capitalized(self.city),
            pincode: clean(self.pincode),
            phone: clean(self.phone),
            alt_phone: clean(self.alt_phone),
            email: clean(self.email),
        };

        if out.client_type == Some(ClientType::Farmer) {
            let derived = farmer_org_name(
                out.first_name.as_deref().unwrap_or_default(),
                out.last_name.as_deref().unwrap_or_default(),
            );
            out.org_name = Some(derived).filter(|name| !name.is_empty());
        }

        out
    }

    /// Overlay the fields present in this update onto the stored client.
    ///
    /// Call on the raw update: a blank field still wins here and only becomes
    /// `None` when the result is normalized.
    pub fn overlaid_on(self, existing: Client) -> Self {
        Self {
            client_type: self.client_type.or(Some(existing.client_type)),
            first_name: self.first_name.or(Some(existing.first_name)),
            last_name: self.last_name.or(Some(existing.last_name)),
            org_name: self.org_name.or(Some(existing.org_name)),
            s_o: self.s_o.or(existing.s_o),
            address: self.address.or(existing.address),
            village: self.village.or(existing.village),
            mandal: self.mandal.or(existing.mandal),
            district: self.district.or(existing.district),
            state: self.state.or(existing.state),
            city: self.city.or(existing.city),
            pincode: self.pincode.or(existing.pincode),
            phone: self.phone.or(Some(existing.phone)),
            alt_phone: self.alt_phone.or(existing.alt_phone),
            email: self.email.or(existing.email),
        }
    }

    /// Send every empty text field as `""`, so an update clears it
    pub fn with_blanks(self) -> Self {
        let blank = |v: Option<String>| Some(v.unwrap_or_default());
        Self {
            client_type: self.client_type,
            first_name: blank(self.first_name),
            last_name: blank(self.last_name),
            org_name: blank(self.org_name),
            s_o: blank(self.s_o),
            address: blank(self.address),
            village: blank(self.village),
            mandal: blank(self.mandal),
            district: blank(self.district),
            state: blank(self.state),
            city: blank(self.city),
            pincode: blank(self.pincode),
            phone: blank(self.phone),
            alt_phone: blank(self.alt_phone),
            email: blank(self.email),
        }
    }
}

/// `GET /clients` and `GET /clients/search` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientsResponse {
    pub clients: Vec<Client>,
}

/// `POST /clients` and `PUT /clients/:id` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientResponse {
    pub client: Client,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_capitalizes_and_trims() {
        let input = ClientInput {
            client_type: Some(ClientType::Trader),
            first_name: Some("  john ".to_string()),
            last_name: Some("DOE".to_string()),
            org_name: Some("sri lakshmi traders".to_string()),
            village: Some("kondapur".to_string()),
            phone: Some(" 9876543210 ".to_string()),
            email: Some(String::new()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(input.first_name.as_deref(), Some("John"));
        assert_eq!(input.last_name.as_deref(), Some("Doe"));
        assert_eq!(input.org_name.as_deref(), Some("Sri Lakshmi Traders"));
        assert_eq!(input.village.as_deref(), Some("Kondapur"));
        assert_eq!(input.phone.as_deref(), Some("9876543210"));
        assert_eq!(input.email, None);
    }

    #[test]
    fn test_farmer_org_name_is_derived() {
        let input = ClientInput {
            client_type: Some(ClientType::Farmer),
            first_name: Some("ravi".to_string()),
            last_name: Some("kumar".to_string()),
            org_name: Some("Something Else".to_string()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(input.org_name.as_deref(), Some("Ravi Kumar"));
    }

    fn stored_trader() -> Client {
        Client {
            id: 7,
            client_type: ClientType::Trader,
            first_name: "Sita".to_string(),
            last_name: "Devi".to_string(),
            org_name: "Devi Traders".to_string(),
            s_o: None,
            address: Some("Main Road".to_string()),
            village: Some("Tenali".to_string()),
            mandal: Some("Tenali".to_string()),
            district: Some("Guntur".to_string()),
            state: Some("Andhra Pradesh".to_string()),
            city: Some("Guntur".to_string()),
            pincode: Some("522201".to_string()),
            phone: "9876543210".to_string(),
            alt_phone: Some("9123456780".to_string()),
            email: Some("old@example.com".to_string()),
        }
    }

    #[test]
    fn test_blank_update_clears_optional_fields() {
        let update = ClientInput {
            email: Some(String::new()),
            alt_phone: Some("  ".to_string()),
            ..Default::default()
        };
        let merged = update.overlaid_on(stored_trader()).normalized();

        assert_eq!(merged.email, None);
        assert_eq!(merged.alt_phone, None);
        assert_eq!(merged.pincode.as_deref(), Some("522201"));
        assert_eq!(merged.org_name.as_deref(), Some("Devi Traders"));
    }

    #[test]
    fn test_absent_update_fields_keep_stored_values() {
        let update = ClientInput {
            village: Some("ponnur".to_string()),
            ..Default::default()
        };
        let merged = update.overlaid_on(stored_trader()).normalized();

        assert_eq!(merged.village.as_deref(), Some("Ponnur"));
        assert_eq!(merged.email.as_deref(), Some("old@example.com"));
        assert_eq!(merged.client_type, Some(ClientType::Trader));
    }

    #[test]
    fn test_with_blanks_sends_every_text_field() {
        let input = ClientInput {
            client_type: Some(ClientType::Farmer),
            first_name: Some("Ravi".to_string()),
            ..Default::default()
        }
        .with_blanks();

        assert_eq!(input.first_name.as_deref(), Some("Ravi"));
        assert_eq!(input.email.as_deref(), Some(""));
        assert_eq!(input.district.as_deref(), Some(""));
        assert_eq!(input.client_type, Some(ClientType::Farmer));

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["alt_phone"], "");
    }

    #[test]
    fn test_client_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&ClientType::Farmer).unwrap(),
            r#""Farmer""#
        );
        assert_eq!("trader".parse::<ClientType>(), Ok(ClientType::Trader));
    }
}
