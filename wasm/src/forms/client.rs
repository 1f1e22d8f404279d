//! Client registry form

use crate::api::WarehouseApi;
use crate::error::FormError;
use crate::selector::GeoSelector;
use shared::{farmer_org_name, Client, ClientInput, ClientType};

/// Text inputs of the client form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    FirstName,
    LastName,
    OrgName,
    SO,
    Address,
    Village,
    Mandal,
    District,
    /// Free-text city, used when the state has no city list
    ManualCity,
    Pincode,
    Phone,
    AltPhone,
    Email,
}

/// Raw form contents as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDraft {
    /// Set while editing an existing client
    pub id: Option<i64>,
    pub client_type: Option<ClientType>,
    pub first_name: String,
    pub last_name: String,
    pub org_name: String,
    pub s_o: String,
    pub address: String,
    pub village: String,
    pub mandal: String,
    pub district: String,
    pub manual_city: String,
    pub pincode: String,
    pub phone: String,
    pub alt_phone: String,
    pub email: String,
}

fn filled(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Default)]
pub struct ClientForm {
    draft: ClientDraft,
    geo: GeoSelector,
    clients: Vec<Client>,
}

impl ClientForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the client list and the state options
    pub async fn load<A: WarehouseApi>(&mut self, api: &A) -> Result<(), FormError> {
        self.geo.load_states(api).await;
        self.refresh(api).await
    }

    pub fn draft(&self) -> &ClientDraft {
        &self.draft
    }

    pub fn geo(&self) -> &GeoSelector {
        &self.geo
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn set_client_type(&mut self, client_type: Option<ClientType>) {
        self.draft.client_type = client_type;
        self.track_org_name();
    }

    pub fn set_field(&mut self, field: ClientField, value: impl Into<String>) {
        let value = value.into();
        let d = &mut self.draft;
        match field {
            ClientField::FirstName => d.first_name = value,
            ClientField::LastName => d.last_name = value,
            ClientField::OrgName => d.org_name = value,
            ClientField::SO => d.s_o = value,
            ClientField::Address => d.address = value,
            ClientField::Village => d.village = value,
            ClientField::Mandal => d.mandal = value,
            ClientField::District => d.district = value,
            ClientField::ManualCity => d.manual_city = value,
            ClientField::Pincode => d.pincode = value,
            ClientField::Phone => d.phone = value,
            ClientField::AltPhone => d.alt_phone = value,
            ClientField::Email => d.email = value,
        }
        if matches!(field, ClientField::FirstName | ClientField::LastName) {
            self.track_org_name();
        }
    }

    /// Farmers' organisation name follows their name
    fn track_org_name(&mut self) {
        if self.draft.client_type == Some(ClientType::Farmer) {
            self.draft.org_name = farmer_org_name(&self.draft.first_name, &self.draft.last_name);
        }
    }

    pub async fn choose_state<A: WarehouseApi>(&mut self, api: &A, state: Option<String>) {
        self.geo.choose_state(api, state).await;
    }

    pub fn choose_city(&mut self, city: Option<String>) {
        self.geo.select_city(city);
    }

    /// City from the drop-down, or the free-text city when there are no options
    pub fn city(&self) -> Option<String> {
        if self.geo.cities().is_empty() {
            filled(&self.draft.manual_city)
        } else {
            self.geo.city().and_then(filled)
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        let d = &self.draft;
        let missing = |label: &str| Err(FormError::Invalid(format!("{} is required", label)));

        if d.client_type.is_none() {
            return missing("Client type");
        }
        let required = [
            ("First name", &d.first_name),
            ("Last name", &d.last_name),
            ("Village", &d.village),
            ("Mandal", &d.mandal),
            ("Phone", &d.phone),
        ];
        if let Some((label, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return missing(*label);
        }
        if self.geo.state().and_then(filled).is_none() {
            return missing("State");
        }
        if self.city().is_none() {
            return missing("City");
        }
        match d.client_type {
            Some(ClientType::Farmer) if d.s_o.trim().is_empty() => missing("S/o"),
            Some(ClientType::Trader) if d.org_name.trim().is_empty() => missing("Org name"),
            _ => Ok(()),
        }
    }

    /// The payload as it will be sent: trimmed and capitalized
    pub fn prepared(&self) -> ClientInput {
        let d = &self.draft;
        ClientInput {
            client_type: d.client_type,
            first_name: filled(&d.first_name),
            last_name: filled(&d.last_name),
            org_name: filled(&d.org_name),
            s_o: filled(&d.s_o),
            address: filled(&d.address),
            village: filled(&d.village),
            mandal: filled(&d.mandal),
            district: filled(&d.district),
            state: self.geo.state().and_then(filled),
            city: self.city(),
            pincode: filled(&d.pincode),
            phone: filled(&d.phone),
            alt_phone: filled(&d.alt_phone),
            email: filled(&d.email),
        }
        .normalized()
    }

    /// Create, or update when editing; then clear the form and reload the list
    pub async fn submit<A: WarehouseApi>(&mut self, api: &A) -> Result<Client, FormError> {
        self.validate()?;
        let input = self.prepared();

        // Emptied inputs go out as "" so the server clears them
        let result = match self.draft.id {
            Some(id) => api.update_client(id, &input.with_blanks()).await,
            None => api.create_client(&input).await,
        };
        let client = result.map_err(|e| FormError::Rejected(e.user_message("Submission failed")))?;

        tracing::info!(client_id = client.id, "Client saved");
        self.reset();
        self.refresh(api).await?;
        Ok(client)
    }

    /// Load a listed client into the form for editing
    pub async fn edit<A: WarehouseApi>(&mut self, api: &A, client: &Client) {
        self.draft = ClientDraft {
            id: Some(client.id),
            client_type: Some(client.client_type),
            first_name: client.first_name.clone(),
            last_name: client.last_name.clone(),
            org_name: client.org_name.clone(),
            s_o: client.s_o.clone().unwrap_or_default(),
            address: client.address.clone().unwrap_or_default(),
            village: client.village.clone().unwrap_or_default(),
            mandal: client.mandal.clone().unwrap_or_default(),
            district: client.district.clone().unwrap_or_default(),
            manual_city: String::new(),
            pincode: client.pincode.clone().unwrap_or_default(),
            phone: client.phone.clone(),
            alt_phone: client.alt_phone.clone().unwrap_or_default(),
            email: client.email.clone().unwrap_or_default(),
        };

        self.geo.choose_state(api, client.state.clone()).await;
        if self.geo.cities().is_empty() {
            self.draft.manual_city = client.city.clone().unwrap_or_default();
        } else {
            self.geo.select_city(client.city.clone());
        }
    }

    pub async fn delete<A: WarehouseApi>(&mut self, api: &A, id: i64) -> Result<(), FormError> {
        api.delete_client(id)
            .await
            .map_err(|e| FormError::Rejected(e.user_message("Delete failed")))?;
        self.refresh(api).await
    }

    /// Replace the list with the server's matches for `query`
    pub async fn search<A: WarehouseApi>(&mut self, api: &A, query: &str) -> Result<(), FormError> {
        self.clients = api
            .search_clients(query.trim())
            .await
            .map_err(|e| FormError::Rejected(e.user_message("Search failed")))?;
        Ok(())
    }

    pub async fn refresh<A: WarehouseApi>(&mut self, api: &A) -> Result<(), FormError> {
        self.clients = api
            .list_clients()
            .await
            .map_err(|e| FormError::Rejected(e.user_message("Failed to load clients")))?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.draft = ClientDraft::default();
        self.geo.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use tokio_test::block_on;

    async fn filled_farmer(form: &mut ClientForm, api: &FakeApi) {
        form.set_client_type(Some(ClientType::Farmer));
        form.set_field(ClientField::FirstName, "ravi");
        form.set_field(ClientField::LastName, "KUMAR");
        form.set_field(ClientField::SO, "raju");
        form.set_field(ClientField::Village, "tenali");
        form.set_field(ClientField::Mandal, "tenali");
        form.set_field(ClientField::Phone, "9876543210");
        form.choose_state(api, Some("Andhra Pradesh".to_string())).await;
        form.choose_city(Some("Guntur".to_string()));
    }

    #[test]
    fn test_farmer_org_name_tracks_name() {
        let mut form = ClientForm::new();
        form.set_client_type(Some(ClientType::Farmer));
        form.set_field(ClientField::FirstName, "Ravi");
        form.set_field(ClientField::LastName, "Kumar");
        assert_eq!(form.draft().org_name, "Ravi Kumar");
    }

    #[test]
    fn test_trader_org_name_untouched() {
        let mut form = ClientForm::new();
        form.set_client_type(Some(ClientType::Trader));
        form.set_field(ClientField::OrgName, "sri lakshmi traders");
        form.set_field(ClientField::FirstName, "Ravi");
        form.set_field(ClientField::LastName, "Kumar");
        assert_eq!(form.draft().org_name, "sri lakshmi traders");
    }

    #[test]
    fn test_missing_fields_block_submit() {
        let api = FakeApi::default();
        let mut form = ClientForm::new();
        form.set_client_type(Some(ClientType::Farmer));
        form.set_field(ClientField::FirstName, "Ravi");

        let err = block_on(form.submit(&api)).unwrap_err();
        assert_eq!(err, FormError::Invalid("Last name is required".to_string()));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_farmer_needs_s_o() {
        let api = FakeApi::default();
        let mut form = ClientForm::new();
        block_on(filled_farmer(&mut form, &api));
        form.set_field(ClientField::SO, " ");
        assert_eq!(
            form.validate(),
            Err(FormError::Invalid("S/o is required".to_string()))
        );
    }

    #[test]
    fn test_prepared_payload_is_capitalized() {
        let api = FakeApi::default();
        let mut form = ClientForm::new();
        block_on(filled_farmer(&mut form, &api));

        let input = form.prepared();
        assert_eq!(input.first_name.as_deref(), Some("Ravi"));
        assert_eq!(input.last_name.as_deref(), Some("Kumar"));
        assert_eq!(input.org_name.as_deref(), Some("Ravi Kumar"));
        assert_eq!(input.village.as_deref(), Some("Tenali"));
        assert_eq!(input.city.as_deref(), Some("Guntur"));
        assert_eq!(input.email, None);
    }

    #[test]
    fn test_manual_city_when_state_has_no_cities() {
        let api = FakeApi::default();
        let mut form = ClientForm::new();
        block_on(filled_farmer(&mut form, &api));
        block_on(form.choose_state(&api, Some("Goa".to_string())));
        assert!(form.geo().cities().is_empty());
        assert_eq!(
            form.validate(),
            Err(FormError::Invalid("City is required".to_string()))
        );

        form.set_field(ClientField::ManualCity, "panaji");
        assert_eq!(form.prepared().city.as_deref(), Some("Panaji"));
    }

    #[test]
    fn test_submit_without_id_creates_and_resets() {
        let api = FakeApi::default();
        let mut form = ClientForm::new();
        block_on(filled_farmer(&mut form, &api));

        let client = block_on(form.submit(&api)).unwrap();
        assert_eq!(client.org_name, "Ravi Kumar");
        assert_eq!(api.calls(), vec!["create_client", "list_clients"]);
        assert_eq!(form.draft(), &ClientDraft::default());
        assert_eq!(form.geo().state(), None);
        assert_eq!(form.clients().len(), 1);
    }

    #[test]
    fn test_submit_with_id_updates() {
        let api = FakeApi::default().with_client("Ravi", "Kumar", "9876543210");
        let mut form = ClientForm::new();
        block_on(form.refresh(&api)).unwrap();
        let existing = form.clients()[0].clone();

        block_on(form.edit(&api, &existing));
        assert_eq!(form.draft().id, Some(existing.id));
        assert_eq!(form.geo().city(), Some("Guntur"));

        form.set_field(ClientField::Village, "ponnur");
        block_on(form.submit(&api)).unwrap();

        let calls = api.calls();
        assert_eq!(calls[1], format!("update_client:{}", existing.id));
        assert_eq!(form.clients()[0].village.as_deref(), Some("Ponnur"));
        assert_eq!(form.draft().id, None);
    }

    #[test]
    fn test_rejection_keeps_form() {
        let api = FakeApi::default().with_client("Sita", "Devi", "9876543210");
        let mut form = ClientForm::new();
        block_on(filled_farmer(&mut form, &api));

        let err = block_on(form.submit(&api)).unwrap_err();
        assert_eq!(err.message(), "Phone number already exists.");
        assert_eq!(form.draft().first_name, "ravi");
    }

    #[test]
    fn test_search_replaces_list_and_delete_refetches() {
        let api = FakeApi::default()
            .with_client("Ravi", "Kumar", "9876543210")
            .with_client("Sita", "Devi", "9123456780");
        let mut form = ClientForm::new();
        block_on(form.load(&api)).unwrap();
        assert_eq!(form.clients().len(), 2);

        block_on(form.search(&api, "sita")).unwrap();
        assert_eq!(form.clients().len(), 1);

        let id = form.clients()[0].id;
        block_on(form.delete(&api, id)).unwrap();
        assert_eq!(form.clients().len(), 1);
        assert_eq!(form.clients()[0].first_name, "Ravi");
    }

    #[test]
    fn test_edit_clears_emptied_fields() {
        let api = FakeApi::default().with_client("Ravi", "Kumar", "9876543210");
        {
            let mut clients = api.clients.borrow_mut();
            clients[0].email = Some("ravi@example.com".to_string());
            clients[0].district = Some("Guntur".to_string());
        }
        let mut form = ClientForm::new();
        block_on(form.refresh(&api)).unwrap();
        let existing = form.clients()[0].clone();

        block_on(form.edit(&api, &existing));
        assert_eq!(form.draft().email, "ravi@example.com");
        form.set_field(ClientField::Email, "");
        form.set_field(ClientField::District, "  ");
        block_on(form.submit(&api)).unwrap();

        let saved = &form.clients()[0];
        assert_eq!(saved.email, None);
        assert_eq!(saved.district, None);
        assert_eq!(saved.village.as_deref(), Some("Tenali"));
        assert_eq!(saved.phone, "9876543210");
    }
}
