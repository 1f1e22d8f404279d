//! In-memory `WarehouseApi` for form tests

use std::cell::{Cell, RefCell};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::api::WarehouseApi;
use crate::error::{ApiResult, ClientError};
use shared::{
    derive_commodity_code, AcceptStockInput, AcceptStockResponse, CatalogEntry,
    CatalogImportSummary, CatalogWriteResponse, Client, ClientInput, ClientType, Commodity,
    CreateCommodityInput, DeliverStockInput, DeliverStockResponse, Grade, LoginInput,
    LoginResponse, Role, StockAcceptance, StockDelivery, Variety,
};

pub struct FakeApi {
    pub fail_reference_data: bool,
    /// Deliveries above this are rejected as insufficient stock
    pub stock_on_hand: Decimal,
    pub clients: RefCell<Vec<Client>>,
    pub calls: RefCell<Vec<String>>,
    pub accepted: RefCell<Vec<AcceptStockInput>>,
    pub delivered: RefCell<Vec<DeliverStockInput>>,
    pub created_commodities: RefCell<Vec<CreateCommodityInput>>,
    next_id: Cell<i64>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            fail_reference_data: false,
            stock_on_hand: Decimal::from(100),
            clients: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            accepted: RefCell::new(Vec::new()),
            delivered: RefCell::new(Vec::new()),
            created_commodities: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }
}

fn rejected(status: u16, message: &str) -> ClientError {
    ClientError::Api {
        status,
        message: message.to_string(),
    }
}

fn client_from(id: i64, input: &ClientInput) -> Client {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    Client {
        id,
        client_type: input.client_type.unwrap_or(ClientType::Farmer),
        first_name: text(&input.first_name),
        last_name: text(&input.last_name),
        org_name: text(&input.org_name),
        s_o: input.s_o.clone(),
        address: input.address.clone(),
        village: input.village.clone(),
        mandal: input.mandal.clone(),
        district: input.district.clone(),
        state: input.state.clone(),
        city: input.city.clone(),
        pincode: input.pincode.clone(),
        phone: text(&input.phone),
        alt_phone: input.alt_phone.clone(),
        email: input.email.clone(),
    }
}

impl FakeApi {
    /// Every reference-data lookup fails
    pub fn unreachable() -> Self {
        Self {
            fail_reference_data: true,
            ..Self::default()
        }
    }

    pub fn with_client(self, first_name: &str, last_name: &str, phone: &str) -> Self {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let input = ClientInput {
            client_type: Some(ClientType::Farmer),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            org_name: Some(format!("{} {}", first_name, last_name)),
            s_o: Some("Raju".to_string()),
            village: Some("Tenali".to_string()),
            mandal: Some("Tenali".to_string()),
            state: Some("Andhra Pradesh".to_string()),
            city: Some("Guntur".to_string()),
            phone: Some(phone.to_string()),
            ..ClientInput::default()
        };
        self.clients.borrow_mut().push(client_from(id, &input));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn reference<T>(&self, items: Vec<T>) -> ApiResult<Vec<T>> {
        if self.fail_reference_data {
            Err(rejected(502, "Upstream unavailable"))
        } else {
            Ok(items)
        }
    }

    fn catalog() -> (Vec<Commodity>, Vec<Variety>) {
        let commodity = |id, name: &str, hsn: &str| Commodity {
            id,
            name: name.to_string(),
            hsn_code: Some(hsn.to_string()),
        };
        let variety = |id, commodity_id, name: &str| Variety {
            id,
            commodity_id,
            name: name.to_string(),
        };
        (
            vec![commodity(1, "Chilli", "0904"), commodity(2, "Turmeric", "0910")],
            vec![
                variety(10, 1, "Teja"),
                variety(11, 1, "Byadgi"),
                variety(20, 2, "Salem"),
            ],
        )
    }
}

impl WarehouseApi for FakeApi {
    async fn login(&self, input: &LoginInput) -> ApiResult<LoginResponse> {
        self.record("login");
        if input.password != "secret123" {
            return Err(rejected(401, "Invalid credentials"));
        }
        Ok(LoginResponse {
            message: "Login successful".to_string(),
            username: input.username.clone(),
            role: Role::Admin,
        })
    }

    async fn list_clients(&self) -> ApiResult<Vec<Client>> {
        self.record("list_clients");
        Ok(self.clients.borrow().clone())
    }

    async fn search_clients(&self, query: &str) -> ApiResult<Vec<Client>> {
        self.record(format!("search_clients:{}", query));
        let needle = query.to_lowercase();
        Ok(self
            .clients
            .borrow()
            .iter()
            .filter(|c| {
                c.first_name.to_lowercase().contains(&needle)
                    || c.last_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn create_client(&self, input: &ClientInput) -> ApiResult<Client> {
        self.record("create_client");
        if self
            .clients
            .borrow()
            .iter()
            .any(|c| Some(&c.phone) == input.phone.as_ref())
        {
            return Err(rejected(409, "Phone number already exists."));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let client = client_from(id, input);
        self.clients.borrow_mut().push(client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: i64, input: &ClientInput) -> ApiResult<Client> {
        self.record(format!("update_client:{}", id));
        let mut clients = self.clients.borrow_mut();
        let slot = clients
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| rejected(404, "Client not found"))?;
        let merged = input.clone().overlaid_on(slot.clone()).normalized();
        *slot = client_from(id, &merged);
        Ok(slot.clone())
    }

    async fn delete_client(&self, id: i64) -> ApiResult<()> {
        self.record(format!("delete_client:{}", id));
        self.clients.borrow_mut().retain(|c| c.id != id);
        Ok(())
    }

    async fn states(&self) -> ApiResult<Vec<String>> {
        self.reference(vec!["Andhra Pradesh".to_string(), "Telangana".to_string()])
    }

    async fn cities(&self, state: &str) -> ApiResult<Vec<String>> {
        let cities: &[&str] = match state {
            "Andhra Pradesh" => &["Guntur", "Kurnool"],
            "Telangana" => &["Hyderabad", "Warangal"],
            _ => &[],
        };
        self.reference(cities.iter().map(|c| c.to_string()).collect())
    }

    async fn catalog_entries(&self) -> ApiResult<Vec<CatalogEntry>> {
        self.record("catalog_entries");
        let (commodities, varieties) = Self::catalog();
        let entries = varieties
            .iter()
            .filter_map(|v| {
                let c = commodities.iter().find(|c| c.id == v.commodity_id)?;
                Some(CatalogEntry {
                    commodity_id: c.id,
                    variety_id: v.id,
                    name: c.name.clone(),
                    variety: v.name.clone(),
                    hsn_code: c.hsn_code.clone(),
                    commodity_code: derive_commodity_code(&c.name, &v.name),
                })
            })
            .collect();
        self.reference(entries)
    }

    async fn commodities(&self) -> ApiResult<Vec<Commodity>> {
        self.record("commodities");
        self.reference(Self::catalog().0)
    }

    async fn varieties(&self, commodity_id: i64) -> ApiResult<Vec<Variety>> {
        let varieties = Self::catalog()
            .1
            .into_iter()
            .filter(|v| v.commodity_id == commodity_id)
            .collect();
        self.reference(varieties)
    }

    async fn grades(&self, variety_id: i64) -> ApiResult<Vec<Grade>> {
        let grades = match variety_id {
            10 => vec![
                Grade {
                    id: 100,
                    variety_id: 10,
                    name: "A".to_string(),
                },
                Grade {
                    id: 101,
                    variety_id: 10,
                    name: "B".to_string(),
                },
            ],
            _ => Vec::new(),
        };
        self.reference(grades)
    }

    async fn create_commodity(
        &self,
        input: &CreateCommodityInput,
    ) -> ApiResult<CatalogWriteResponse> {
        self.record("create_commodity");
        self.created_commodities.borrow_mut().push(input.clone());
        Ok(CatalogWriteResponse {
            message: "Commodity entry created successfully".to_string(),
            summary: CatalogImportSummary::default(),
        })
    }

    async fn accept_stock(&self, input: &AcceptStockInput) -> ApiResult<AcceptStockResponse> {
        self.record("accept_stock");
        self.accepted.borrow_mut().push(input.clone());
        Ok(AcceptStockResponse {
            message: "Stock accepted".to_string(),
            acceptance: StockAcceptance {
                id: 1,
                reference: Uuid::nil(),
                client_id: input.client_id,
                commodity_code: input.commodity_code.clone(),
                variety: input.variety.clone(),
                grade: input.grade.clone(),
                quantity: input.quantity,
                accepted_by: "admin".to_string(),
                created_at: Utc::now(),
            },
        })
    }

    async fn deliver_stock(&self, input: &DeliverStockInput) -> ApiResult<DeliverStockResponse> {
        self.record("deliver_stock");
        if input.quantity > self.stock_on_hand {
            return Err(rejected(
                422,
                &format!(
                    "Requested {} but only {} of {} {} is in stock",
                    input.quantity, self.stock_on_hand, input.commodity_code, input.variety
                ),
            ));
        }
        self.delivered.borrow_mut().push(input.clone());
        Ok(DeliverStockResponse {
            message: "Stock delivered".to_string(),
            delivery: StockDelivery {
                id: 1,
                reference: Uuid::nil(),
                client_id: input.client_id,
                commodity_code: input.commodity_code.clone(),
                variety: input.variety.clone(),
                quantity: input.quantity,
                delivered_by: "admin".to_string(),
                created_at: Utc::now(),
            },
        })
    }
}
