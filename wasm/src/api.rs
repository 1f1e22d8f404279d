//! Typed HTTP client for the warehouse REST API

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{ApiResult, ClientError};
use shared::{
    AcceptStockInput, AcceptStockResponse, CatalogEntry, CatalogWriteResponse, CitiesResponse,
    Client, ClientInput, ClientResponse, ClientsResponse, Commodity, CreateCommodityInput,
    DeliverStockInput, DeliverStockResponse, Grade, LoginInput, LoginResponse, MessageResponse,
    Session, StatesResponse, Variety,
};

/// Header naming the acting user on every request
pub const USERNAME_HEADER: &str = "X-Username";

/// Operations the forms need from the backend
#[allow(async_fn_in_trait)]
pub trait WarehouseApi {
    async fn login(&self, input: &LoginInput) -> ApiResult<LoginResponse>;

    async fn list_clients(&self) -> ApiResult<Vec<Client>>;
    async fn search_clients(&self, query: &str) -> ApiResult<Vec<Client>>;
    async fn create_client(&self, input: &ClientInput) -> ApiResult<Client>;
    async fn update_client(&self, id: i64, input: &ClientInput) -> ApiResult<Client>;
    async fn delete_client(&self, id: i64) -> ApiResult<()>;

    async fn states(&self) -> ApiResult<Vec<String>>;
    async fn cities(&self, state: &str) -> ApiResult<Vec<String>>;

    /// Flat commodity/variety list with derived codes
    async fn catalog_entries(&self) -> ApiResult<Vec<CatalogEntry>>;
    async fn commodities(&self) -> ApiResult<Vec<Commodity>>;
    async fn varieties(&self, commodity_id: i64) -> ApiResult<Vec<Variety>>;
    async fn grades(&self, variety_id: i64) -> ApiResult<Vec<Grade>>;
    async fn create_commodity(&self, input: &CreateCommodityInput)
        -> ApiResult<CatalogWriteResponse>;

    async fn accept_stock(&self, input: &AcceptStockInput) -> ApiResult<AcceptStockResponse>;
    async fn deliver_stock(&self, input: &DeliverStockInput) -> ApiResult<DeliverStockResponse>;
}

/// `WarehouseApi` over HTTP
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    username: Option<String>,
}

impl ApiClient {
    /// Anonymous client; only public endpoints will succeed
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: None,
        }
    }

    /// Identify every request as `session`'s user
    pub fn with_session(mut self, session: &Session) -> Self {
        self.username = Some(session.username.clone());
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.username {
            Some(username) => builder.header(USERNAME_HEADER, username),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "API request rejected");
            return Err(ClientError::from_error_body(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

impl WarehouseApi for ApiClient {
    async fn login(&self, input: &LoginInput) -> ApiResult<LoginResponse> {
        Self::send(self.request(Method::POST, "/login").json(input)).await
    }

    async fn list_clients(&self) -> ApiResult<Vec<Client>> {
        let response: ClientsResponse = Self::send(self.request(Method::GET, "/clients")).await?;
        Ok(response.clients)
    }

    async fn search_clients(&self, query: &str) -> ApiResult<Vec<Client>> {
        let response: ClientsResponse = Self::send(
            self.request(Method::GET, "/clients/search")
                .query(&[("q", query)]),
        )
        .await?;
        Ok(response.clients)
    }

    async fn create_client(&self, input: &ClientInput) -> ApiResult<Client> {
        let response: ClientResponse =
            Self::send(self.request(Method::POST, "/clients").json(input)).await?;
        Ok(response.client)
    }

    async fn update_client(&self, id: i64, input: &ClientInput) -> ApiResult<Client> {
        let response: ClientResponse = Self::send(
            self.request(Method::PUT, &format!("/clients/{}", id))
                .json(input),
        )
        .await?;
        Ok(response.client)
    }

    async fn delete_client(&self, id: i64) -> ApiResult<()> {
        let _: MessageResponse =
            Self::send(self.request(Method::DELETE, &format!("/clients/{}", id))).await?;
        Ok(())
    }

    async fn states(&self) -> ApiResult<Vec<String>> {
        let response: StatesResponse = Self::send(self.request(Method::GET, "/api/states")).await?;
        Ok(response.states)
    }

    async fn cities(&self, state: &str) -> ApiResult<Vec<String>> {
        let response: CitiesResponse = Self::send(
            self.request(Method::GET, "/api/cities")
                .query(&[("state_code", state)]),
        )
        .await?;
        Ok(response.cities)
    }

    async fn catalog_entries(&self) -> ApiResult<Vec<CatalogEntry>> {
        Self::send(self.request(Method::GET, "/commodities")).await
    }

    async fn commodities(&self) -> ApiResult<Vec<Commodity>> {
        Self::send(self.request(Method::GET, "/commodities/fields")).await
    }

    async fn varieties(&self, commodity_id: i64) -> ApiResult<Vec<Variety>> {
        Self::send(self.request(
            Method::GET,
            &format!("/commodities/{}/varieties", commodity_id),
        ))
        .await
    }

    async fn grades(&self, variety_id: i64) -> ApiResult<Vec<Grade>> {
        Self::send(self.request(Method::GET, &format!("/varieties/{}/grades", variety_id))).await
    }

    async fn create_commodity(
        &self,
        input: &CreateCommodityInput,
    ) -> ApiResult<CatalogWriteResponse> {
        Self::send(self.request(Method::POST, "/commodities").json(input)).await
    }

    async fn accept_stock(&self, input: &AcceptStockInput) -> ApiResult<AcceptStockResponse> {
        Self::send(self.request(Method::POST, "/stocks/accept").json(input)).await
    }

    async fn deliver_stock(&self, input: &DeliverStockInput) -> ApiResult<DeliverStockResponse> {
        Self::send(self.request(Method::POST, "/stocks/deliver").json(input)).await
    }
}
