//! Geography API client for state and city lookups
//!
//! Integrates with the CountryStateCity API (`X-CSCAPI-KEY` header)

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};

use crate::config::GeoConfig;
use crate::error::{AppError, AppResult};

/// CountryStateCity API client
#[derive(Clone)]
pub struct GeoClient {
    client: Client,
    api_key: String,
    base_url: String,
    country_code: String,
}

/// State as returned by `/countries/{iso2}/states`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GeoState {
    pub name: String,
    pub iso2: String,
}

#[derive(Debug, Deserialize)]
struct GeoCity {
    name: String,
}

impl GeoClient {
    /// Create a new GeoClient
    pub fn new(config: &GeoConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
            country_code: config.country_code.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("X-CSCAPI-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Geo API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Geo API error: {} - {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse geo response: {}", e)))
    }

    /// All states of the configured country, sorted by name
    pub async fn states(&self) -> AppResult<Vec<GeoState>> {
        let mut states: Vec<GeoState> = self
            .get(&format!("/countries/{}/states", self.country_code))
            .await?;
        states.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(states)
    }

    /// City names of one state, identified by its ISO2 code
    pub async fn cities(&self, state_iso2: &str) -> AppResult<Vec<String>> {
        let cities: Vec<GeoCity> = self
            .get(&format!(
                "/countries/{}/states/{}/cities",
                self.country_code, state_iso2
            ))
            .await?;

        let mut names: Vec<String> = cities.into_iter().map(|c| c.name).collect();
        names.sort();
        Ok(names)
    }
}
