//! Stock delivery form

use super::{parse_client_id, parse_quantity};
use crate::api::WarehouseApi;
use crate::error::FormError;
use shared::{CatalogEntry, DeliverStockInput, StockDelivery};

/// One option of the commodity drop-down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOption {
    pub variety_id: i64,
    pub label: String,
    pub commodity_code: String,
}

#[derive(Debug, Default)]
pub struct DeliveryForm {
    entries: Vec<CatalogEntry>,
    client_id: String,
    commodity_code: String,
    variety: String,
    quantity: String,
}

impl DeliveryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<A: WarehouseApi>(&mut self, api: &A) {
        self.entries = api.catalog_entries().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch catalog entries: {}", e);
            Vec::new()
        });
    }

    /// Drop-down options labelled "name - variety"
    pub fn entry_options(&self) -> Vec<EntryOption> {
        self.entries
            .iter()
            .map(|e| EntryOption {
                variety_id: e.variety_id,
                label: format!("{} - {}", e.name, e.variety),
                commodity_code: e.commodity_code.clone(),
            })
            .collect()
    }

    /// Pick a catalog entry; its variety pre-fills the editable variety field
    pub fn select_entry(&mut self, variety_id: Option<i64>) {
        match variety_id.and_then(|id| self.entries.iter().find(|e| e.variety_id == id)) {
            Some(entry) => {
                self.commodity_code = entry.commodity_code.clone();
                self.variety = entry.variety.clone();
            }
            None => {
                self.commodity_code.clear();
                self.variety.clear();
            }
        }
    }

    pub fn commodity_code(&self) -> &str {
        &self.commodity_code
    }

    pub fn variety(&self) -> &str {
        &self.variety
    }

    pub fn set_variety(&mut self, value: impl Into<String>) {
        self.variety = value.into();
    }

    pub fn set_client_id(&mut self, value: impl Into<String>) {
        self.client_id = value.into();
    }

    pub fn set_quantity(&mut self, value: impl Into<String>) {
        self.quantity = value.into();
    }

    pub fn input(&self) -> Result<DeliverStockInput, FormError> {
        let fields = [&self.client_id, &self.commodity_code, &self.variety, &self.quantity];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(FormError::Invalid("All fields are required".to_string()));
        }

        Ok(DeliverStockInput {
            client_id: parse_client_id(&self.client_id)?,
            commodity_code: self.commodity_code.clone(),
            variety: self.variety.trim().to_string(),
            quantity: parse_quantity(&self.quantity)?,
        })
    }

    pub async fn submit<A: WarehouseApi>(&mut self, api: &A) -> Result<StockDelivery, FormError> {
        let input = self.input()?;
        let response = api
            .deliver_stock(&input)
            .await
            .map_err(|e| FormError::Rejected(e.user_message("Error delivering stock")))?;

        tracing::info!(reference = %response.delivery.reference, "Stock delivered");
        self.client_id.clear();
        self.commodity_code.clear();
        self.variety.clear();
        self.quantity.clear();
        Ok(response.delivery)
    }
}
