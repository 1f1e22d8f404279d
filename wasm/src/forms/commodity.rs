//! Commodity catalog form

use crate::api::WarehouseApi;
use crate::error::FormError;
use crate::selector::{CascadingSelector, Resolution};
use shared::{CatalogEntry, CreateCommodityInput};

#[derive(Debug, Default)]
pub struct CommodityForm {
    selector: CascadingSelector,
    commodity_name: String,
    variety_name: String,
    grade_name: String,
    hsn_code: String,
    entries: Vec<CatalogEntry>,
}

impl CommodityForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<A: WarehouseApi>(&mut self, api: &A) {
        self.selector.load_commodities(api).await;
        self.load_entries(api).await;
    }

    async fn load_entries<A: WarehouseApi>(&mut self, api: &A) {
        self.entries = api.catalog_entries().await.unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch catalog entries: {}", e);
            Vec::new()
        });
    }

    pub fn selector(&self) -> &CascadingSelector {
        &self.selector
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn input(&self) -> CreateCommodityInput {
        let optional = |v: &str| Some(v.trim().to_string()).filter(|v| !v.is_empty());
        CreateCommodityInput {
            name: self.commodity_name.trim().to_string(),
            variety: self.variety_name.trim().to_string(),
            grade: optional(&self.grade_name),
            hsn_code: optional(&self.hsn_code),
        }
    }

    pub async fn choose_commodity<A: WarehouseApi>(&mut self, api: &A, id: Option<i64>) {
        self.selector.choose_commodity(api, id).await;
        self.sync_from_selector();
    }

    pub async fn choose_variety<A: WarehouseApi>(&mut self, api: &A, id: Option<i64>) {
        self.selector.choose_variety(api, id).await;
        self.sync_from_selector();
    }

    pub fn choose_grade(&mut self, id: Option<i64>) {
        self.selector.select_grade(id);
        self.sync_from_selector();
    }

    /// Copy the selector's resolution into the name fields
    fn sync_from_selector(&mut self) {
        match self.selector.resolution() {
            Some(Resolution {
                commodity,
                variety,
                grade,
            }) => {
                self.commodity_name = commodity.name;
                self.hsn_code = commodity.hsn_code.unwrap_or_default();
                self.variety_name = variety.name;
                self.grade_name = grade.map(|g| g.name).unwrap_or_default();
            }
            None => self.clear_fields(),
        }
    }

    // Typed names for catalog levels that do not exist yet

    pub fn set_commodity_name(&mut self, name: impl Into<String>) {
        self.commodity_name = name.into();
    }

    pub fn set_variety_name(&mut self, name: impl Into<String>) {
        self.variety_name = name.into();
    }

    pub fn set_grade_name(&mut self, name: impl Into<String>) {
        self.grade_name = name.into();
    }

    pub fn set_hsn_code(&mut self, code: impl Into<String>) {
        self.hsn_code = code.into();
    }

    pub async fn submit<A: WarehouseApi>(&mut self, api: &A) -> Result<String, FormError> {
        let input = self.input();
        if input.name.is_empty() || input.variety.is_empty() {
            return Err(FormError::Invalid(
                "Commodity and Variety are required".to_string(),
            ));
        }

        let response = api
            .create_commodity(&input)
            .await
            .map_err(|e| FormError::Rejected(e.user_message("Failed to create commodity")))?;

        self.clear_fields();
        self.selector.reset();
        self.selector.load_commodities(api).await;
        self.load_entries(api).await;
        Ok(response.message)
    }

    fn clear_fields(&mut self) {
        self.commodity_name.clear();
        self.variety_name.clear();
        self.grade_name.clear();
        self.hsn_code.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use tokio_test::block_on;

    #[test]
    fn test_selector_fills_names() {
        let api = FakeApi::default();
        let mut form = CommodityForm::new();
        block_on(form.load(&api));

        block_on(form.choose_commodity(&api, Some(1)));
        assert_eq!(form.input().name, "");

        block_on(form.choose_variety(&api, Some(10)));
        form.choose_grade(Some(101));
        let input = form.input();
        assert_eq!(input.name, "Chilli");
        assert_eq!(input.variety, "Teja");
        assert_eq!(input.grade.as_deref(), Some("B"));
        assert_eq!(input.hsn_code.as_deref(), Some("0904"));
    }

    #[test]
    fn test_requires_commodity_and_variety() {
        let api = FakeApi::default();
        let mut form = CommodityForm::new();
        form.set_commodity_name("Chilli");

        let err = block_on(form.submit(&api)).unwrap_err();
        assert_eq!(err.message(), "Commodity and Variety are required");
        assert!(api.created_commodities.borrow().is_empty());
    }

    #[test]
    fn test_success_clears_and_refetches() {
        let api = FakeApi::default();
        let mut form = CommodityForm::new();
        form.set_commodity_name(" Wheat ");
        form.set_variety_name("Sharbati");

        let message = block_on(form.submit(&api)).unwrap();
        assert_eq!(message, "Commodity entry created successfully");

        let sent = &api.created_commodities.borrow()[0];
        assert_eq!(sent.name, "Wheat");
        assert_eq!(sent.grade, None);

        assert_eq!(form.input(), CreateCommodityInput::default());
        assert_eq!(
            api.calls(),
            vec!["create_commodity", "commodities", "catalog_entries"]
        );
        assert_eq!(form.entries().len(), 3);
    }
}
