//! Stock acceptance form

use super::{parse_client_id, parse_quantity};
use crate::api::WarehouseApi;
use crate::error::FormError;
use crate::selector::CascadingSelector;
use shared::{derive_commodity_code, AcceptStockInput, StockAcceptance};

#[derive(Debug, Default)]
pub struct AcceptanceForm {
    selector: CascadingSelector,
    client_id: String,
    quantity: String,
}

impl AcceptanceForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<A: WarehouseApi>(&mut self, api: &A) {
        self.selector.load_commodities(api).await;
    }

    pub fn selector(&self) -> &CascadingSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut CascadingSelector {
        &mut self.selector
    }

    pub fn set_client_id(&mut self, value: impl Into<String>) {
        self.client_id = value.into();
    }

    pub fn set_quantity(&mut self, value: impl Into<String>) {
        self.quantity = value.into();
    }

    /// Build the request; every field including the grade is required
    pub fn input(&self) -> Result<AcceptStockInput, FormError> {
        let all_required = || FormError::Invalid("All fields are required".to_string());

        if self.client_id.trim().is_empty() || self.quantity.trim().is_empty() {
            return Err(all_required());
        }
        let resolution = self.selector.resolution().ok_or_else(all_required)?;
        let grade = resolution.grade.ok_or_else(all_required)?;

        Ok(AcceptStockInput {
            client_id: parse_client_id(&self.client_id)?,
            commodity_code: derive_commodity_code(
                &resolution.commodity.name,
                &resolution.variety.name,
            ),
            variety: resolution.variety.name,
            grade: grade.name,
            quantity: parse_quantity(&self.quantity)?,
        })
    }

    pub async fn submit<A: WarehouseApi>(&mut self, api: &A) -> Result<StockAcceptance, FormError> {
        let input = self.input()?;
        let response = api
            .accept_stock(&input)
            .await
            .map_err(|e| FormError::Rejected(e.user_message("Error accepting stock")))?;

        tracing::info!(reference = %response.acceptance.reference, "Stock accepted");
        self.reset();
        Ok(response.acceptance)
    }

    pub fn reset(&mut self) {
        self.client_id.clear();
        self.quantity.clear();
        self.selector.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use rust_decimal::Decimal;
    use tokio_test::block_on;

    fn ready(api: &FakeApi) -> AcceptanceForm {
        let mut form = AcceptanceForm::new();
        block_on(form.load(api));
        block_on(form.selector_mut().choose_commodity(api, Some(1)));
        block_on(form.selector_mut().choose_variety(api, Some(10)));
        form.selector_mut().select_grade(Some(100));
        form.set_client_id("7");
        form.set_quantity("25.5");
        form
    }

    #[test]
    fn test_code_derived_from_selection() {
        let api = FakeApi::default();
        let input = ready(&api).input().unwrap();
        assert_eq!(input.commodity_code, "CHI-TEJ");
        assert_eq!(input.variety, "Teja");
        assert_eq!(input.grade, "A");
        assert_eq!(input.quantity, Decimal::new(255, 1));
    }

    #[test]
    fn test_grade_is_required() {
        let api = FakeApi::default();
        let mut form = ready(&api);
        form.selector_mut().select_grade(None);
        assert_eq!(
            form.input(),
            Err(FormError::Invalid("All fields are required".to_string()))
        );
    }

    #[test]
    fn test_success_resets_selection() {
        let api = FakeApi::default();
        let mut form = ready(&api);

        let acceptance = block_on(form.submit(&api)).unwrap();
        assert_eq!(acceptance.client_id, 7);
        assert_eq!(api.accepted.borrow().len(), 1);

        assert!(form.selector().resolution().is_none());
        assert!(form.selector().varieties().is_empty());
        assert!(form.selector().grades().is_empty());
        assert!(form.input().is_err());
    }
}
