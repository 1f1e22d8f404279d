//! Dependent drop-down state: commodity → variety → grade, state → city
//!
//! Changing a parent clears every dependent selection and option list before
//! the new options are fetched. Option lists arrive tagged with the parent
//! they were fetched for and are dropped if that parent is no longer current.

use crate::api::WarehouseApi;
use crate::error::ApiResult;
use shared::{Commodity, Grade, Variety};

/// Reference data failures degrade to an empty list
fn or_empty<T>(result: ApiResult<Vec<T>>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch {}: {}", what, e);
        Vec::new()
    })
}

/// What the catalog selector resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub commodity: Commodity,
    pub variety: Variety,
    /// `None` means "no grade"
    pub grade: Option<Grade>,
}

#[derive(Debug, Clone, Default)]
pub struct CascadingSelector {
    commodities: Vec<Commodity>,
    varieties: Vec<Variety>,
    grades: Vec<Grade>,
    commodity_id: Option<i64>,
    variety_id: Option<i64>,
    grade_id: Option<i64>,
}

impl CascadingSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commodities(&self) -> &[Commodity] {
        &self.commodities
    }

    pub fn varieties(&self) -> &[Variety] {
        &self.varieties
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub async fn load_commodities<A: WarehouseApi>(&mut self, api: &A) {
        self.commodities = or_empty(api.commodities().await, "commodities");
    }

    /// Change the commodity. Returns the id whose varieties should be fetched.
    pub fn select_commodity(&mut self, commodity_id: Option<i64>) -> Option<i64> {
        self.commodity_id = commodity_id;
        self.variety_id = None;
        self.grade_id = None;
        self.varieties.clear();
        self.grades.clear();
        commodity_id
    }

    /// Install varieties fetched for `commodity_id`; `false` if stale
    pub fn apply_varieties(&mut self, commodity_id: i64, varieties: Vec<Variety>) -> bool {
        if self.commodity_id != Some(commodity_id) {
            tracing::debug!(commodity_id, "Dropping stale variety list");
            return false;
        }
        self.varieties = varieties
            .into_iter()
            .filter(|v| v.commodity_id == commodity_id)
            .collect();
        true
    }

    /// Change the variety. Returns the id whose grades should be fetched.
    pub fn select_variety(&mut self, variety_id: Option<i64>) -> Option<i64> {
        self.variety_id = variety_id;
        self.grade_id = None;
        self.grades.clear();
        variety_id
    }

    /// Install grades fetched for `variety_id`; `false` if stale
    pub fn apply_grades(&mut self, variety_id: i64, grades: Vec<Grade>) -> bool {
        if self.variety_id != Some(variety_id) {
            tracing::debug!(variety_id, "Dropping stale grade list");
            return false;
        }
        self.grades = grades
            .into_iter()
            .filter(|g| g.variety_id == variety_id)
            .collect();
        true
    }

    pub fn select_grade(&mut self, grade_id: Option<i64>) {
        self.grade_id = grade_id;
    }

    pub async fn choose_commodity<A: WarehouseApi>(&mut self, api: &A, commodity_id: Option<i64>) {
        if let Some(id) = self.select_commodity(commodity_id) {
            let varieties = or_empty(api.varieties(id).await, "varieties");
            self.apply_varieties(id, varieties);
        }
    }

    pub async fn choose_variety<A: WarehouseApi>(&mut self, api: &A, variety_id: Option<i64>) {
        if let Some(id) = self.select_variety(variety_id) {
            let grades = or_empty(api.grades(id).await, "grades");
            self.apply_grades(id, grades);
        }
    }

    /// Current choice, once both commodity and variety are set
    pub fn resolution(&self) -> Option<Resolution> {
        let commodity = self
            .commodities
            .iter()
            .find(|c| Some(c.id) == self.commodity_id)?;
        let variety = self
            .varieties
            .iter()
            .find(|v| Some(v.id) == self.variety_id)?;
        let grade = self
            .grades
            .iter()
            .find(|g| Some(g.id) == self.grade_id)
            .cloned();

        Some(Resolution {
            commodity: commodity.clone(),
            variety: variety.clone(),
            grade,
        })
    }

    /// Clear every selection and dependent list; the commodity list stays
    pub fn reset(&mut self) {
        self.select_commodity(None);
    }
}

/// State → city cascade for client addresses
#[derive(Debug, Clone, Default)]
pub struct GeoSelector {
    states: Vec<String>,
    cities: Vec<String>,
    state: Option<String>,
    city: Option<String>,
}

impl GeoSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> &[String] {
        &self.states
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub async fn load_states<A: WarehouseApi>(&mut self, api: &A) {
        self.states = or_empty(api.states().await, "states");
    }

    /// Change the state. Returns the state whose cities should be fetched.
    pub fn select_state(&mut self, state: Option<String>) -> Option<String> {
        self.state = state.filter(|s| !s.trim().is_empty());
        self.city = None;
        self.cities.clear();
        self.state.clone()
    }

    /// Install cities fetched for `state`; `false` if stale
    pub fn apply_cities(&mut self, state: &str, cities: Vec<String>) -> bool {
        if self.state.as_deref() != Some(state) {
            tracing::debug!(state, "Dropping stale city list");
            return false;
        }
        self.cities = cities;
        true
    }

    pub fn select_city(&mut self, city: Option<String>) {
        self.city = city.filter(|c| !c.trim().is_empty());
    }

    pub async fn choose_state<A: WarehouseApi>(&mut self, api: &A, state: Option<String>) {
        if let Some(state) = self.select_state(state) {
            let cities = or_empty(api.cities(&state).await, "cities");
            self.apply_cities(&state, cities);
        }
    }

    pub fn reset(&mut self) {
        self.select_state(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use tokio_test::block_on;

    fn variety(id: i64, commodity_id: i64, name: &str) -> Variety {
        Variety {
            id,
            commodity_id,
            name: name.to_string(),
        }
    }

    fn loaded(api: &FakeApi) -> CascadingSelector {
        let mut selector = CascadingSelector::new();
        block_on(selector.load_commodities(api));
        selector
    }

    #[test]
    fn test_commodity_change_clears_dependents() {
        let api = FakeApi::default();
        let mut selector = loaded(&api);

        block_on(selector.choose_commodity(&api, Some(1)));
        block_on(selector.choose_variety(&api, Some(10)));
        selector.select_grade(Some(100));
        assert!(selector.resolution().unwrap().grade.is_some());

        block_on(selector.choose_commodity(&api, Some(2)));
        assert!(selector.grades().is_empty());
        assert!(selector.varieties().iter().all(|v| v.commodity_id == 2));
        assert!(selector.resolution().is_none());
    }

    #[test]
    fn test_stale_variety_list_is_dropped() {
        let mut selector = CascadingSelector::new();
        selector.select_commodity(Some(1));
        selector.select_commodity(Some(2));

        assert!(!selector.apply_varieties(1, vec![variety(10, 1, "Teja")]));
        assert!(selector.varieties().is_empty());

        assert!(selector.apply_varieties(2, vec![variety(20, 2, "Salem"), variety(10, 1, "Teja")]));
        assert_eq!(selector.varieties(), &[variety(20, 2, "Salem")]);
    }

    #[test]
    fn test_resolution_requires_commodity_and_variety() {
        let api = FakeApi::default();
        let mut selector = loaded(&api);
        assert!(selector.resolution().is_none());

        block_on(selector.choose_commodity(&api, Some(1)));
        assert!(selector.resolution().is_none());

        block_on(selector.choose_variety(&api, Some(10)));
        let resolution = selector.resolution().unwrap();
        assert_eq!(resolution.commodity.name, "Chilli");
        assert_eq!(resolution.variety.name, "Teja");
        assert_eq!(resolution.grade, None);
    }

    #[test]
    fn test_failed_fetch_yields_empty_options() {
        let api = FakeApi::unreachable();
        let mut selector = loaded(&api);
        assert!(selector.commodities().is_empty());

        block_on(selector.choose_commodity(&api, Some(1)));
        assert!(selector.varieties().is_empty());
    }

    #[test]
    fn test_reset_keeps_commodity_list() {
        let api = FakeApi::default();
        let mut selector = loaded(&api);
        block_on(selector.choose_commodity(&api, Some(1)));
        block_on(selector.choose_variety(&api, Some(10)));

        selector.reset();
        assert!(selector.resolution().is_none());
        assert!(selector.varieties().is_empty());
        assert!(!selector.commodities().is_empty());
    }

    #[test]
    fn test_state_change_clears_city() {
        let api = FakeApi::default();
        let mut geo = GeoSelector::new();
        block_on(geo.load_states(&api));
        block_on(geo.choose_state(&api, Some("Telangana".to_string())));
        geo.select_city(Some("Warangal".to_string()));
        assert_eq!(geo.city(), Some("Warangal"));

        block_on(geo.choose_state(&api, Some("Andhra Pradesh".to_string())));
        assert_eq!(geo.city(), None);
        assert_eq!(geo.cities(), &["Guntur".to_string(), "Kurnool".to_string()]);

        assert!(!geo.apply_cities("Telangana", vec!["Warangal".to_string()]));
    }
}
