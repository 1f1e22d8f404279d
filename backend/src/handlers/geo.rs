//! State and city lookup handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::GeoService;
use crate::AppState;
use shared::types::{CitiesResponse, StatesResponse};

#[derive(Debug, Deserialize)]
pub struct CitiesQuery {
    #[serde(default)]
    pub state_code: String,
}

/// List states
pub async fn list_states(State(state): State<AppState>) -> AppResult<Json<StatesResponse>> {
    let service = GeoService::new(state.geo);
    let states = service.list_states().await?;
    Ok(Json(StatesResponse { states }))
}

/// List cities of `?state_code=` (ISO2 code or state name)
pub async fn list_cities(
    State(state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> AppResult<Json<CitiesResponse>> {
    let service = GeoService::new(state.geo);
    let cities = service.list_cities(&query.state_code).await?;
    Ok(Json(CitiesResponse { cities }))
}
