//! HTTP handlers for the commodity catalog

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{
    BulkCommodityRow, Capability, CatalogEntry, CatalogWriteResponse, Commodity,
    CreateCommodityInput, Grade, Variety,
};
use crate::services::catalog::parse_catalog_csv;
use crate::services::CatalogService;
use crate::AppState;

/// Commodity/variety pairs with their commodity codes
pub async fn list_entries(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogEntry>>> {
    let service = CatalogService::new(state.db);
    let entries = service.list_entries().await?;
    Ok(Json(entries))
}

/// Commodities only, for the first level of the selector
pub async fn list_commodities(State(state): State<AppState>) -> AppResult<Json<Vec<Commodity>>> {
    let service = CatalogService::new(state.db);
    let commodities = service.list_commodities().await?;
    Ok(Json(commodities))
}

pub async fn list_varieties(
    State(state): State<AppState>,
    Path(commodity_id): Path<i64>,
) -> AppResult<Json<Vec<Variety>>> {
    let service = CatalogService::new(state.db);
    let varieties = service.list_varieties(commodity_id).await?;
    Ok(Json(varieties))
}

pub async fn list_grades(
    State(state): State<AppState>,
    Path(variety_id): Path<i64>,
) -> AppResult<Json<Vec<Grade>>> {
    let service = CatalogService::new(state.db);
    let grades = service.list_grades(variety_id).await?;
    Ok(Json(grades))
}

/// Add a commodity/variety (and optional grade) to the catalog
pub async fn create_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCommodityInput>,
) -> AppResult<(StatusCode, Json<CatalogWriteResponse>)> {
    current_user.0.require(Capability::ManageCatalog)?;

    let service = CatalogService::new(state.db);
    let summary = service.create_entry(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CatalogWriteResponse {
            message: "Commodity entry created successfully".to_string(),
            summary,
        }),
    ))
}

/// Bulk import from a JSON array of rows
pub async fn bulk_upload(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<CatalogWriteResponse>> {
    current_user.0.require(Capability::ManageCatalog)?;

    let rows: Vec<BulkCommodityRow> = serde_json::from_value(body)
        .map_err(|_| AppError::ValidationError("Expected a list of commodities".to_string()))?;

    let service = CatalogService::new(state.db);
    let summary = service.import_rows(&rows).await?;

    Ok(Json(CatalogWriteResponse {
        message: "Bulk upload successful".to_string(),
        summary,
    }))
}

/// Bulk import from a CSV sheet
pub async fn bulk_upload_csv(
    State(state): State<AppState>,
    current_user: CurrentUser,
    body: String,
) -> AppResult<Json<CatalogWriteResponse>> {
    current_user.0.require(Capability::ManageCatalog)?;

    let rows = parse_catalog_csv(&body)?;

    let service = CatalogService::new(state.db);
    let summary = service.import_rows(&rows).await?;

    Ok(Json(CatalogWriteResponse {
        message: "Bulk upload successful".to_string(),
        summary,
    }))
}
