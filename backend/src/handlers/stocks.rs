//! HTTP handlers for stock acceptance and delivery

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{
    AcceptStockInput, AcceptStockResponse, Capability, DeliverStockInput, DeliverStockResponse,
    StockAcceptance, StockBalance, StockDelivery, StockQuery,
};
use crate::services::StockService;
use crate::AppState;

/// Record incoming stock
pub async fn accept_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AcceptStockInput>,
) -> AppResult<(StatusCode, Json<AcceptStockResponse>)> {
    current_user.0.require(Capability::AcceptStock)?;

    let service = StockService::new(state.db);
    let acceptance = service.accept(&current_user.0, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(AcceptStockResponse {
            message: "Stock accepted".to_string(),
            acceptance,
        }),
    ))
}

/// Record outgoing stock
pub async fn deliver_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<DeliverStockInput>,
) -> AppResult<(StatusCode, Json<DeliverStockResponse>)> {
    current_user.0.require(Capability::DeliverStock)?;

    let service = StockService::new(state.db);
    let delivery = service.deliver(&current_user.0, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(DeliverStockResponse {
            message: "Stock delivered".to_string(),
            delivery,
        }),
    ))
}

pub async fn list_acceptances(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<Vec<StockAcceptance>>> {
    current_user.0.require(Capability::ViewStockLedger)?;

    let service = StockService::new(state.db);
    let acceptances = service.list_acceptances(query.client_id).await?;
    Ok(Json(acceptances))
}

pub async fn list_deliveries(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<Vec<StockDelivery>>> {
    current_user.0.require(Capability::ViewStockLedger)?;

    let service = StockService::new(state.db);
    let deliveries = service.list_deliveries(query.client_id).await?;
    Ok(Json(deliveries))
}

/// Current balances, optionally for one client
pub async fn get_balances(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<Vec<StockBalance>>> {
    current_user.0.require(Capability::DeliverStock)?;

    let service = StockService::new(state.db);
    let balances = service.balances(query.client_id).await?;
    Ok(Json(balances))
}
