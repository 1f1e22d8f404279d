//! HTTP handlers for the client registry

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Capability, ClientInput, ClientResponse, ClientsResponse};
use crate::services::ClientService;
use crate::AppState;
use shared::types::{MessageResponse, SearchQuery};

/// List all clients
pub async fn list_clients(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<ClientsResponse>> {
    current_user.0.require(Capability::ManageClients)?;

    let service = ClientService::new(state.db);
    let clients = service.list_clients().await?;
    Ok(Json(ClientsResponse { clients }))
}

/// Search clients by `?q=`
pub async fn search_clients(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ClientsResponse>> {
    current_user.0.require(Capability::ManageClients)?;

    let service = ClientService::new(state.db);
    let clients = service.search_clients(&query.q).await?;
    Ok(Json(ClientsResponse { clients }))
}

/// Register a client
pub async fn create_client(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ClientInput>,
) -> AppResult<(StatusCode, Json<ClientResponse>)> {
    current_user.0.require(Capability::ManageClients)?;

    let service = ClientService::new(state.db);
    let client = service.create_client(input).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse { client })))
}

/// Update the supplied fields of a client
pub async fn update_client(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(client_id): Path<i64>,
    Json(input): Json<ClientInput>,
) -> AppResult<Json<ClientResponse>> {
    current_user.0.require(Capability::ManageClients)?;

    let service = ClientService::new(state.db);
    let client = service.update_client(client_id, input).await?;
    Ok(Json(ClientResponse { client }))
}

/// Delete a client
pub async fn delete_client(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(client_id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    current_user.0.require(Capability::ManageClients)?;

    let service = ClientService::new(state.db);
    service.delete_client(client_id).await?;
    Ok(Json(MessageResponse::new("Client deleted")))
}
