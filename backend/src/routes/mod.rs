//! Route definitions for the Cold Storage Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::identity_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state))
}

/// Routes that need no identity
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/login", post(handlers::login))
        // Geography lookups
        .route("/api/states", get(handlers::list_states))
        .route("/api/cities", get(handlers::list_cities))
        // Catalog lookups
        .route("/commodities", get(handlers::list_entries))
        .route("/commodities/fields", get(handlers::list_commodities))
        .route("/commodities/:commodity_id/varieties", get(handlers::list_varieties))
        .route("/varieties/:variety_id/grades", get(handlers::list_grades))
}

/// Routes that require an `X-Username` naming a stored user
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::create_user))
        .nest("/clients", client_routes())
        .route("/commodities", post(handlers::create_entry))
        .route("/bulk_upload_commodities", post(handlers::bulk_upload))
        .route("/bulk_upload_commodities/csv", post(handlers::bulk_upload_csv))
        .nest("/stocks", stock_routes())
        .route_layer(middleware::from_fn_with_state(state, identity_middleware))
}

/// Client registry routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_clients).post(handlers::create_client))
        .route("/search", get(handlers::search_clients))
        .route(
            "/:client_id",
            put(handlers::update_client).delete(handlers::delete_client),
        )
}

/// Stock movement routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/accept", post(handlers::accept_stock))
        .route("/deliver", post(handlers::deliver_stock))
        .route("/acceptances", get(handlers::list_acceptances))
        .route("/deliveries", get(handlers::list_deliveries))
        .route("/balance", get(handlers::get_balances))
}
