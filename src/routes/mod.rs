mod health;
mod lottery;
mod page;
mod ws;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the `/api` sub-router with all API routes.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(lottery::router())
        .with_state(state)
}

/// The whole application: page, form, API and event stream.
pub fn app_router(state: Arc<AppState>) -> Router {
    let api = api_router(state.clone());

    let app = Router::new()
        .nest("/api", api)
        .merge(page::router().with_state(state.clone()))
        .merge(ws::router().with_state(state));

    // CORS for local development
    app.layer(CorsLayer::very_permissive())
}
