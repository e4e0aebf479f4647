use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::{state::AppState, view::render_page};

/// `GET /` — load the contract state and render the page.
///
/// A failed load is logged and the last known state is rendered instead.
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    if let Err(e) = state.controller.initialize().await {
        tracing::warn!(error = %e, "failed to load lottery state");
    }

    let snapshot = state.controller.state().await;
    Html(render_page(&snapshot, state.theme))
}

#[derive(Debug, Deserialize)]
struct EntryForm {
    #[serde(rename = "entryValue", default)]
    entry_value: String,
}

/// `POST /enter` — start an entry and send the browser back to the page.
///
/// The entry runs in the background; its progress reaches the page over `/ws`.
async fn enter(State(state): State<Arc<AppState>>, Form(form): Form<EntryForm>) -> Redirect {
    state.controller.set_entry_value(form.entry_value.clone()).await;

    let controller = state.controller.clone();
    tokio::spawn(async move {
        if let Err(e) = controller.on_submit(&form.entry_value).await {
            tracing::error!(error = %e, "failed to read wallet accounts");
        }
    });

    Redirect::to("/")
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/enter", post(enter))
}
