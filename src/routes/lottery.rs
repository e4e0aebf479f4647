use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{state::AppState, view::LotteryState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LotteryResponse {
    #[serde(flatten)]
    state: LotteryState,
    display_balance: String,
}

impl From<LotteryState> for LotteryResponse {
    fn from(state: LotteryState) -> Self {
        Self {
            display_balance: state.display_balance(),
            state,
        }
    }
}

/// `GET /api/lottery` — current page state.
async fn get_lottery(State(state): State<Arc<AppState>>) -> Json<LotteryResponse> {
    Json(state.controller.state().await.into())
}

/// `POST /api/lottery/refresh` — re-read the contract.
async fn refresh(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LotteryResponse>, (StatusCode, String)> {
    state.controller.initialize().await.map_err(|e| {
        tracing::warn!(error = %e, "lottery refresh failed");
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;
    Ok(Json(state.controller.state().await.into()))
}

#[derive(Debug, Deserialize)]
struct EnterRequest {
    value: String,
}

/// `POST /api/lottery/enter` — enter and wait for the outcome.
///
/// Entry failures are reported in `entryMessage`; only a wallet that cannot
/// list its accounts makes the request fail.
async fn enter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnterRequest>,
) -> Result<Json<LotteryResponse>, (StatusCode, String)> {
    state.controller.set_entry_value(req.value.clone()).await;
    state.controller.on_submit(&req.value).await.map_err(|e| {
        tracing::error!(error = %e, "failed to read wallet accounts");
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;
    Ok(Json(state.controller.state().await.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lottery", get(get_lottery))
        .route("/lottery/refresh", post(refresh))
        .route("/lottery/enter", post(enter))
}
