use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::broadcast;

use crate::state::AppState;

/// `GET /ws` — current state on connect, then every state change as it happens.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Subscribe before taking the snapshot so no change falls in between.
    let rx = state.event_tx.subscribe();
    ws.on_upgrade(move |socket| stream_events(socket, state, rx))
}

async fn stream_events(
    mut socket: WebSocket,
    state: Arc<AppState>,
    mut rx: broadcast::Receiver<String>,
) {
    let hello = serde_json::json!({
        "type": "lottery:snapshot",
        "state": state.controller.state().await,
    });
    if socket.send(Message::Text(hello.to_string().into())).await.is_err() {
        return;
    }

    tracing::debug!("event stream opened");

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if socket.send(Message::Text(event.into())).await.is_err() {
                        break;
                    }
                }
                // Pages only reload on events, so a gap loses nothing.
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("event stream closed");
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(ws_handler))
}
