use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{
    chain::{LotteryContract, NodeWallet},
    view::{Theme, ViewController},
};

/// The controller as wired to a real node.
pub type LotteryController = ViewController<LotteryContract, NodeWallet>;

/// Shared application state.
pub struct AppState {
    pub controller: Arc<LotteryController>,
    /// Markup variant for the page.
    pub theme: Theme,
    /// Broadcast channel for server-sent events (WebSocket).
    pub event_tx: broadcast::Sender<String>,
}
