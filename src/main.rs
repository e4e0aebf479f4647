use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;

use lottery_web::{
    chain::{LotteryContract, NodeWallet, RpcClient},
    routes,
    state::AppState,
    view::{Theme, ViewController},
};

#[derive(Debug, Parser)]
#[command(name = "lottery-web")]
#[command(about = "Web front-end for an on-chain lottery")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Ethereum JSON-RPC URL of a node that manages the entering accounts.
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,

    /// Lottery contract address.
    #[arg(long, env = "LOTTERY_ADDRESS")]
    lottery_address: String,

    /// Page markup variant.
    #[arg(long, env = "LOTTERY_THEME", value_enum, default_value_t = Theme::Card)]
    theme: Theme,

    /// Interval between transaction receipt polls, in milliseconds.
    #[arg(long, env = "RECEIPT_POLL_MS", default_value = "1000")]
    receipt_poll_ms: u64,

    /// How long to wait for an entry to be mined before reporting it failed, in seconds.
    #[arg(long, env = "RECEIPT_TIMEOUT_SECS", default_value = "750")]
    receipt_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lottery_web=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(rpc_url = %cli.rpc_url, lottery = %cli.lottery_address, "starting lottery-web");

    let rpc = RpcClient::new(cli.rpc_url);
    let contract = LotteryContract::new(rpc.clone(), cli.lottery_address)
        .with_receipt_poll(Duration::from_millis(cli.receipt_poll_ms))
        .with_receipt_timeout(Duration::from_secs(cli.receipt_timeout_secs));
    let wallet = NodeWallet::new(rpc);

    // Broadcast channel for WebSocket events (state changes)
    let (event_tx, _) = broadcast::channel::<String>(64);

    let controller = ViewController::new(contract, wallet, event_tx.clone());

    // Initial mount; the page retries on every load, so a failure here is not fatal.
    if let Err(e) = controller.initialize().await {
        tracing::warn!(error = %e, "initial lottery read failed");
    }

    let state = Arc::new(AppState {
        controller,
        theme: cli.theme,
        event_tx,
    });

    let app = routes::app_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}
