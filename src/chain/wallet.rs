//! Wallet backed by accounts the node manages (`eth_accounts`); the node signs
//! `eth_sendTransaction` requests for them.

use super::rpc::RpcClient;
use crate::{error::GatewayError, gateway::WalletProvider};

#[derive(Clone)]
pub struct NodeWallet {
    rpc: RpcClient,
}

impl NodeWallet {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

impl WalletProvider for NodeWallet {
    async fn accounts(&self) -> Result<Vec<String>, GatewayError> {
        let result = self.rpc.call("eth_accounts", serde_json::json!([])).await?;
        let accounts = result.as_array().ok_or_else(|| {
            GatewayError::InvalidResponse(format!("eth_accounts: expected array, got {}", result))
        })?;

        let accounts = accounts
            .iter()
            .map(|a| {
                a.as_str().map(str::to_string).ok_or_else(|| {
                    GatewayError::InvalidResponse(format!("eth_accounts: non-string entry {}", a))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = accounts.len(), "wallet accounts");
        Ok(accounts)
    }
}
