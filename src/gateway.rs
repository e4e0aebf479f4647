//! Collaborator seams of the view controller: the lottery contract and the
//! wallet that owns the sending account.

use std::future::Future;

use serde::Serialize;

use crate::error::GatewayError;

/// A funded `enter()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRequest {
    /// Sending account.
    pub from: String,
    /// Amount in wei.
    pub value: u128,
}

/// Receipt of a mined entry transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub status: bool,
}

/// Pass-through access to the lottery contract.
///
/// Implementations add no retries, caching or timeouts; whatever the
/// underlying client reports is returned unchanged.
pub trait LotteryGateway: Send + Sync {
    /// Addresses currently entered, in contract order.
    fn view_players(&self) -> impl Future<Output = Result<Vec<String>, GatewayError>> + Send;

    /// Player count as a decimal string.
    fn total_players(&self) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Address of the last winner (the zero address before any draw).
    fn curr_winner(&self) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Native balance of `address` in wei.
    fn balance(&self, address: &str) -> impl Future<Output = Result<u128, GatewayError>> + Send;

    /// Submit an entry and resolve once it is mined.
    fn enter(
        &self,
        request: EntryRequest,
    ) -> impl Future<Output = Result<TxReceipt, GatewayError>> + Send;

    /// Address of the lottery contract itself.
    fn contract_address(&self) -> &str;
}

/// Source of the accounts that may sign an entry.
pub trait WalletProvider: Send + Sync {
    fn accounts(&self) -> impl Future<Output = Result<Vec<String>, GatewayError>> + Send;
}
