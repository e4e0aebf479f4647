//! On-chain access to the lottery contract.
//!
//! Reads `viewPlayers()`, `totalPlayers()` and `currWinner()` through `eth_call`,
//! the pot through `eth_getBalance`, and sends `enter()` with
//! `eth_sendTransaction`, waiting for the receipt.

use std::time::Duration;

use serde_json::Value;

use super::{
    abi,
    rpc::{expect_str, parse_quantity, to_quantity, RpcClient},
};
use crate::{
    error::GatewayError,
    gateway::{EntryRequest, LotteryGateway, TxReceipt},
};

/// Default interval between `eth_getTransactionReceipt` polls.
const DEFAULT_RECEIPT_POLL: Duration = Duration::from_secs(1);

/// Default time a sent entry may stay unmined before it is reported as failed.
const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(750);

/// Client for the lottery contract at a fixed address.
#[derive(Clone)]
pub struct LotteryContract {
    rpc: RpcClient,
    address: String,
    receipt_poll: Duration,
    receipt_timeout: Duration,
}

impl LotteryContract {
    pub fn new(rpc: RpcClient, address: impl Into<String>) -> Self {
        Self {
            rpc,
            address: address.into(),
            receipt_poll: DEFAULT_RECEIPT_POLL,
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    pub fn with_receipt_poll(mut self, interval: Duration) -> Self {
        self.receipt_poll = interval;
        self
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Poll until the node reports a receipt for `tx_hash`, giving up after
    /// the receipt timeout.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TxReceipt, GatewayError> {
        match tokio::time::timeout(self.receipt_timeout, self.poll_receipt(tx_hash)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    tx_hash = %tx_hash,
                    timeout_ms = self.receipt_timeout.as_millis() as u64,
                    "entry transaction not mined in time"
                );
                Err(GatewayError::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited: self.receipt_timeout,
                })
            }
        }
    }

    async fn poll_receipt(&self, tx_hash: &str) -> Result<TxReceipt, GatewayError> {
        loop {
            let receipt = self
                .rpc
                .call("eth_getTransactionReceipt", serde_json::json!([tx_hash]))
                .await?;

            if !receipt.is_null() {
                return parse_receipt(tx_hash, &receipt);
            }

            tracing::trace!(tx_hash = %tx_hash, "receipt not available yet");
            tokio::time::sleep(self.receipt_poll).await;
        }
    }
}

impl LotteryGateway for LotteryContract {
    async fn view_players(&self) -> Result<Vec<String>, GatewayError> {
        let result = self
            .rpc
            .eth_call(&self.address, &abi::selector("viewPlayers()"))
            .await?;
        abi::decode_address_array(&result)
    }

    async fn total_players(&self) -> Result<String, GatewayError> {
        let result = self
            .rpc
            .eth_call(&self.address, &abi::selector("totalPlayers()"))
            .await?;
        abi::decode_uint(&result).map(|n| n.to_string())
    }

    async fn curr_winner(&self) -> Result<String, GatewayError> {
        let result = self
            .rpc
            .eth_call(&self.address, &abi::selector("currWinner()"))
            .await?;
        abi::decode_address(&result)
    }

    async fn balance(&self, address: &str) -> Result<u128, GatewayError> {
        let result = self
            .rpc
            .call("eth_getBalance", serde_json::json!([address, "latest"]))
            .await?;
        parse_quantity(expect_str(&result, "eth_getBalance")?)
    }

    async fn enter(&self, request: EntryRequest) -> Result<TxReceipt, GatewayError> {
        let tx = serde_json::json!({
            "from": request.from,
            "to": self.address,
            "value": to_quantity(request.value),
            "data": abi::selector("enter()"),
        });

        let result = self.rpc.call("eth_sendTransaction", serde_json::json!([tx])).await?;
        let tx_hash = expect_str(&result, "eth_sendTransaction")?.to_string();

        tracing::info!(
            tx_hash = %tx_hash,
            from = %request.from,
            value = request.value,
            "entry transaction sent"
        );

        let receipt = self.wait_for_receipt(&tx_hash).await?;
        if !receipt.status {
            return Err(GatewayError::ContractReverted {
                message: format!("transaction {} reverted", tx_hash),
            });
        }
        Ok(receipt)
    }

    fn contract_address(&self) -> &str {
        &self.address
    }
}

fn parse_receipt(tx_hash: &str, receipt: &Value) -> Result<TxReceipt, GatewayError> {
    let block_number = receipt
        .get("blockNumber")
        .and_then(Value::as_str)
        .map(|raw| {
            let n = parse_quantity(raw)?;
            u64::try_from(n).map_err(|_| {
                GatewayError::InvalidResponse(format!("block number {} out of range", raw))
            })
        })
        .transpose()?;

    // Pre-Byzantium receipts carry no status; treat them as successful.
    let status = match receipt.get("status").and_then(Value::as_str) {
        Some(s) => parse_quantity(s)? == 1,
        None => true,
    };

    Ok(TxReceipt {
        transaction_hash: receipt
            .get("transactionHash")
            .and_then(Value::as_str)
            .unwrap_or(tx_hash)
            .to_string(),
        block_number,
        status,
    })
}
