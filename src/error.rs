//! Errors raised by the lottery gateway and the wallet provider.
//!
//! Errors are kept typed inside the view state and only turned into text when
//! the status region is rendered.

use serde_json::Value;
use thiserror::Error;

/// JSON-RPC error code used by wallets when the user declines a request (EIP-1193).
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC error code used by nodes for execution reverts.
const EXECUTION_REVERTED_CODE: i64 = 3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The node could not be reached or answered with something that is not JSON-RPC.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The account holder declined to sign.
    #[error("user rejected the request (code {code}): {message}")]
    UserRejected { code: i64, message: String },

    /// The contract rejected the call.
    #[error("contract reverted: {message}")]
    ContractReverted { message: String },

    /// Any other error payload, shown as the node sent it.
    #[error("{0}")]
    Unknown(Value),

    /// The node answered, but not with data of the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The transaction was sent but no receipt appeared in time.
    #[error("transaction {tx_hash} was not mined within {}s", waited.as_secs())]
    ReceiptTimeout {
        tx_hash: String,
        waited: std::time::Duration,
    },

    #[error("invalid entry amount: {0}")]
    InvalidAmount(String),

    #[error("no account available from the wallet provider")]
    NoAccount,
}

impl GatewayError {
    /// Classify a JSON-RPC `error` object.
    pub fn from_rpc_error(payload: Value) -> Self {
        let code = payload.get("code").and_then(Value::as_i64);
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match code {
            Some(USER_REJECTED_CODE) => GatewayError::UserRejected {
                code: USER_REJECTED_CODE,
                message,
            },
            Some(EXECUTION_REVERTED_CODE) => GatewayError::ContractReverted { message },
            _ if message.to_ascii_lowercase().contains("revert") => {
                GatewayError::ContractReverted { message }
            }
            _ => GatewayError::Unknown(payload),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::NetworkFailure(err.to_string())
    }
}
