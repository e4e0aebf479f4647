//! Ethereum JSON-RPC transport shared by the lottery gateway and the wallet.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

/// JSON-RPC request wrapper.
#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC response wrapper. `result` may legitimately be `null`
/// (e.g. a receipt that is not mined yet).
#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<Value>,
}

/// A JSON-RPC endpoint.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Perform a raw JSON-RPC call. Node-reported errors are classified,
    /// transport errors become [`GatewayError::NetworkFailure`].
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        tracing::debug!(method, url = %self.url, "json-rpc request");

        let resp: RpcResponse = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = resp.error {
            tracing::debug!(method, %error, "json-rpc error");
            return Err(GatewayError::from_rpc_error(error));
        }

        Ok(resp.result)
    }

    /// `eth_call` against the latest block, returning the raw hex result.
    pub async fn eth_call(&self, to: &str, data: &str) -> Result<String, GatewayError> {
        let result = self
            .call(
                "eth_call",
                serde_json::json!([{ "to": to, "data": data }, "latest"]),
            )
            .await?;
        expect_str(&result, "eth_call").map(str::to_string)
    }
}

/// Borrow a JSON string result or report which call returned something else.
pub fn expect_str<'a>(value: &'a Value, method: &str) -> Result<&'a str, GatewayError> {
    value.as_str().ok_or_else(|| {
        GatewayError::InvalidResponse(format!("{}: expected string, got {}", method, value))
    })
}

// ---------------------------------------------------------------------------
// Hex / quantity helpers
// ---------------------------------------------------------------------------

fn strip_hex_prefix(hex_str: &str) -> &str {
    hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .unwrap_or(hex_str)
}

/// Decode a hex string (with or without `0x`, odd length allowed) into bytes.
pub fn parse_hex_bytes(hex_str: &str) -> Result<Vec<u8>, GatewayError> {
    let stripped = strip_hex_prefix(hex_str);

    if stripped.is_empty() {
        return Ok(Vec::new());
    }

    let padded = if stripped.len() % 2 == 1 {
        format!("0{}", stripped)
    } else {
        stripped.to_string()
    };

    hex::decode(&padded).map_err(|e| {
        GatewayError::InvalidResponse(format!("invalid hex string {:?}: {}", hex_str, e))
    })
}

/// Parse a JSON-RPC quantity such as `"0x1bc16d674ec80000"`.
pub fn parse_quantity(hex_str: &str) -> Result<u128, GatewayError> {
    let stripped = strip_hex_prefix(hex_str);
    if stripped.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(stripped, 16).map_err(|e| {
        GatewayError::InvalidResponse(format!("invalid quantity {:?}: {}", hex_str, e))
    })
}

/// Encode a value as a minimal JSON-RPC quantity (`0` → `"0x0"`).
pub fn to_quantity(value: u128) -> String {
    format!("0x{:x}", value)
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    use tiny_keccak::{Hasher, Keccak};
    let mut keccak = Keccak::v256();
    keccak.update(data);
    let mut out = [0u8; 32];
    keccak.finalize(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_round_trip_edges() {
        assert_eq!(to_quantity(0), "0x0");
        assert_eq!(to_quantity(10_000_000_000_000_000), "0x2386f26fc10000");
        assert_eq!(parse_quantity("0x2386f26fc10000").unwrap(), 10_000_000_000_000_000);
        assert_eq!(parse_quantity("0x").unwrap(), 0);
    }

    #[test]
    fn quantity_rejects_garbage() {
        assert!(matches!(
            parse_quantity("0xzz"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn hex_bytes_pads_odd_length() {
        assert_eq!(parse_hex_bytes("0x1").unwrap(), vec![0x01]);
        assert_eq!(parse_hex_bytes("0xff00").unwrap(), vec![0xff, 0x00]);
        assert!(parse_hex_bytes("0x").unwrap().is_empty());
    }

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
