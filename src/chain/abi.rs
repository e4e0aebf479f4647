//! Just enough of the Solidity ABI for the lottery contract: zero-argument
//! calls and `uint256`, `address` and `address[]` return values.

use super::rpc::{keccak256, parse_hex_bytes};
use crate::error::GatewayError;

const WORD: usize = 32;

/// Calldata for a zero-argument function: its 4-byte selector as `0x`-hex.
///
/// `signature` is the canonical form, e.g. `"enter()"`.
pub fn selector(signature: &str) -> String {
    format!("0x{}", hex::encode(&keccak256(signature.as_bytes())[..4]))
}

/// Decode a single `uint256` return value.
pub fn decode_uint(data: &str) -> Result<u128, GatewayError> {
    let bytes = parse_hex_bytes(data)?;
    word_to_u128(word_at(&bytes, 0)?)
}

/// Decode a single `address` return value as an EIP-55 checksummed string.
pub fn decode_address(data: &str) -> Result<String, GatewayError> {
    let bytes = parse_hex_bytes(data)?;
    word_to_address(word_at(&bytes, 0)?)
}

/// Decode a single dynamic `address[]` return value.
pub fn decode_address_array(data: &str) -> Result<Vec<String>, GatewayError> {
    let bytes = parse_hex_bytes(data)?;
    let offset = word_to_usize(word_at(&bytes, 0)?)?;
    if offset % WORD != 0 || offset > bytes.len() {
        return Err(invalid(format!("bad array offset {}", offset)));
    }

    let len = word_to_usize(word_at(&bytes, offset)?)?;
    let available = bytes.len().saturating_sub(offset + WORD) / WORD;
    if len > available {
        return Err(invalid(format!(
            "array claims {} elements but only {} words follow",
            len, available
        )));
    }

    (0..len)
        .map(|i| word_to_address(word_at(&bytes, offset + WORD * (i + 1))?))
        .collect()
}

/// Format a 20-byte address with the EIP-55 mixed-case checksum.
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn invalid(reason: String) -> GatewayError {
    GatewayError::InvalidResponse(format!("abi: {}", reason))
}

fn word_at(bytes: &[u8], offset: usize) -> Result<&[u8], GatewayError> {
    bytes
        .get(offset..offset + WORD)
        .ok_or_else(|| {
            invalid(format!(
                "no 32-byte word at offset {} (len {})",
                offset,
                bytes.len()
            ))
        })
}

fn word_to_u128(word: &[u8]) -> Result<u128, GatewayError> {
    let (high, low) = word.split_at(16);
    if high.iter().any(|&b| b != 0) {
        return Err(invalid(format!("uint256 0x{} does not fit in 128 bits", hex::encode(word))));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(low);
    Ok(u128::from_be_bytes(buf))
}

fn word_to_usize(word: &[u8]) -> Result<usize, GatewayError> {
    let value = word_to_u128(word)?;
    usize::try_from(value).map_err(|_| invalid(format!("length {} out of range", value)))
}

fn word_to_address(word: &[u8]) -> Result<String, GatewayError> {
    let (padding, raw) = word.split_at(12);
    if padding.iter().any(|&b| b != 0) {
        return Err(invalid(format!("dirty address word 0x{}", hex::encode(word))));
    }
    let mut address = [0u8; 20];
    address.copy_from_slice(raw);
    Ok(to_checksum_address(&address))
}
