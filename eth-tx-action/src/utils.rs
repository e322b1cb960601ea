use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use std::str::FromStr;

/// Адрес из входа action: сначала `is_address` (формат + EIP-55 для
/// смешанного регистра), потом разбор hex.
pub fn parse_addr(s: &str) -> Result<Address, String> {
    if !is_address(s) {
        return Err(format!("Invalid address `{s}`"));
    }
    Address::from_str(hex_body(s)).map_err(|e| format!("Invalid address `{s}`: {e}"))
}

fn hex_body(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// 40 hex digits with an optional `0x`. Mixed-case input must carry a valid
/// EIP-55 checksum; all-lower and all-upper are accepted as is.
pub fn is_address(s: &str) -> bool {
    let body = hex_body(s);
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    match Address::from_str(body) {
        Ok(addr) => to_checksum(&addr, None)[2..] == *body,
        Err(_) => false,
    }
}

/// Десятичное число или 0x-hex (gas-limit и т.п.)
pub fn parse_u256(s: &str) -> Result<U256, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => U256::from_dec_str(s).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| format!("Invalid number `{s}`: {e}"))
}
