use crate::error::TokenError;

// HBAR maps to the wrapped token; the oracle only prices ERC-20 style addresses.
pub const TOKENS: &[(&str, &str)] = &[
    ("HBAR", "0x0000000000000000000000000000000000163b5a"),
    ("WHBAR", "0x0000000000000000000000000000000000163b5a"),
    ("SAUCE", "0x00000000000000000000000000000000000b2ad5"),
    ("XSAUCE", "0x00000000000000000000000000000000001647e8"),
    ("USDC", "0x000000000000000000000000000000000006f89a"),
];

pub fn known_symbols() -> String {
    TOKENS
        .iter()
        .map(|(symbol, _)| *symbol)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn resolve_token(input: &str) -> Result<String, TokenError> {
    let input = input.trim();

    if let Some((_, address)) = TOKENS
        .iter()
        .find(|(symbol, _)| symbol.eq_ignore_ascii_case(input))
    {
        return Ok((*address).to_string());
    }

    parse_evm_address(input).ok_or_else(|| TokenError::UnknownToken {
        input: input.to_string(),
        known: known_symbols(),
    })
}

pub fn symbol_for(address: &str) -> Option<&'static str> {
    TOKENS
        .iter()
        .find(|(_, a)| a.eq_ignore_ascii_case(address))
        .map(|(symbol, _)| *symbol)
}

pub fn parse_evm_address(input: &str) -> Option<String> {
    let body = input.strip_prefix("0x")?;
    if input.len() != 42 || hex::decode(body).is_err() {
        return None;
    }
    Some(input.to_ascii_lowercase())
}

pub fn parse_account_address(input: &str) -> Result<String, TokenError> {
    let input = input.trim();
    if let Some(address) = parse_evm_address(input) {
        return Ok(address);
    }
    entity_id_to_address(input).ok_or_else(|| TokenError::InvalidAddress(input.to_string()))
}

fn entity_id_to_address(input: &str) -> Option<String> {
    let mut parts = input.split('.');
    let shard: u32 = parts.next()?.parse().ok()?;
    let realm: u64 = parts.next()?.parse().ok()?;
    let num: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let mut bytes = Vec::with_capacity(20);
    bytes.extend_from_slice(&shard.to_be_bytes());
    bytes.extend_from_slice(&realm.to_be_bytes());
    bytes.extend_from_slice(&num.to_be_bytes());
    Some(format!("0x{}", hex::encode(bytes)))
}
