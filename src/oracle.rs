use alloy_primitives::U256;
use anyhow::{Context as _, Result};

use crate::error::PairError;
use crate::ledger::{ContractClient, ContractValue, ExecutionReceipt};
use crate::price::decimal_to_scaled;
use crate::token::resolve_token;

pub const UPDATE_GAS: u64 = 300_000;
pub const BATCH_GAS_PER_PAIR: u64 = 150_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub symbol: String,
    pub token: String,
    pub price: U256,
}

pub fn parse_pairs(input: &str) -> Result<Vec<PriceUpdate>, PairError> {
    let mut updates: Vec<PriceUpdate> = Vec::new();

    for segment in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (symbol, usd) = segment
            .split_once('=')
            .map(|(s, u)| (s.trim(), u.trim()))
            .filter(|(s, u)| !s.is_empty() && !u.is_empty())
            .ok_or_else(|| PairError::Malformed(segment.to_string()))?;

        let token = resolve_token(symbol)?;
        if updates.iter().any(|u| u.token == token) {
            return Err(PairError::Duplicate(symbol.to_string()));
        }

        let price = decimal_to_scaled(usd).map_err(|source| PairError::Price {
            pair: segment.to_string(),
            source,
        })?;

        updates.push(PriceUpdate {
            symbol: symbol.to_ascii_uppercase(),
            token,
            price,
        });
    }

    if updates.is_empty() {
        return Err(PairError::Empty);
    }
    Ok(updates)
}

pub fn batch_gas(pairs: usize) -> u64 {
    (pairs as u64)
        .saturating_mul(BATCH_GAS_PER_PAIR)
        .max(UPDATE_GAS)
}

pub struct OracleContract<'a, C> {
    client: &'a C,
    contract_id: String,
    query_gas: u64,
}

impl<'a, C: ContractClient> OracleContract<'a, C> {
    pub fn new(client: &'a C, contract_id: String, query_gas: u64) -> Self {
        Self {
            client,
            contract_id,
            query_gas,
        }
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    pub async fn owner(&self) -> Result<String> {
        let out = self
            .client
            .call(&self.contract_id, "owner", vec![], self.query_gas)
            .await
            .context("query owner")?;
        out.address(0).context("decode owner")
    }

    pub async fn transfer_ownership(&self, new_owner: &str) -> Result<ExecutionReceipt> {
        self.client
            .execute(
                &self.contract_id,
                "transferOwnership",
                vec![ContractValue::Address(new_owner.to_string())],
                UPDATE_GAS,
            )
            .await
            .with_context(|| format!("transfer ownership to {new_owner}"))
    }

    pub async fn set_price(&self, token: &str, price: U256) -> Result<ExecutionReceipt> {
        self.client
            .execute(
                &self.contract_id,
                "setPrice",
                vec![ContractValue::Address(token.to_string()), price.into()],
                UPDATE_GAS,
            )
            .await
            .with_context(|| format!("set price for {token}"))
    }

    pub async fn set_prices(&self, updates: &[PriceUpdate]) -> Result<ExecutionReceipt> {
        anyhow::ensure!(!updates.is_empty(), "no price updates given");

        let tokens = updates.iter().map(|u| u.token.clone()).collect();
        let prices = updates.iter().map(|u| u.price).collect();
        self.client
            .execute(
                &self.contract_id,
                "setPrices",
                vec![
                    ContractValue::AddressArray(tokens),
                    ContractValue::Uint256Array(prices),
                ],
                batch_gas(updates.len()),
            )
            .await
            .with_context(|| format!("set {} prices", updates.len()))
    }

    pub async fn reset_prices(&self) -> Result<ExecutionReceipt> {
        self.client
            .execute(&self.contract_id, "resetAllPrices", vec![], UPDATE_GAS)
            .await
            .context("reset all prices")
    }

    pub async fn get_price(&self, token: &str) -> Result<U256> {
        let out = self
            .client
            .call(
                &self.contract_id,
                "getPrice",
                vec![ContractValue::Address(token.to_string())],
                self.query_gas,
            )
            .await
            .with_context(|| format!("query price for {token}"))?;
        out.uint(0)
            .with_context(|| format!("decode price for {token}"))
    }
}
