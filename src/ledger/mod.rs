pub mod gateway;

use std::future::Future;

use alloy_primitives::U256;
use anyhow::Result;
use serde::Serialize;

use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractValue {
    Address(String),
    Uint256(U256),
    Bool(bool),
    String(String),
    AddressArray(Vec<String>),
    Uint256Array(Vec<U256>),
}

impl ContractValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ContractValue::Address(_) => "address",
            ContractValue::Uint256(_) => "uint256",
            ContractValue::Bool(_) => "bool",
            ContractValue::String(_) => "string",
            ContractValue::AddressArray(_) => "address[]",
            ContractValue::Uint256Array(_) => "uint256[]",
        }
    }
}

impl From<u64> for ContractValue {
    fn from(value: u64) -> Self {
        ContractValue::Uint256(U256::from(value))
    }
}

impl From<U256> for ContractValue {
    fn from(value: U256) -> Self {
        ContractValue::Uint256(value)
    }
}

#[derive(Debug, Clone)]
pub struct Returns(Vec<ContractValue>);

impl Returns {
    pub fn new(values: Vec<ContractValue>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn get(&self, index: usize) -> Result<&ContractValue, DecodeError> {
        self.0.get(index).ok_or(DecodeError::Missing { index })
    }

    pub fn address(&self, index: usize) -> Result<String, DecodeError> {
        match self.get(index)? {
            ContractValue::Address(a) => Ok(a.to_ascii_lowercase()),
            other => Err(unexpected(index, "address", other)),
        }
    }

    pub fn uint(&self, index: usize) -> Result<U256, DecodeError> {
        match self.get(index)? {
            ContractValue::Uint256(v) => Ok(*v),
            other => Err(unexpected(index, "uint256", other)),
        }
    }

    pub fn boolean(&self, index: usize) -> Result<bool, DecodeError> {
        match self.get(index)? {
            ContractValue::Bool(v) => Ok(*v),
            other => Err(unexpected(index, "bool", other)),
        }
    }

    pub fn string(&self, index: usize) -> Result<String, DecodeError> {
        match self.get(index)? {
            ContractValue::String(v) => Ok(v.clone()),
            other => Err(unexpected(index, "string", other)),
        }
    }
}

fn unexpected(index: usize, expected: &'static str, got: &ContractValue) -> DecodeError {
    DecodeError::UnexpectedType {
        index,
        expected,
        got: got.kind(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReceipt {
    pub transaction_id: String,
    pub status: String,
}

pub const RECEIPT_SUCCESS: &str = "SUCCESS";

// `execute` fails for any receipt status other than RECEIPT_SUCCESS.
pub trait ContractClient {
    fn call(
        &self,
        contract_id: &str,
        function: &str,
        params: Vec<ContractValue>,
        gas: u64,
    ) -> impl Future<Output = Result<Returns>> + Send;

    fn execute(
        &self,
        contract_id: &str,
        function: &str,
        params: Vec<ContractValue>,
        gas: u64,
    ) -> impl Future<Output = Result<ExecutionReceipt>> + Send;
}
