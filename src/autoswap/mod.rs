pub mod eligibility;
pub mod executor;

use alloy_primitives::U256;
use anyhow::{Context as _, Result};

use crate::ledger::{ContractClient, ContractValue, ExecutionReceipt, Returns};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOrder {
    pub order_id: u64,
    pub token_out: String,
    pub amount_in_tinybar: U256,
    pub min_amount_out: U256,
    pub trigger_price: U256,
    pub owner: String,
    pub is_active: bool,
    pub expiration_time: U256,
    pub is_executed: bool,
}

impl SwapOrder {
    fn decode(order_id: u64, out: &Returns) -> Result<Self> {
        Ok(Self {
            order_id,
            token_out: out.address(0).context("tokenOut")?,
            amount_in_tinybar: out.uint(1).context("amountIn")?,
            min_amount_out: out.uint(2).context("minAmountOut")?,
            trigger_price: out.uint(3).context("triggerPrice")?,
            owner: out.address(4).context("owner")?,
            is_active: out.boolean(5).context("isActive")?,
            expiration_time: out.uint(6).context("expirationTime")?,
            is_executed: out.boolean(7).context("isExecuted")?,
        })
    }
}

pub struct AutoSwapContract<'a, C> {
    client: &'a C,
    contract_id: String,
    query_gas: u64,
}

impl<'a, C: ContractClient> AutoSwapContract<'a, C> {
    pub fn new(client: &'a C, contract_id: String, query_gas: u64) -> Self {
        Self {
            client,
            contract_id,
            query_gas,
        }
    }

    pub async fn next_order_id(&self) -> Result<U256> {
        let out = self
            .client
            .call(&self.contract_id, "nextOrderId", vec![], self.query_gas)
            .await
            .context("query nextOrderId")?;
        out.uint(0).context("decode nextOrderId")
    }

    pub async fn get_order(&self, order_id: u64) -> Result<SwapOrder> {
        let out = self
            .client
            .call(
                &self.contract_id,
                "getOrderDetails",
                vec![order_id.into()],
                self.query_gas,
            )
            .await
            .with_context(|| format!("query order {order_id}"))?;
        SwapOrder::decode(order_id, &out).with_context(|| format!("decode order {order_id}"))
    }

    pub async fn can_execute_order(&self, order_id: u64) -> Result<(bool, String)> {
        let out = self
            .client
            .call(
                &self.contract_id,
                "canExecuteOrder",
                vec![order_id.into()],
                self.query_gas,
            )
            .await
            .with_context(|| format!("query canExecuteOrder {order_id}"))?;
        let ok = out.boolean(0).context("decode canExecuteOrder verdict")?;
        let reason = out.string(1).context("decode canExecuteOrder reason")?;
        Ok((ok, reason))
    }

    pub async fn execute_order(
        &self,
        order_id: u64,
        current_price: U256,
        gas: u64,
    ) -> Result<ExecutionReceipt> {
        self.client
            .execute(
                &self.contract_id,
                "executeSwapOrder",
                vec![order_id.into(), ContractValue::Uint256(current_price)],
                gas,
            )
            .await
            .with_context(|| format!("execute order {order_id}"))
    }
}
