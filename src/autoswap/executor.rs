use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use alloy_primitives::U256;
use anyhow::{Context as _, Result};

use super::AutoSwapContract;
use super::eligibility::{TriggerMatch, TriggerPolicy, precheck};
use crate::config::AutoSwapSettings;
use crate::ledger::ContractClient;
use crate::oracle::OracleContract;
use crate::price::{cross_rate, scaled_to_decimal_string};

pub trait Clock {
    fn now_unix(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    Idle,
    Scanned(ScanSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub last_order_id: u64,
    pub cross_rate: U256,
    pub executed: u64,
    pub dry_run: u64,
    pub skipped: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Executed { transaction_id: String },
    DryRun,
    Skipped,
}

pub struct Executor<'a, C, K, S> {
    client: &'a C,
    settings: AutoSwapSettings,
    clock: K,
    sleeper: S,
}

impl<'a, C, K, S> Executor<'a, C, K, S>
where
    C: ContractClient,
    K: Clock,
    S: Sleeper,
{
    pub fn new(client: &'a C, settings: AutoSwapSettings, clock: K, sleeper: S) -> Self {
        Self {
            client,
            settings,
            clock,
            sleeper,
        }
    }

    fn autoswap(&self) -> AutoSwapContract<'a, C> {
        AutoSwapContract::new(
            self.client,
            self.settings.autoswap_contract_id.clone(),
            self.settings.query_gas,
        )
    }

    fn oracle(&self) -> OracleContract<'a, C> {
        OracleContract::new(
            self.client,
            self.settings.oracle_contract_id.clone(),
            self.settings.query_gas,
        )
    }

    fn policy(&self) -> TriggerPolicy {
        TriggerPolicy {
            allow_near_trigger_execution: self.settings.allow_near_trigger_execution,
            slippage_tolerance_percent: self.settings.slippage_tolerance_percent,
        }
    }

    pub async fn fetch_cross_rate(&self) -> Result<U256> {
        let oracle = self.oracle();
        let base_usd = oracle
            .get_price(&self.settings.target_token)
            .await
            .context("fetch target token price")?;
        let quote_usd = oracle
            .get_price(&self.settings.quote_token)
            .await
            .context("fetch quote token price")?;
        Ok(cross_rate(base_usd, quote_usd)?)
    }

    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let next_order_id = self.autoswap().next_order_id().await?;
        if next_order_id <= U256::from(1u64) {
            return Ok(CycleReport::Idle);
        }
        let last_order_id = u64::try_from(next_order_id - U256::from(1u64))
            .map_err(|_| anyhow::anyhow!("nextOrderId out of range: {next_order_id}"))?;

        let cross_rate = self.fetch_cross_rate().await?;
        tracing::info!(
            last_order_id,
            cross_rate = %scaled_to_decimal_string(cross_rate),
            "scanning orders"
        );

        let mut summary = ScanSummary {
            last_order_id,
            cross_rate,
            ..ScanSummary::default()
        };

        for order_id in 1..=last_order_id {
            match self.process_order(order_id, cross_rate).await {
                Ok(OrderOutcome::Executed { .. }) => summary.executed += 1,
                Ok(OrderOutcome::DryRun) => summary.dry_run += 1,
                Ok(OrderOutcome::Skipped) => summary.skipped += 1,
                Err(err) => {
                    summary.failed += 1;
                    let err = format!("{err:#}");
                    tracing::warn!(order_id, error = %err, "order processing failed");
                }
            }
        }

        Ok(CycleReport::Scanned(summary))
    }

    pub async fn process_order(&self, order_id: u64, cross_rate: U256) -> Result<OrderOutcome> {
        let autoswap = self.autoswap();
        let order = autoswap.get_order(order_id).await?;

        if let Err(reason) = precheck(&order, self.clock.now_unix(), &self.settings.target_token)
        {
            tracing::debug!(order_id, %reason, "skip order");
            return Ok(OrderOutcome::Skipped);
        }

        let (can_execute, reason) = autoswap.can_execute_order(order_id).await?;
        if !can_execute {
            tracing::info!(order_id, %reason, "contract refused execution");
            return Ok(OrderOutcome::Skipped);
        }

        let trigger = match self.policy().evaluate(cross_rate, order.trigger_price) {
            Some(trigger) => trigger,
            None => {
                tracing::debug!(
                    order_id,
                    current = %scaled_to_decimal_string(cross_rate),
                    trigger = %scaled_to_decimal_string(order.trigger_price),
                    "price below trigger"
                );
                return Ok(OrderOutcome::Skipped);
            }
        };
        let near_trigger = trigger == TriggerMatch::NearTrigger;

        if self.settings.dry_run {
            tracing::info!(order_id, near_trigger, "dry run: would execute order");
            return Ok(OrderOutcome::DryRun);
        }

        let receipt = autoswap
            .execute_order(order_id, cross_rate, self.settings.max_execution_gas)
            .await?;
        tracing::info!(
            order_id,
            near_trigger,
            transaction_id = %receipt.transaction_id,
            "executed order"
        );
        Ok(OrderOutcome::Executed {
            transaction_id: receipt.transaction_id,
        })
    }

    pub async fn run<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0u64;

        loop {
            cycles += 1;
            match self.run_cycle().await {
                Ok(CycleReport::Idle) => tracing::info!("no orders yet"),
                Ok(CycleReport::Scanned(s)) => tracing::info!(
                    last_order_id = s.last_order_id,
                    executed = s.executed,
                    dry_run = s.dry_run,
                    skipped = s.skipped,
                    failed = s.failed,
                    "cycle complete"
                ),
                Err(err) => {
                    let err = format!("{err:#}");
                    tracing::warn!(error = %err, "cycle aborted");
                }
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(cycles, "shutting down");
                    return cycles;
                }
                _ = self.sleeper.sleep(self.settings.poll_interval) => {}
            }
        }
    }
}
