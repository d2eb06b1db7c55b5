use std::future::Future;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use oracle_autoswap::autoswap::executor::{CycleReport, Executor, SystemClock, TokioSleeper};
use oracle_autoswap::config::{ExecutorConfig, process_env};
use oracle_autoswap::ledger::gateway::GatewayContractClient;
use oracle_autoswap::price::scaled_to_decimal_string;

/// Poll open swap orders and execute the ones whose trigger price is reached.
#[derive(Debug, clap::Parser)]
#[command(name = "autoswap-executor")]
struct Args {
    /// Run a single polling cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    oracle_autoswap::logging::init().ok();
    let args = Args::parse();

    let env = process_env();
    let cfg = ExecutorConfig::from_env(&env).context("load configuration")?;
    let settings = &cfg.autoswap;
    tracing::info!(
        account_id = %cfg.ledger.operator.account_id,
        network = %cfg.ledger.network,
        gateway_url = %cfg.ledger.gateway_url,
        autoswap = %settings.autoswap_contract_id,
        oracle = %settings.oracle_contract_id,
        target_token = %settings.target_token,
        quote_token = %settings.quote_token,
        slippage_tolerance_percent = settings.slippage_tolerance_percent,
        allow_near_trigger_execution = settings.allow_near_trigger_execution,
        poll_interval_ms = settings.poll_interval.as_millis() as u64,
        gateway_timeout_ms = cfg.ledger.request_timeout.as_millis() as u64,
        receipt_timeout_ms = cfg.ledger.receipt_timeout.as_millis() as u64,
        max_execution_gas = settings.max_execution_gas,
        dry_run = settings.dry_run,
        "autoswap executor configured"
    );

    let shutdown = (!args.once).then(shutdown_on_ctrl_c);

    let client = GatewayContractClient::connect(&cfg.ledger).await?;

    let executor = Executor::new(&client, cfg.autoswap.clone(), SystemClock, TokioSleeper);

    let Some(shutdown) = shutdown else {
        match executor.run_cycle().await.context("run cycle")? {
            CycleReport::Idle => tracing::info!("no orders yet"),
            CycleReport::Scanned(s) => tracing::info!(
                last_order_id = s.last_order_id,
                cross_rate = %scaled_to_decimal_string(s.cross_rate),
                executed = s.executed,
                dry_run = s.dry_run,
                skipped = s.skipped,
                failed = s.failed,
                "cycle complete"
            ),
        }
        return Ok(());
    };

    executor.run(shutdown).await;
    Ok(())
}

// Spawned before the first cycle so the signal handler is already installed.
fn shutdown_on_ctrl_c() -> impl Future<Output = ()> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("ctrl-c received, stopping after the current cycle");
                tx.send(()).ok();
            }
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        }
    });
    async move {
        rx.await.ok();
    }
}
