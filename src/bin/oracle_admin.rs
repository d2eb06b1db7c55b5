use alloy_primitives::U256;
use anyhow::{Context as _, Result};
use clap::{ArgGroup, CommandFactory as _, Parser as _, Subcommand};
use oracle_autoswap::config::{AdminConfig, process_env};
use oracle_autoswap::ledger::gateway::GatewayContractClient;
use oracle_autoswap::oracle::{OracleContract, PriceUpdate, parse_pairs};
use oracle_autoswap::price::{decimal_to_scaled, scaled_to_decimal_string};
use oracle_autoswap::token::{parse_account_address, resolve_token, symbol_for};
use serde_json::json;

/// Read and update price oracle state.
#[derive(Debug, clap::Parser)]
#[command(name = "oracle-admin")]
struct Args {
    /// Oracle contract id; overrides ORACLE_CONTRACT_ID.
    #[arg(long, global = true)]
    oracle: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current owner address.
    Owner,
    /// Transfer ownership, then print the new owner.
    #[command(name = "setOwner", visible_alias = "transferOwner")]
    SetOwner {
        #[arg(long)]
        to: String,
    },
    /// Update the price of one token.
    #[command(group(ArgGroup::new("price").required(true).args(["usd", "price_raw"])))]
    Set {
        #[arg(long)]
        token: String,

        /// Decimal USD price, e.g. 0.06123.
        #[arg(long)]
        usd: Option<String>,

        /// Price already scaled to 8 decimals.
        #[arg(long = "priceRaw")]
        price_raw: Option<String>,
    },
    /// Update several prices in one transaction.
    Batch {
        /// "SYM=usd,SYM=usd,..."
        #[arg(long)]
        pairs: String,
    },
    /// Reset every stored price.
    Reset,
    /// Print the stored price of a token.
    Info {
        #[arg(long)]
        token: String,
    },
}

enum Action {
    Owner,
    SetOwner { to: String },
    Set { token: String, price: U256 },
    Batch { updates: Vec<PriceUpdate> },
    Reset,
    Info { token: String },
}

fn validate(command: Command) -> Result<Action> {
    Ok(match command {
        Command::Owner => Action::Owner,
        Command::SetOwner { to } => Action::SetOwner {
            to: parse_account_address(&to)?,
        },
        Command::Set {
            token,
            usd,
            price_raw,
        } => {
            let price = match (usd, price_raw) {
                (Some(usd), None) => decimal_to_scaled(&usd)?,
                (None, Some(raw)) => U256::from_str_radix(raw.trim(), 10).map_err(|_| {
                    anyhow::anyhow!("invalid --priceRaw {raw:?}: expected an integer")
                })?,
                _ => anyhow::bail!("exactly one of --usd or --priceRaw is required"),
            };
            Action::Set {
                token: resolve_token(&token)?,
                price,
            }
        }
        Command::Batch { pairs } => Action::Batch {
            updates: parse_pairs(&pairs)?,
        },
        Command::Reset => Action::Reset,
        Command::Info { token } => Action::Info {
            token: resolve_token(&token)?,
        },
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    oracle_autoswap::logging::init().ok();
    let args = Args::parse();

    let Some(command) = args.command else {
        Args::command().print_help()?;
        println!();
        return Ok(());
    };
    let action = validate(command)?;

    let env = process_env();
    let cfg = AdminConfig::from_env(&env, args.oracle).context("load configuration")?;

    let client = GatewayContractClient::connect(&cfg.ledger).await?;
    let oracle = OracleContract::new(&client, cfg.oracle_contract_id.clone(), cfg.query_gas);
    tracing::debug!(oracle = %oracle.contract_id(), "oracle client ready");

    let out = match action {
        Action::Owner => json!({
          "oracle": oracle.contract_id(),
          "owner": oracle.owner().await?,
        }),
        Action::SetOwner { to } => {
            let receipt = oracle.transfer_ownership(&to).await?;
            json!({
              "transaction": receipt,
              "owner": oracle.owner().await?,
            })
        }
        Action::Set { token, price } => {
            let receipt = oracle.set_price(&token, price).await?;
            let stored = oracle.get_price(&token).await?;
            json!({
              "transaction": receipt,
              "price": price_json(&token, stored),
            })
        }
        Action::Batch { updates } => {
            let receipt = oracle.set_prices(&updates).await?;
            json!({
              "transaction": receipt,
              "updates": updates
                .iter()
                .map(|u| price_json(&u.token, u.price))
                .collect::<Vec<_>>(),
            })
        }
        Action::Reset => {
            let receipt = oracle.reset_prices().await?;
            json!({
              "transaction": receipt,
            })
        }
        Action::Info { token } => price_json(&token, oracle.get_price(&token).await?),
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn price_json(token: &str, price: U256) -> serde_json::Value {
    json!({
      "token": token,
      "symbol": symbol_for(token),
      "price_raw": price.to_string(),
      "price_usd": scaled_to_decimal_string(price),
    })
}
