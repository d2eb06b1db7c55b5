use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::token::resolve_token;

pub const ACCOUNT_ID_VARS: &[&str] = &["HEDERA_ACCOUNT_ID", "OPERATOR_ID", "ACCOUNT_ID"];
pub const PRIVATE_KEY_VARS: &[&str] = &["HEDERA_PRIVATE_KEY", "OPERATOR_KEY", "PRIVATE_KEY"];
pub const NETWORK_VARS: &[&str] = &["HEDERA_NETWORK"];
pub const GATEWAY_URL_VARS: &[&str] = &["LEDGER_GATEWAY_URL"];
pub const GATEWAY_TIMEOUT_VARS: &[&str] = &["LEDGER_GATEWAY_TIMEOUT_MS", "GATEWAY_TIMEOUT_MS"];
pub const RECEIPT_TIMEOUT_VARS: &[&str] = &["RECEIPT_TIMEOUT_MS"];
pub const ORACLE_CONTRACT_VARS: &[&str] = &["ORACLE_CONTRACT_ID", "PRICE_ORACLE_ID"];
pub const AUTOSWAP_CONTRACT_VARS: &[&str] = &["AUTOSWAP_CONTRACT_ID", "AUTO_SWAP_CONTRACT_ID"];
pub const TARGET_TOKEN_VARS: &[&str] = &["AUTOSWAP_TARGET_TOKEN", "TARGET_TOKEN_ADDRESS"];
pub const QUOTE_TOKEN_VARS: &[&str] = &["AUTOSWAP_QUOTE_TOKEN"];
pub const SLIPPAGE_VARS: &[&str] = &["SLIPPAGE_TOLERANCE_PERCENT"];
pub const NEAR_TRIGGER_VARS: &[&str] = &["ALLOW_NEAR_TRIGGER_EXECUTION"];
pub const POLL_INTERVAL_VARS: &[&str] = &["POLL_INTERVAL_MS"];
pub const MAX_GAS_VARS: &[&str] = &["MAX_EXECUTION_GAS"];
pub const QUERY_GAS_VARS: &[&str] = &["QUERY_GAS_LIMIT"];
pub const DRY_RUN_VARS: &[&str] = &["AUTOSWAP_DRY_RUN"];

pub const DEFAULT_ORACLE_CONTRACT_ID: &str = "0.0.6506134";
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:50061";
pub const DEFAULT_NETWORK: &str = "testnet";
pub const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_TARGET_TOKEN: &str = "SAUCE";
pub const DEFAULT_QUOTE_TOKEN: &str = "HBAR";
pub const DEFAULT_SLIPPAGE_TOLERANCE_PERCENT: f64 = 1.0;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_MAX_EXECUTION_GAS: u64 = 5_000_000;
pub const DEFAULT_QUERY_GAS: u64 = 100_000;

pub fn process_env() -> impl Fn(&str) -> Option<String> {
    dotenvy::dotenv().ok();
    |name: &str| std::env::var(name).ok()
}

#[derive(Clone)]
pub struct OperatorCredentials {
    pub account_id: String,
    private_key: String,
}

impl OperatorCredentials {
    pub fn new(account_id: String, private_key: String) -> Self {
        Self {
            account_id,
            private_key,
        }
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for OperatorCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorCredentials")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub gateway_url: String,
    pub network: String,
    pub operator: OperatorCredentials,
    pub request_timeout: Duration,
    pub receipt_timeout: Duration,
}

impl LedgerConfig {
    pub fn from_env(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let account_id = required(env, ACCOUNT_ID_VARS)?;
        let private_key = required(env, PRIVATE_KEY_VARS)?;

        Ok(Self {
            gateway_url: optional(env, GATEWAY_URL_VARS)
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            network: optional(env, NETWORK_VARS).unwrap_or_else(|| DEFAULT_NETWORK.to_string()),
            operator: OperatorCredentials::new(account_id, private_key),
            request_timeout: parse_millis(env, GATEWAY_TIMEOUT_VARS, DEFAULT_GATEWAY_TIMEOUT_MS)?,
            receipt_timeout: parse_millis(env, RECEIPT_TIMEOUT_VARS, DEFAULT_RECEIPT_TIMEOUT_MS)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub ledger: LedgerConfig,
    pub oracle_contract_id: String,
    pub query_gas: u64,
}

impl AdminConfig {
    pub fn from_env(
        env: &impl Fn(&str) -> Option<String>,
        oracle_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let ledger = LedgerConfig::from_env(env)?;
        let oracle_contract_id = oracle_override
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| optional(env, ORACLE_CONTRACT_VARS))
            .unwrap_or_else(|| DEFAULT_ORACLE_CONTRACT_ID.to_string());

        Ok(Self {
            ledger,
            oracle_contract_id,
            query_gas: parse_u64(env, QUERY_GAS_VARS, DEFAULT_QUERY_GAS)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AutoSwapSettings {
    pub autoswap_contract_id: String,
    pub oracle_contract_id: String,
    pub target_token: String,
    pub quote_token: String,
    pub slippage_tolerance_percent: f64,
    pub allow_near_trigger_execution: bool,
    pub poll_interval: Duration,
    pub max_execution_gas: u64,
    pub query_gas: u64,
    pub dry_run: bool,
}

impl AutoSwapSettings {
    pub fn from_env(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let autoswap_contract_id = required(env, AUTOSWAP_CONTRACT_VARS)?;
        let oracle_contract_id = optional(env, ORACLE_CONTRACT_VARS)
            .unwrap_or_else(|| DEFAULT_ORACLE_CONTRACT_ID.to_string());

        let target_token = token_setting(env, TARGET_TOKEN_VARS, DEFAULT_TARGET_TOKEN)?;
        let quote_token = token_setting(env, QUOTE_TOKEN_VARS, DEFAULT_QUOTE_TOKEN)?;

        let slippage_tolerance_percent =
            parse_f64(env, SLIPPAGE_VARS, DEFAULT_SLIPPAGE_TOLERANCE_PERCENT)?;
        if slippage_tolerance_percent < 0.0 {
            return Err(invalid(
                SLIPPAGE_VARS[0],
                &slippage_tolerance_percent.to_string(),
                "must be >= 0",
            ));
        }

        let poll_interval = parse_millis(env, POLL_INTERVAL_VARS, DEFAULT_POLL_INTERVAL_MS)?;

        Ok(Self {
            autoswap_contract_id,
            oracle_contract_id,
            target_token,
            quote_token,
            slippage_tolerance_percent,
            allow_near_trigger_execution: parse_bool(env, NEAR_TRIGGER_VARS, false)?,
            poll_interval,
            max_execution_gas: parse_u64(env, MAX_GAS_VARS, DEFAULT_MAX_EXECUTION_GAS)?,
            query_gas: parse_u64(env, QUERY_GAS_VARS, DEFAULT_QUERY_GAS)?,
            dry_run: parse_bool(env, DRY_RUN_VARS, false)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub ledger: LedgerConfig,
    pub autoswap: AutoSwapSettings,
}

impl ExecutorConfig {
    pub fn from_env(env: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            ledger: LedgerConfig::from_env(env)?,
            autoswap: AutoSwapSettings::from_env(env)?,
        })
    }
}

fn lookup(
    env: &impl Fn(&str) -> Option<String>,
    names: &[&'static str],
) -> Option<(&'static str, String)> {
    names.iter().find_map(|name| {
        env(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|v| (*name, v))
    })
}

fn optional(env: &impl Fn(&str) -> Option<String>, names: &[&'static str]) -> Option<String> {
    lookup(env, names).map(|(_, v)| v)
}

fn required(
    env: &impl Fn(&str) -> Option<String>,
    names: &[&'static str],
) -> Result<String, ConfigError> {
    optional(env, names).ok_or_else(|| ConfigError::Missing {
        names: names.iter().map(|n| n.to_string()).collect(),
    })
}

fn invalid(name: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_u64(
    env: &impl Fn(&str) -> Option<String>,
    names: &[&'static str],
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(env, names) {
        Some((name, raw)) => raw
            .replace('_', "")
            .parse()
            .map_err(|_| invalid(name, &raw, "expected a non-negative integer")),
        None => Ok(default),
    }
}

fn parse_millis(
    env: &impl Fn(&str) -> Option<String>,
    names: &[&'static str],
    default: u64,
) -> Result<Duration, ConfigError> {
    match parse_u64(env, names, default)? {
        0 => {
            let name = lookup(env, names).map_or(names[0], |(name, _)| name);
            Err(invalid(name, "0", "must be > 0"))
        }
        ms => Ok(Duration::from_millis(ms)),
    }
}

fn parse_f64(
    env: &impl Fn(&str) -> Option<String>,
    names: &[&'static str],
    default: f64,
) -> Result<f64, ConfigError> {
    match lookup(env, names) {
        Some((name, raw)) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(invalid(name, &raw, "expected a number")),
        },
        None => Ok(default),
    }
}

fn parse_bool(
    env: &impl Fn(&str) -> Option<String>,
    names: &[&'static str],
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(env, names) {
        Some((name, raw)) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(name, &raw, "expected true or false")),
        },
        None => Ok(default),
    }
}

fn token_setting(
    env: &impl Fn(&str) -> Option<String>,
    names: &[&'static str],
    default: &str,
) -> Result<String, ConfigError> {
    match lookup(env, names) {
        Some((name, raw)) => resolve_token(&raw).map_err(|e| invalid(name, &raw, &e.to_string())),
        None => resolve_token(default).map_err(|e| invalid(names[0], default, &e.to_string())),
    }
}
