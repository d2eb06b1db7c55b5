use std::fmt;

use alloy_primitives::U256;

use super::SwapOrder;

const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Inactive,
    AlreadyExecuted,
    Expired,
    OtherToken,
    BelowTrigger,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Inactive => "inactive",
            SkipReason::AlreadyExecuted => "already executed",
            SkipReason::Expired => "expired",
            SkipReason::OtherToken => "tokenOut is not the target token",
            SkipReason::BelowTrigger => "price below trigger",
        };
        f.write_str(s)
    }
}

pub fn precheck(order: &SwapOrder, now_unix: u64, target_token: &str) -> Result<(), SkipReason> {
    if !order.is_active {
        return Err(SkipReason::Inactive);
    }
    if order.is_executed {
        return Err(SkipReason::AlreadyExecuted);
    }
    if order.expiration_time <= U256::from(now_unix) {
        return Err(SkipReason::Expired);
    }
    if !order.token_out.eq_ignore_ascii_case(target_token) {
        return Err(SkipReason::OtherToken);
    }
    Ok(())
}

pub fn is_within_tolerance(current: U256, trigger: U256, tolerance_percent: f64) -> bool {
    if tolerance_percent <= 0.0 {
        return current >= trigger;
    }

    let bps = ((tolerance_percent * 100.0).round() as u64).min(BPS_DENOMINATOR);
    let factor = U256::from(BPS_DENOMINATOR - bps);
    let denominator = U256::from(BPS_DENOMINATOR);
    let threshold = match trigger.checked_mul(factor) {
        Some(product) => product / denominator,
        None => trigger / denominator * factor,
    };
    current >= threshold
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMatch {
    Met,
    NearTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerPolicy {
    pub allow_near_trigger_execution: bool,
    pub slippage_tolerance_percent: f64,
}

impl TriggerPolicy {
    pub fn evaluate(&self, current: U256, trigger: U256) -> Option<TriggerMatch> {
        if current >= trigger {
            return Some(TriggerMatch::Met);
        }
        if self.allow_near_trigger_execution
            && is_within_tolerance(current, trigger, self.slippage_tolerance_percent)
        {
            return Some(TriggerMatch::NearTrigger);
        }
        None
    }
}
