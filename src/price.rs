use alloy_primitives::U256;

use crate::error::PriceError;

pub const PRICE_DECIMALS: usize = 8;

pub const PRICE_SCALE: U256 = U256::from_limbs([100_000_000, 0, 0, 0]);

pub fn decimal_to_scaled(input: &str) -> Result<U256, PriceError> {
    let s = input.trim();
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));

    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(PriceError::InvalidPriceFormat(input.to_string()));
    }

    let mut digits = String::with_capacity(int_part.len() + PRICE_DECIMALS);
    digits.push_str(int_part);
    digits.extend(
        frac_part
            .chars()
            .chain(std::iter::repeat('0'))
            .take(PRICE_DECIMALS),
    );

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10).map_err(|_| PriceError::Overflow(input.to_string()))
}

pub fn scaled_to_decimal_string(value: U256) -> String {
    let whole = value / PRICE_SCALE;
    // < 10^8, so the low limb holds the whole remainder.
    let frac = (value % PRICE_SCALE).as_limbs()[0];
    format!("{whole}.{frac:0width$}", width = PRICE_DECIMALS)
}

pub fn cross_rate(base_usd: U256, quote_usd: U256) -> Result<U256, PriceError> {
    if quote_usd.is_zero() {
        return Err(PriceError::ZeroDenominator);
    }
    let scaled = base_usd
        .checked_mul(PRICE_SCALE)
        .ok_or_else(|| PriceError::Overflow(base_usd.to_string()))?;
    Ok(scaled / quote_usd)
}
