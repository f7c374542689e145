// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Integer amount arithmetic: decimal rescaling and slippage bounds.
//!
//! Amounts never pass through floating point. Both operations multiply first
//! and divide last, truncating the remainder.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::SwapError;

/// Slippage tolerance applied when none is configured (0.5 %).
pub const DEFAULT_SLIPPAGE: Decimal = dec!(0.005);

fn pow10(exp: u8) -> Result<U256, SwapError> {
    U256::from(10u64)
        .checked_pow(U256::from(exp))
        .ok_or_else(|| SwapError::InvalidAmount(format!("10^{exp} does not fit in 256 bits")))
}

/// Re-express `amount` from `from_decimals` to `to_decimals` precision.
///
/// Computes `amount * 10^to / 10^from`. Scaling down and back up loses the
/// truncated digits; scaling up and back down is exact. Fails rather than
/// clamp when the product leaves the 256-bit range.
pub fn rescale(amount: U256, from_decimals: u8, to_decimals: u8) -> Result<U256, SwapError> {
    if from_decimals == to_decimals {
        return Ok(amount);
    }
    let scaled = amount.checked_mul(pow10(to_decimals)?).ok_or_else(|| {
        SwapError::InvalidAmount(format!(
            "{amount} overflows when rescaled from {from_decimals} to {to_decimals} decimals"
        ))
    })?;
    Ok(scaled / pow10(from_decimals)?)
}

/// Check a slippage tolerance is a fraction in `[0, 1)`.
pub fn validate_slippage(slippage: Decimal) -> Result<Decimal, SwapError> {
    if slippage.is_sign_negative() || slippage >= Decimal::ONE {
        return Err(SwapError::Config(format!(
            "slippage must be in [0, 1), got {slippage}"
        )));
    }
    Ok(slippage)
}

/// Smallest acceptable output: `amount * (1 - slippage)`, truncated.
pub fn minimum_amount(amount: U256, slippage: Decimal) -> Result<U256, SwapError> {
    let keep = (Decimal::ONE - slippage).normalize();
    if keep <= Decimal::ZERO {
        return Ok(U256::ZERO);
    }
    if keep >= Decimal::ONE {
        return Ok(amount);
    }
    // keep = mantissa / 10^scale, mantissa positive here.
    let mantissa = U256::from(keep.mantissa().unsigned_abs());
    let scale = U256::from(10u64).pow(U256::from(keep.scale()));
    let product = amount.checked_mul(mantissa).ok_or_else(|| {
        SwapError::InvalidAmount(format!("{amount} overflows applying slippage {slippage}"))
    })?;
    Ok(product / scale)
}
