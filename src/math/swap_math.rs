use crate::error::Error;
use crate::math::math_helpers::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount_0_delta_base, get_amount_1_delta_base, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use crate::{FEE_DENOMINATOR, U256_E6};
use alloy_primitives::{I256, U256};

/// Result of a single swap step within one tick range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapStep {
    /// Price after the step, never past the target.
    pub sqrt_ratio_next_x96: U256,
    /// Input consumed by the step, excluding the fee.
    pub amount_in: U256,
    /// Output produced by the step.
    pub amount_out: U256,
    /// Fee charged on the input leg.
    pub fee_amount: U256,
}

/// Computes the result of swapping some amount in or out within a single
/// range of constant liquidity.
///
/// The direction is implied by the target: a target at or below the
/// current price swaps token0 for token1. A positive `amount_remaining` is
/// an exact input (fee included), a negative one an exact output. If the
/// remaining amount cannot reach the target the step stops at the price
/// that exactly exhausts it, and on an exact input that stops early every
/// unused unit is taken as fee. Inputs round up and outputs round down.
pub fn compute_swap_step(
    sqrt_ratio_current_x96: U256,
    sqrt_ratio_target_x96: U256,
    liquidity: u128,
    amount_remaining: I256,
    fee_pips: u32,
) -> Result<SwapStep, Error> {
    let zero_for_one = sqrt_ratio_current_x96 >= sqrt_ratio_target_x96;
    let exact_in = !amount_remaining.is_negative();
    let fee = U256::from(fee_pips);
    let fee_complement = U256::from(FEE_DENOMINATOR - fee_pips);
    let remaining_abs = amount_remaining.unsigned_abs();

    let mut amount_in = U256::ZERO;
    let mut amount_out = U256::ZERO;

    let sqrt_ratio_next_x96 = if exact_in {
        let remaining_less_fee = mul_div(remaining_abs, fee_complement, U256_E6)?;
        amount_in = if zero_for_one {
            get_amount_0_delta_base(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, true)?
        } else {
            get_amount_1_delta_base(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, true)?
        };
        if remaining_less_fee >= amount_in {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_ratio_current_x96,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount_1_delta_base(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, false)?
        } else {
            get_amount_0_delta_base(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, false)?
        };
        if remaining_abs >= amount_out {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_ratio_current_x96,
                liquidity,
                remaining_abs,
                zero_for_one,
            )?
        }
    };

    let reached_target = sqrt_ratio_target_x96 == sqrt_ratio_next_x96;

    // recompute whichever legs the partial step invalidated
    if zero_for_one {
        if !(reached_target && exact_in) {
            amount_in = get_amount_0_delta_base(
                sqrt_ratio_next_x96,
                sqrt_ratio_current_x96,
                liquidity,
                true,
            )?;
        }
        if !(reached_target && !exact_in) {
            amount_out = get_amount_1_delta_base(
                sqrt_ratio_next_x96,
                sqrt_ratio_current_x96,
                liquidity,
                false,
            )?;
        }
    } else {
        if !(reached_target && exact_in) {
            amount_in = get_amount_1_delta_base(
                sqrt_ratio_current_x96,
                sqrt_ratio_next_x96,
                liquidity,
                true,
            )?;
        }
        if !(reached_target && !exact_in) {
            amount_out = get_amount_0_delta_base(
                sqrt_ratio_current_x96,
                sqrt_ratio_next_x96,
                liquidity,
                false,
            )?;
        }
    }

    // output can't exceed the requested exact output
    if !exact_in && amount_out > remaining_abs {
        amount_out = remaining_abs;
    }

    let fee_amount = if exact_in && sqrt_ratio_next_x96 != sqrt_ratio_target_x96 {
        remaining_abs.saturating_sub(amount_in)
    } else {
        mul_div_rounding_up(amount_in, fee, fee_complement)?
    };

    Ok(SwapStep {
        sqrt_ratio_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}
