use crate::math::math_helpers::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::{
    Q96, RESOLUTION, U160_MAX,
    error::{Error, MathError, StateError},
};
use alloy_primitives::{I256, U256};

/// Computes the next sqrt price after adding or removing `amount` of
/// token0, rounding the resulting price up.
///
/// Rounding up keeps the price high enough that the pool never gives out
/// more token1 than the curve allows. Uses `L * P / (L + amount * P)` when
/// the product fits, otherwise the algebraically equal
/// `L / (L / P + amount)`.
pub fn get_next_sqrt_price_from_amount_0_rounding_up(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if amount.is_zero() {
        return Ok(sqrt_p_x96);
    }
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let (product, product_overflowed) = amount.overflowing_mul(sqrt_p_x96);

    if add {
        if !product_overflowed {
            let (denominator, wrapped) = numerator1.overflowing_add(product);
            if !wrapped {
                return Ok(mul_div_rounding_up(numerator1, sqrt_p_x96, denominator)?);
            }
        }
        let denominator = (numerator1 / sqrt_p_x96)
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        Ok(div_rounding_up(numerator1, denominator)?)
    } else {
        // removing token0 is only possible while amount * P < L
        if product_overflowed || numerator1 <= product {
            return Err(StateError::InsufficientReserves.into());
        }
        let next = mul_div_rounding_up(numerator1, sqrt_p_x96, numerator1 - product)?;
        if next > U160_MAX {
            return Err(MathError::Overflow.into());
        }
        Ok(next)
    }
}

/// Computes the next sqrt price after adding or removing `amount` of
/// token1, rounding the resulting price down.
///
/// The price moves by `amount / L` in Q64.96.
pub fn get_next_sqrt_price_from_amount_1_rounding_down(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, Error> {
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }
    let liquidity = U256::from(liquidity);
    if add {
        let quotient = if amount <= U160_MAX {
            (amount << RESOLUTION) / liquidity
        } else {
            mul_div(amount, Q96, liquidity)?
        };

        match sqrt_p_x96.checked_add(quotient) {
            Some(next) if next <= U160_MAX => Ok(next),
            _ => Err(MathError::Overflow.into()),
        }
    } else {
        let quotient = if amount <= U160_MAX {
            div_rounding_up(amount << RESOLUTION, liquidity)?
        } else {
            mul_div_rounding_up(amount, Q96, liquidity)?
        };

        if sqrt_p_x96 <= quotient {
            return Err(StateError::InsufficientReserves.into());
        }
        Ok(sqrt_p_x96 - quotient)
    }
}

/// Amount of token0 between two sqrt prices for `liquidity`, i.e.
/// `L * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)`, rounded up or down.
///
/// The prices may be passed in either order.
pub fn get_amount_0_delta_base(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, Error> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };

    if sqrt_ratio_a_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION;
    let numerator2 = sqrt_ratio_b_x96 - sqrt_ratio_a_x96;

    if round_up {
        Ok(div_rounding_up(
            mul_div_rounding_up(numerator1, numerator2, sqrt_ratio_b_x96)?,
            sqrt_ratio_a_x96,
        )?)
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_ratio_b_x96)? / sqrt_ratio_a_x96)
    }
}

/// Amount of token1 between two sqrt prices for `liquidity`, i.e.
/// `L * (sqrt_b - sqrt_a)`, rounded up or down.
pub fn get_amount_1_delta_base(
    mut sqrt_ratio_a_x96: U256,
    mut sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    };
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    } else {
        mul_div(liquidity, sqrt_ratio_b_x96 - sqrt_ratio_a_x96, Q96)
    }
}

/// Signed token0 delta for a signed liquidity change.
///
/// Adding liquidity (`liquidity >= 0`) rounds the amount owed to the pool
/// up; removing it rounds the amount paid out down and negates it.
pub fn get_amount_0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    let adding = liquidity >= 0;
    let amount = get_amount_0_delta_base(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        adding,
    )?;
    signed_amount(amount, adding)
}

/// Signed token1 delta for a signed liquidity change, rounded the same
/// way as [`get_amount_0_delta`].
pub fn get_amount_1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<I256, Error> {
    let adding = liquidity >= 0;
    let amount = get_amount_1_delta_base(
        sqrt_ratio_a_x96,
        sqrt_ratio_b_x96,
        liquidity.unsigned_abs(),
        adding,
    )?;
    signed_amount(amount, adding)
}

fn signed_amount(amount: U256, positive: bool) -> Result<I256, Error> {
    let amount = I256::try_from(amount).map_err(|_| MathError::Overflow)?;
    Ok(if positive { amount } else { -amount })
}

/// Computes the next sqrt price after `amount_in` enters the pool,
/// choosing the token0 or token1 formula from `zero_for_one`.
///
/// The result never overshoots the target in the direction of the trade.
pub fn get_next_sqrt_price_from_input(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_in, true)
    }
}

/// Computes the next sqrt price after `amount_out` leaves the pool,
/// choosing the token0 or token1 formula from `zero_for_one`.
pub fn get_next_sqrt_price_from_output(
    sqrt_p_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, Error> {
    if sqrt_p_x96.is_zero() {
        return Err(StateError::SqrtPriceIsZero.into());
    }
    if liquidity == 0 {
        return Err(StateError::LiquidityIsZero.into());
    }

    if zero_for_one {
        get_next_sqrt_price_from_amount_1_rounding_down(sqrt_p_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount_0_rounding_up(sqrt_p_x96, liquidity, amount_out, false)
    }
}
