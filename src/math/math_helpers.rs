use crate::error::MathError;
use alloy_primitives::U256;

const U256_TWO: U256 = U256::from_limbs([2, 0, 0, 0]);
const U256_THREE: U256 = U256::from_limbs([3, 0, 0, 0]);

/// Computes `floor(a * b / denominator)` with a full 512‑bit intermediate
/// product, returning a `MathError` on overflow or division by zero.
///
/// Fails with `MathError::Overflow` when the true quotient does not fit in
/// 256 bits, even if `a * b` alone would have. Every price and fee
/// computation in the crate routes its wide products through here.
#[inline]
pub fn mul_div(a: U256, b: U256, mut denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }

    // 512-bit product split as prod1 * 2^256 + prod0
    let mm = a.mul_mod(b, U256::MAX);
    let mut prod0 = a.wrapping_mul(b);
    let (mut prod1, borrow) = mm.overflowing_sub(prod0);
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    if prod1.is_zero() {
        return Ok(prod0.wrapping_div(denominator));
    }

    if denominator <= prod1 {
        return Err(MathError::Overflow);
    }

    // make the division exact by subtracting the remainder
    let remainder = a.mul_mod(b, denominator);
    let (low, borrow) = prod0.overflowing_sub(remainder);
    prod0 = low;
    if borrow {
        prod1 = prod1.wrapping_sub(U256::ONE);
    }

    // factor powers of two out of the denominator
    let twos = denominator & denominator.wrapping_neg();
    denominator = denominator.wrapping_div(twos);
    prod0 = prod0.wrapping_div(twos);

    // shift prod1's bits into prod0
    let flip = twos
        .wrapping_neg()
        .wrapping_div(twos)
        .wrapping_add(U256::ONE);
    prod0 |= prod1.wrapping_mul(flip);

    // modular inverse of the now odd denominator, correct to 4 bits, then
    // doubled six times by Newton-Raphson to reach 256 bits
    let mut inv = U256_THREE.wrapping_mul(denominator) ^ U256_TWO;
    for _ in 0..6 {
        inv = inv.wrapping_mul(U256_TWO.wrapping_sub(denominator.wrapping_mul(inv)));
    }

    Ok(prod0.wrapping_mul(inv))
}

/// Like [`mul_div`], but rounds the result up when there is a
/// non‑zero remainder.
///
/// Fails with `MathError::Overflow` if the floored quotient is `U256::MAX`
/// and rounding would push it past the word width.
#[inline]
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let result = mul_div(a, b, denominator)?;

    if a.mul_mod(b, denominator).is_zero() {
        return Ok(result);
    }
    result.checked_add(U256::ONE).ok_or(MathError::Overflow)
}

/// Divides `a` by `b`, rounding up when there is a non‑zero remainder.
///
/// Fails with `MathError::DivisionByZero` when `b` is zero.
#[inline]
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let (quotient, remainder) = a.div_rem(b);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        // quotient < MAX whenever the remainder is non-zero and b > 1
        Ok(quotient.wrapping_add(U256::ONE))
    }
}
