use crate::error::StateError;
use crate::math::bit_math::most_significant_bit;
use alloy_primitives::{I256, U256, uint};

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// `get_sqrt_ratio_at_tick(MIN_TICK)`.
pub const MIN_SQRT_RATIO: U256 = uint!(4295128739_U256);
/// `get_sqrt_ratio_at_tick(MAX_TICK)`.
pub const MAX_SQRT_RATIO: U256 =
    uint!(1461446703485210103287273052203988822378723970342_U256);

/// `sqrt(1.0001)^-1` in Q128.128, applied for bit 0 of `|tick|`.
const SQRT_RATIO_BIT_0: U256 = uint!(0xfffcb933bd6fad37aa2d162d1a594001_U256);

/// `sqrt(1.0001)^-(2^i)` in Q128.128 for bits 1 to 19 of `|tick|`.
const SQRT_RATIO_FACTORS: [U256; 19] = [
    uint!(0xfff97272373d413259a46990580e213a_U256),
    uint!(0xfff2e50f5f656932ef12357cf3c7fdcc_U256),
    uint!(0xffe5caca7e10e4e61c3624eaa0941cd0_U256),
    uint!(0xffcb9843d60f6159c9db58835c926644_U256),
    uint!(0xff973b41fa98c081472e6896dfb254c0_U256),
    uint!(0xff2ea16466c96a3843ec78b326b52861_U256),
    uint!(0xfe5dee046a99a2a811c461f1969c3053_U256),
    uint!(0xfcbe86c7900a88aedcffc83b479aa3a4_U256),
    uint!(0xf987a7253ac413176f2b074cf7815e54_U256),
    uint!(0xf3392b0822b70005940c7a398e4b70f3_U256),
    uint!(0xe7159475a2c29b7443b29c7fa6e889d9_U256),
    uint!(0xd097f3bdfd2022b8845ad8f792aa5825_U256),
    uint!(0xa9f746462d870fdf8a65dc1f90e061e5_U256),
    uint!(0x70d869a156d2a1b890bb3df62baf32f7_U256),
    uint!(0x31be135f97d08fd981231505542fcfa6_U256),
    uint!(0x9aa508b5b7a84e1c677de54f3e99bc9_U256),
    uint!(0x5d6af8dedb81196699c329225ee604_U256),
    uint!(0x2216e584f5fa1ea926041bedfe98_U256),
    uint!(0x48a170391f7dc42444e8fa2_U256),
];

/// `2^64 / log2(sqrt(1.0001))`, converting a Q64.64 log2 into a Q128.128
/// log base `sqrt(1.0001)`.
const LOG_SQRT_10001_MULTIPLIER: U256 = uint!(255738958999603826347141_U256);
/// Error bounds of the log approximation, in Q128.128.
const TICK_LOW_ERROR: U256 = uint!(3402992956809132418596140100660247210_U256);
const TICK_HIGH_ERROR: U256 = uint!(291339464771989622907027621153398088495_U256);

const LOW_32_BITS: u64 = 0xFFFF_FFFF;

/// Returns the sqrt price (Q64.96 fixed‑point) at a given tick index, or
/// `StateError::TickOutOfBounds` if the tick lies outside
/// `[MIN_TICK, MAX_TICK]`.
///
/// The Q128.128 product is always rounded up when narrowed to Q64.96, so
/// `get_tick_at_sqrt_ratio` of the result returns `tick` exactly.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, StateError> {
    let abs_tick = tick.unsigned_abs();

    if abs_tick > MAX_TICK as u32 {
        return Err(StateError::TickOutOfBounds);
    }

    let mut ratio = if abs_tick & 1 != 0 {
        SQRT_RATIO_BIT_0
    } else {
        crate::Q128
    };

    for (bit, factor) in SQRT_RATIO_FACTORS.iter().enumerate() {
        if abs_tick & (2 << bit) != 0 {
            ratio = ratio.wrapping_mul(*factor) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    let round_up = ratio.as_limbs()[0] & LOW_32_BITS != 0;
    Ok((ratio >> 32) + U256::from(round_up as u8))
}

/// Computes the greatest tick whose sqrt price is at or below
/// `sqrt_price_x_96`, failing with `StateError::SqrtPriceOutOfBounds`
/// outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
///
/// Takes the base‑2 log of the price to 14 fractional bits, converts it to
/// a log base `sqrt(1.0001)`, and uses the error bounds to narrow the answer
/// to two candidate ticks before checking the upper one exactly.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x_96: U256) -> Result<i32, StateError> {
    if sqrt_price_x_96 < MIN_SQRT_RATIO || sqrt_price_x_96 >= MAX_SQRT_RATIO {
        return Err(StateError::SqrtPriceOutOfBounds);
    }

    // Q128.128 price
    let ratio = sqrt_price_x_96 << 32;
    let msb = most_significant_bit(ratio).map_err(|_| StateError::SqrtPriceIsZero)? as usize;

    // normalize into [2^127, 2^128)
    let mut r = if msb >= 128 {
        ratio >> (msb - 127)
    } else {
        ratio << (127 - msb)
    };

    // integer part of log2, Q64.64, two's complement
    let mut log_2: U256 = U256::from(msb).wrapping_sub(U256::from(128u8)) << 64;

    for shift in (50..64usize).rev() {
        r = r.wrapping_mul(r) >> 127;
        let f: U256 = r >> 128;
        log_2 |= f << shift;
        if !f.is_zero() {
            r >>= 1;
        }
    }

    let log_sqrt10001 = log_2.wrapping_mul(LOG_SQRT_10001_MULTIPLIER);

    let tick_low = I256::from_raw(log_sqrt10001.wrapping_sub(TICK_LOW_ERROR))
        .asr(128)
        .low_i32();
    let tick_high = I256::from_raw(log_sqrt10001.wrapping_add(TICK_HIGH_ERROR))
        .asr(128)
        .low_i32();

    Ok(if tick_low == tick_high {
        tick_low
    } else if get_sqrt_ratio_at_tick(tick_high)? <= sqrt_price_x_96 {
        tick_high
    } else {
        tick_low
    })
}
