//! Per-tick liquidity and "outside" accumulator bookkeeping.
//!
//! Every accumulator stored on a tick describes growth on the side of the
//! tick facing away from the current price. Crossing a tick flips each one
//! to its complement. All subtraction on accumulators wraps, and the wraps
//! cancel out once a range's inside value is taken as a difference.

use crate::FastMap;
use crate::error::PoolError;
use crate::math::liquidity_math::add_delta;
use crate::math::tick_math::{MAX_TICK, MIN_TICK};
use crate::pool::oracle::wrap_160;
use alloy_primitives::U256;

/// State of a single initialized tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickInfo {
    /// Total position liquidity referencing this tick as a boundary.
    pub liquidity_gross: u128,
    /// Liquidity added to the active set when the price crosses this tick
    /// left to right.
    pub liquidity_net: i128,
    /// Fee growth per unit of liquidity on the other side of this tick.
    pub fee_growth_outside_0_x128: U256,
    pub fee_growth_outside_1_x128: U256,
    pub tick_cumulative_outside: i64,
    /// Seconds per unit of liquidity on the other side, 160-bit wrapping.
    pub seconds_per_liquidity_outside_x128: U256,
    pub seconds_outside: u32,
    /// `true` exactly while `liquidity_gross != 0`.
    pub initialized: bool,
}

/// Global accumulator values handed to [`update`] and [`cross`].
#[derive(Copy, Clone, Debug, Default)]
pub struct Accumulators {
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
    pub seconds_per_liquidity_cumulative_x128: U256,
    pub tick_cumulative: i64,
    pub time: u32,
}

/// Maximum liquidity any single tick may reference, chosen so that the
/// sum over every usable tick fits in a `u128`.
pub fn tick_spacing_to_max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

/// Fee growth per unit of liquidity inside `[tick_lower, tick_upper)`.
///
/// Ticks that are not initialized contribute zero outside growth.
pub fn get_fee_growth_inside(
    ticks: &FastMap<i32, TickInfo>,
    tick_lower: i32,
    tick_upper: i32,
    tick_current: i32,
    fee_growth_global_0_x128: U256,
    fee_growth_global_1_x128: U256,
) -> (U256, U256) {
    let lower = ticks.get(&tick_lower).copied().unwrap_or_default();
    let upper = ticks.get(&tick_upper).copied().unwrap_or_default();

    let (below_0, below_1) = if tick_current >= tick_lower {
        (lower.fee_growth_outside_0_x128, lower.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(lower.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(lower.fee_growth_outside_1_x128),
        )
    };

    let (above_0, above_1) = if tick_current < tick_upper {
        (upper.fee_growth_outside_0_x128, upper.fee_growth_outside_1_x128)
    } else {
        (
            fee_growth_global_0_x128.wrapping_sub(upper.fee_growth_outside_0_x128),
            fee_growth_global_1_x128.wrapping_sub(upper.fee_growth_outside_1_x128),
        )
    };

    (
        fee_growth_global_0_x128
            .wrapping_sub(below_0)
            .wrapping_sub(above_0),
        fee_growth_global_1_x128
            .wrapping_sub(below_1)
            .wrapping_sub(above_1),
    )
}

/// Applies a liquidity delta to `tick` as the lower (`upper == false`) or
/// upper boundary of a position, returning whether the tick flipped
/// between initialized and uninitialized.
///
/// A tick initialized at or below the current tick assumes all growth so
/// far happened below it. Fails with `LiquidityOverflow` if gross
/// liquidity would pass `max_liquidity`. The registry is left untouched on
/// failure.
#[allow(clippy::too_many_arguments)]
pub fn update(
    ticks: &mut FastMap<i32, TickInfo>,
    tick: i32,
    tick_current: i32,
    liquidity_delta: i128,
    globals: &Accumulators,
    upper: bool,
    max_liquidity: u128,
) -> Result<bool, PoolError> {
    let mut info = ticks.get(&tick).copied().unwrap_or_default();

    let gross_before = info.liquidity_gross;
    let gross_after = add_delta(gross_before, liquidity_delta)?;
    if gross_after > max_liquidity {
        return Err(PoolError::LiquidityOverflow);
    }

    let flipped = (gross_after == 0) != (gross_before == 0);

    if gross_before == 0 {
        if tick <= tick_current {
            info.fee_growth_outside_0_x128 = globals.fee_growth_global_0_x128;
            info.fee_growth_outside_1_x128 = globals.fee_growth_global_1_x128;
            info.seconds_per_liquidity_outside_x128 =
                globals.seconds_per_liquidity_cumulative_x128;
            info.tick_cumulative_outside = globals.tick_cumulative;
            info.seconds_outside = globals.time;
        }
        info.initialized = true;
    }

    info.liquidity_gross = gross_after;
    // the upper boundary removes liquidity when crossed left to right
    info.liquidity_net = if upper {
        info.liquidity_net.checked_sub(liquidity_delta)
    } else {
        info.liquidity_net.checked_add(liquidity_delta)
    }
    .ok_or(PoolError::LiquidityOverflow)?;

    ticks.insert(tick, info);
    Ok(flipped)
}

/// Removes all data of a tick whose gross liquidity dropped to zero.
pub fn clear(ticks: &mut FastMap<i32, TickInfo>, tick: i32) {
    ticks.remove(&tick);
}

/// Flips every outside accumulator of `tick` as the price moves across
/// it, returning the tick's `liquidity_net`.
///
/// Returns zero for a tick that holds no data.
pub fn cross(ticks: &mut FastMap<i32, TickInfo>, tick: i32, globals: &Accumulators) -> i128 {
    let Some(info) = ticks.get_mut(&tick) else {
        return 0;
    };

    info.fee_growth_outside_0_x128 = globals
        .fee_growth_global_0_x128
        .wrapping_sub(info.fee_growth_outside_0_x128);
    info.fee_growth_outside_1_x128 = globals
        .fee_growth_global_1_x128
        .wrapping_sub(info.fee_growth_outside_1_x128);
    info.seconds_per_liquidity_outside_x128 = wrap_160(
        globals
            .seconds_per_liquidity_cumulative_x128
            .wrapping_sub(info.seconds_per_liquidity_outside_x128),
    );
    info.tick_cumulative_outside = globals
        .tick_cumulative
        .wrapping_sub(info.tick_cumulative_outside);
    info.seconds_outside = globals.time.wrapping_sub(info.seconds_outside);

    info.liquidity_net
}
