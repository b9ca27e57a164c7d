use crate::error::{Error, PoolError};
use crate::math::liquidity_math::add_delta;
use crate::math::sqrt_price_math::{get_amount_0_delta, get_amount_1_delta};
use crate::math::tick_bitmap::flip_tick;
use crate::math::tick_math::{MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick};
use crate::pool::position::{PositionInfo, PositionKey};
use crate::pool::settlement::{Clock, TokenLedger};
use crate::pool::tick::{self, Accumulators};
use crate::pool::v3_pool::V3Pool;
use alloy_primitives::{Address, I256, U256};
use tracing::{debug, info};

/// Validates a position range: ordered, within bounds and aligned to the
/// tick spacing.
pub(crate) fn check_ticks(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<(), PoolError> {
    if tick_lower >= tick_upper || tick_lower < MIN_TICK || tick_upper > MAX_TICK {
        return Err(PoolError::InvalidRange);
    }
    if tick_lower % tick_spacing != 0 {
        return Err(PoolError::TickNotSpaced(tick_lower));
    }
    if tick_upper % tick_spacing != 0 {
        return Err(PoolError::TickNotSpaced(tick_upper));
    }
    Ok(())
}

#[derive(Copy, Clone, Debug)]
struct ModifyPositionParams {
    owner: Address,
    tick_lower: i32,
    tick_upper: i32,
    liquidity_delta: i128,
}

impl<L, C> V3Pool<L, C>
where
    L: TokenLedger + Clone,
    C: Clock,
{
    /// Applies a liquidity delta to a position and returns the signed token
    /// amounts the change is worth: positive amounts are owed to the pool,
    /// negative ones are owed to the owner.
    fn modify_position(
        &mut self,
        params: ModifyPositionParams,
    ) -> Result<(PositionInfo, I256, I256), Error> {
        check_ticks(params.tick_lower, params.tick_upper, self.config.tick_spacing)?;

        let slot0 = self.state.slot0;
        let position = self.update_position(
            params.owner,
            params.tick_lower,
            params.tick_upper,
            params.liquidity_delta,
            slot0.tick,
        )?;

        let mut amount0 = I256::ZERO;
        let mut amount1 = I256::ZERO;

        if params.liquidity_delta != 0 {
            let sqrt_lower = get_sqrt_ratio_at_tick(params.tick_lower)?;
            let sqrt_upper = get_sqrt_ratio_at_tick(params.tick_upper)?;

            if slot0.tick < params.tick_lower {
                // range is above the price, all in token0
                amount0 = get_amount_0_delta(sqrt_lower, sqrt_upper, params.liquidity_delta)?;
            } else if slot0.tick < params.tick_upper {
                let liquidity_before = self.state.liquidity;

                let (index, cardinality) = self.state.oracle.write(
                    slot0.observation_index,
                    self.clock.now(),
                    slot0.tick,
                    liquidity_before,
                    slot0.observation_cardinality,
                    slot0.observation_cardinality_next,
                );
                self.state.slot0.observation_index = index;
                self.state.slot0.observation_cardinality = cardinality;

                amount0 = get_amount_0_delta(
                    slot0.sqrt_price_x96,
                    sqrt_upper,
                    params.liquidity_delta,
                )?;
                amount1 = get_amount_1_delta(
                    sqrt_lower,
                    slot0.sqrt_price_x96,
                    params.liquidity_delta,
                )?;

                self.state.liquidity = add_delta(liquidity_before, params.liquidity_delta)?;
            } else {
                // range is below the price, all in token1
                amount1 = get_amount_1_delta(sqrt_lower, sqrt_upper, params.liquidity_delta)?;
            }
        }

        Ok((position, amount0, amount1))
    }

    /// Updates both boundary ticks and the position itself, accruing fees
    /// earned by the position since its last update.
    fn update_position(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
        tick_current: i32,
    ) -> Result<PositionInfo, Error> {
        let key = PositionKey::new(owner, tick_lower, tick_upper);
        let mut position = self.state.positions.get(&key).copied().unwrap_or_default();

        let mut flipped_lower = false;
        let mut flipped_upper = false;

        if liquidity_delta != 0 {
            let time = self.clock.now();
            let slot0 = self.state.slot0;
            let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
                self.state.oracle.observe_single(
                    time,
                    0,
                    slot0.tick,
                    slot0.observation_index,
                    self.state.liquidity,
                    slot0.observation_cardinality,
                )?;

            let globals = Accumulators {
                fee_growth_global_0_x128: self.state.fee_growth_global_0_x128,
                fee_growth_global_1_x128: self.state.fee_growth_global_1_x128,
                seconds_per_liquidity_cumulative_x128,
                tick_cumulative,
                time,
            };
            let max_liquidity = self.config.max_liquidity_per_tick;

            flipped_lower = tick::update(
                &mut self.state.ticks,
                tick_lower,
                tick_current,
                liquidity_delta,
                &globals,
                false,
                max_liquidity,
            )?;
            flipped_upper = tick::update(
                &mut self.state.ticks,
                tick_upper,
                tick_current,
                liquidity_delta,
                &globals,
                true,
                max_liquidity,
            )?;

            let spacing = self.config.tick_spacing;
            if flipped_lower {
                flip_tick(&mut self.state.bitmap, tick_lower, spacing)?;
            }
            if flipped_upper {
                flip_tick(&mut self.state.bitmap, tick_upper, spacing)?;
            }
        }

        let (fee_growth_inside_0_x128, fee_growth_inside_1_x128) = tick::get_fee_growth_inside(
            &self.state.ticks,
            tick_lower,
            tick_upper,
            tick_current,
            self.state.fee_growth_global_0_x128,
            self.state.fee_growth_global_1_x128,
        );

        position.update(
            liquidity_delta,
            fee_growth_inside_0_x128,
            fee_growth_inside_1_x128,
        )?;
        self.state.positions.insert(key, position);

        // a tick that flipped while removing liquidity is no longer referenced
        if liquidity_delta < 0 {
            if flipped_lower {
                tick::clear(&mut self.state.ticks, tick_lower);
            }
            if flipped_upper {
                tick::clear(&mut self.state.ticks, tick_upper);
            }
        }

        Ok(position)
    }

    /// Adds `amount` of liquidity to `owner`'s position in
    /// `[tick_lower, tick_upper)`.
    ///
    /// `callback` receives the token amounts owed and must pay them to the
    /// pool through the ledger before returning. Returns the amounts owed.
    pub fn mint<F>(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        data: &[u8],
        callback: F,
    ) -> Result<(U256, U256), Error>
    where
        F: FnOnce(&mut Self, U256, U256, &[u8]) -> Result<(), Error>,
    {
        self.atomic(|pool| {
            if amount == 0 {
                return Err(PoolError::ZeroAmount.into());
            }
            let liquidity_delta = i128::try_from(amount).map_err(|_| PoolError::LiquidityOverflow)?;

            let (_, amount0_int, amount1_int) = pool.modify_position(ModifyPositionParams {
                owner,
                tick_lower,
                tick_upper,
                liquidity_delta,
            })?;

            // adding liquidity never pays out
            let amount0 = amount0_int.unsigned_abs();
            let amount1 = amount1_int.unsigned_abs();

            let balance0_before = if amount0.is_zero() { U256::ZERO } else { pool.balance0() };
            let balance1_before = if amount1.is_zero() { U256::ZERO } else { pool.balance1() };

            callback(pool, amount0, amount1, data)?;

            if !amount0.is_zero() {
                pool.check_settlement(pool.token0, balance0_before, amount0)?;
            }
            if !amount1.is_zero() {
                pool.check_settlement(pool.token1, balance1_before, amount1)?;
            }

            info!(
                pool = %pool.pool_address,
                owner = %owner,
                tick_lower,
                tick_upper,
                amount,
                amount0 = %amount0,
                amount1 = %amount1,
                "mint"
            );
            Ok((amount0, amount1))
        })
    }

    /// Removes `amount` of liquidity from `owner`'s position. The released
    /// tokens are credited to the position's owed balances and leave the
    /// pool only through [`V3Pool::collect`].
    ///
    /// Burning zero refreshes the fees owed to a position that still holds
    /// liquidity.
    pub fn burn(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), Error> {
        self.atomic(|pool| {
            let liquidity_delta = i128::try_from(amount)
                .map_err(|_| PoolError::LiquidityUnderflow)?
                .checked_neg()
                .ok_or(PoolError::LiquidityUnderflow)?;

            let (_, amount0_int, amount1_int) = pool.modify_position(ModifyPositionParams {
                owner,
                tick_lower,
                tick_upper,
                liquidity_delta,
            })?;

            let amount0 = amount0_int.unsigned_abs();
            let amount1 = amount1_int.unsigned_abs();

            if !amount0.is_zero() || !amount1.is_zero() {
                let key = PositionKey::new(owner, tick_lower, tick_upper);
                if let Some(position) = pool.state.positions.get_mut(&key) {
                    position.tokens_owed_0 = position
                        .tokens_owed_0
                        .wrapping_add(amount0.wrapping_to::<u128>());
                    position.tokens_owed_1 = position
                        .tokens_owed_1
                        .wrapping_add(amount1.wrapping_to::<u128>());
                }
            }

            info!(
                pool = %pool.pool_address,
                owner = %owner,
                tick_lower,
                tick_upper,
                amount,
                amount0 = %amount0,
                amount1 = %amount1,
                "burn"
            );
            Ok((amount0, amount1))
        })
    }

    /// Pays out up to the requested amounts of `owner`'s owed tokens to
    /// `recipient`. Does not accrue fees; burn zero first to refresh them.
    pub fn collect(
        &mut self,
        owner: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), Error> {
        self.atomic(|pool| {
            let key = PositionKey::new(owner, tick_lower, tick_upper);
            let Some(position) = pool.state.positions.get_mut(&key) else {
                debug!(owner = %owner, tick_lower, tick_upper, "collect on unknown position");
                return Ok((0, 0));
            };

            let amount0 = amount0_requested.min(position.tokens_owed_0);
            let amount1 = amount1_requested.min(position.tokens_owed_1);
            position.tokens_owed_0 -= amount0;
            position.tokens_owed_1 -= amount1;

            if amount0 > 0 {
                pool.transfer_out(pool.token0, recipient, U256::from(amount0))?;
            }
            if amount1 > 0 {
                pool.transfer_out(pool.token1, recipient, U256::from(amount1))?;
            }

            info!(
                pool = %pool.pool_address,
                owner = %owner,
                recipient = %recipient,
                tick_lower,
                tick_upper,
                amount0,
                amount1,
                "collect"
            );
            Ok((amount0, amount1))
        })
    }
}
