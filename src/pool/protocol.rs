use crate::error::{Error, MathError, PoolError};
use crate::math::math_helpers::{mul_div, mul_div_rounding_up};
use crate::pool::settlement::{Clock, TokenLedger};
use crate::pool::v3_pool::V3Pool;
use crate::{Q128, U256_E6};
use alloy_primitives::{Address, U256};
use tracing::info;

/// A protocol fee ratio is either off or takes between 1/10 and 1/4 of
/// the swap fee.
#[inline]
fn valid_fee_protocol(ratio: u8) -> bool {
    ratio == 0 || (4..=10).contains(&ratio)
}

impl<L, C> V3Pool<L, C>
where
    L: TokenLedger + Clone,
    C: Clock,
{
    /// Lends `amount0` and `amount1` to `recipient` for the duration of
    /// `callback`, which receives the fees owed and must repay the loan
    /// plus fees to the pool.
    ///
    /// Anything paid beyond the loan is split between the protocol and
    /// in-range liquidity. Returns the amounts paid on top of the loan.
    pub fn flash<F>(
        &mut self,
        recipient: Address,
        amount0: U256,
        amount1: U256,
        data: &[u8],
        callback: F,
    ) -> Result<(U256, U256), Error>
    where
        F: FnOnce(&mut Self, U256, U256, &[u8]) -> Result<(), Error>,
    {
        self.atomic(|pool| {
            let liquidity = pool.state.liquidity;
            if liquidity == 0 {
                return Err(PoolError::ZeroLiquidity.into());
            }

            let fee = U256::from(pool.config.fee_pips);
            let fee0 = mul_div_rounding_up(amount0, fee, U256_E6)?;
            let fee1 = mul_div_rounding_up(amount1, fee, U256_E6)?;
            let balance0_before = pool.balance0();
            let balance1_before = pool.balance1();

            if !amount0.is_zero() {
                pool.transfer_out(pool.token0, recipient, amount0)?;
            }
            if !amount1.is_zero() {
                pool.transfer_out(pool.token1, recipient, amount1)?;
            }

            callback(pool, fee0, fee1, data)?;

            pool.check_settlement(pool.token0, balance0_before, fee0)?;
            pool.check_settlement(pool.token1, balance1_before, fee1)?;

            // settlement check guarantees these don't underflow
            let paid0 = pool.balance0() - balance0_before;
            let paid1 = pool.balance1() - balance1_before;

            if !paid0.is_zero() {
                let fee_protocol = pool.state.slot0.fee_protocol_0;
                let protocol_share = if fee_protocol == 0 {
                    U256::ZERO
                } else {
                    paid0 / U256::from(fee_protocol)
                };
                pool.state.protocol_fees.token0 = pool
                    .state
                    .protocol_fees
                    .token0
                    .wrapping_add(protocol_share.wrapping_to::<u128>());
                pool.state.fee_growth_global_0_x128 = pool.state.fee_growth_global_0_x128.wrapping_add(
                    mul_div(paid0 - protocol_share, Q128, U256::from(liquidity))?,
                );
            }
            if !paid1.is_zero() {
                let fee_protocol = pool.state.slot0.fee_protocol_1;
                let protocol_share = if fee_protocol == 0 {
                    U256::ZERO
                } else {
                    paid1 / U256::from(fee_protocol)
                };
                pool.state.protocol_fees.token1 = pool
                    .state
                    .protocol_fees
                    .token1
                    .wrapping_add(protocol_share.wrapping_to::<u128>());
                pool.state.fee_growth_global_1_x128 = pool.state.fee_growth_global_1_x128.wrapping_add(
                    mul_div(paid1 - protocol_share, Q128, U256::from(liquidity))?,
                );
            }

            info!(
                pool = %pool.pool_address,
                recipient = %recipient,
                amount0 = %amount0,
                amount1 = %amount1,
                paid0 = %paid0,
                paid1 = %paid1,
                "flash"
            );
            Ok((paid0, paid1))
        })
    }

    /// Sets the share of swap fees taken by the protocol, as the
    /// denominator of the fraction taken (`4` takes a quarter). Admin only.
    pub fn set_fee_protocol(
        &mut self,
        caller: Address,
        fee_protocol_0: u8,
        fee_protocol_1: u8,
    ) -> Result<(), Error> {
        self.atomic(|pool| {
            if caller != pool.config.admin {
                return Err(PoolError::Unauthorized(caller).into());
            }
            if !valid_fee_protocol(fee_protocol_0) || !valid_fee_protocol(fee_protocol_1) {
                return Err(PoolError::InvalidFeeProtocol.into());
            }

            let slot0 = &mut pool.state.slot0;
            let (old0, old1) = (slot0.fee_protocol_0, slot0.fee_protocol_1);
            slot0.fee_protocol_0 = fee_protocol_0;
            slot0.fee_protocol_1 = fee_protocol_1;

            info!(
                pool = %pool.pool_address,
                fee_protocol_0_old = old0,
                fee_protocol_1_old = old1,
                fee_protocol_0,
                fee_protocol_1,
                "set_fee_protocol"
            );
            Ok(())
        })
    }

    /// Pays up to the requested amounts of accrued protocol fees to
    /// `recipient`. Admin only.
    pub fn collect_protocol(
        &mut self,
        caller: Address,
        recipient: Address,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), Error> {
        self.atomic(|pool| {
            if caller != pool.config.admin {
                return Err(PoolError::Unauthorized(caller).into());
            }

            let fees = &mut pool.state.protocol_fees;
            let amount0 = amount0_requested.min(fees.token0);
            let amount1 = amount1_requested.min(fees.token1);
            fees.token0 = fees.token0.checked_sub(amount0).ok_or(MathError::Underflow)?;
            fees.token1 = fees.token1.checked_sub(amount1).ok_or(MathError::Underflow)?;

            if amount0 > 0 {
                pool.transfer_out(pool.token0, recipient, U256::from(amount0))?;
            }
            if amount1 > 0 {
                pool.transfer_out(pool.token1, recipient, U256::from(amount1))?;
            }

            info!(
                pool = %pool.pool_address,
                recipient = %recipient,
                amount0,
                amount1,
                "collect_protocol"
            );
            Ok((amount0, amount1))
        })
    }
}
