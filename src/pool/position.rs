use crate::Q128;
use crate::error::{Error, PoolError};
use crate::math::liquidity_math::add_delta;
use crate::math::math_helpers::mul_div;
use alloy_primitives::{Address, U256};

/// Identity of a range position: one owner may hold one position per
/// `(tick_lower, tick_upper)` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionKey {
    pub fn new(owner: Address, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            owner,
            tick_lower,
            tick_upper,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionInfo {
    pub liquidity: u128,
    /// Fee growth inside the range as of the last update.
    pub fee_growth_inside_0_last_x128: U256,
    pub fee_growth_inside_1_last_x128: U256,
    /// Fees and released principal waiting to be collected.
    pub tokens_owed_0: u128,
    pub tokens_owed_1: u128,
}

impl PositionInfo {
    /// Applies a liquidity delta and accrues fees earned since the last
    /// update at the position's old liquidity.
    ///
    /// A zero delta only accrues fees, and fails with `EmptyPosition` when
    /// the position holds no liquidity. Accrued amounts are truncated to
    /// 128 bits and added to the owed balances with wrapping; owners are
    /// expected to collect well before either could overflow.
    pub fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<(), Error> {
        let liquidity_next = if liquidity_delta == 0 {
            if self.liquidity == 0 {
                return Err(PoolError::EmptyPosition.into());
            }
            self.liquidity
        } else {
            add_delta(self.liquidity, liquidity_delta)?
        };

        let owed_0 = accrued(
            fee_growth_inside_0_x128,
            self.fee_growth_inside_0_last_x128,
            self.liquidity,
        )?;
        let owed_1 = accrued(
            fee_growth_inside_1_x128,
            self.fee_growth_inside_1_last_x128,
            self.liquidity,
        )?;

        self.liquidity = liquidity_next;
        self.fee_growth_inside_0_last_x128 = fee_growth_inside_0_x128;
        self.fee_growth_inside_1_last_x128 = fee_growth_inside_1_x128;
        if owed_0 > 0 || owed_1 > 0 {
            self.tokens_owed_0 = self.tokens_owed_0.wrapping_add(owed_0);
            self.tokens_owed_1 = self.tokens_owed_1.wrapping_add(owed_1);
        }
        Ok(())
    }
}

#[inline]
fn accrued(inside: U256, last: U256, liquidity: u128) -> Result<u128, Error> {
    let growth = inside.wrapping_sub(last);
    Ok(mul_div(growth, U256::from(liquidity), Q128)?.wrapping_to::<u128>())
}
