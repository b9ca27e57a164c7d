use crate::error::PoolError;
use crate::pool::tick::tick_spacing_to_max_liquidity_per_tick;
use crate::FEE_DENOMINATOR;
use alloy_primitives::Address;

/// Largest tick spacing a fee tier may use.
pub const MAX_TICK_SPACING: i32 = 16384;

/// Construction-time parameters of a pool, as handed out by a factory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Swap fee in hundredths of a bip (`3000` = 0.3%).
    pub fee_pips: u32,
    /// Distance between usable ticks.
    pub tick_spacing: i32,
    /// Identity allowed to set and collect protocol fees.
    pub admin: Address,
    /// Cap on `liquidity_gross` of any single tick, derived from `tick_spacing`.
    pub max_liquidity_per_tick: u128,
}

impl PoolConfig {
    /// Validates a fee tier and derives the per-tick liquidity cap.
    ///
    /// `tick_spacing` must lie in `(0, 16384)` and `fee_pips` must be
    /// strictly below `1_000_000`.
    pub fn new(fee_pips: u32, tick_spacing: i32, admin: Address) -> Result<Self, PoolError> {
        if tick_spacing <= 0 || tick_spacing >= MAX_TICK_SPACING {
            return Err(PoolError::InvalidConfig("tick spacing must be in (0, 16384)"));
        }
        if fee_pips >= FEE_DENOMINATOR {
            return Err(PoolError::InvalidConfig("fee must be below 1_000_000 pips"));
        }

        Ok(Self {
            fee_pips,
            tick_spacing,
            admin,
            max_liquidity_per_tick: tick_spacing_to_max_liquidity_per_tick(tick_spacing),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_fee_tiers() {
        let admin = Address::with_last_byte(1);
        for (fee, spacing) in [(100, 1), (500, 10), (3000, 60), (10000, 200)] {
            let config = PoolConfig::new(fee, spacing, admin).unwrap();
            assert_eq!(config.fee_pips, fee);
            assert_eq!(config.tick_spacing, spacing);
            assert_eq!(
                config.max_liquidity_per_tick,
                tick_spacing_to_max_liquidity_per_tick(spacing)
            );
        }
    }

    #[test]
    fn rejects_bad_tick_spacing() {
        let admin = Address::ZERO;
        assert!(matches!(
            PoolConfig::new(3000, 0, admin),
            Err(PoolError::InvalidConfig(_))
        ));
        assert!(matches!(
            PoolConfig::new(3000, -60, admin),
            Err(PoolError::InvalidConfig(_))
        ));
        assert!(matches!(
            PoolConfig::new(3000, 16384, admin),
            Err(PoolError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_fee_of_one_hundred_percent() {
        assert!(matches!(
            PoolConfig::new(1_000_000, 60, Address::ZERO),
            Err(PoolError::InvalidConfig(_))
        ));
        assert!(PoolConfig::new(999_999, 60, Address::ZERO).is_ok());
    }
}
