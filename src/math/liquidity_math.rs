use crate::error::PoolError;

/// Applies a signed liquidity delta to an unsigned liquidity value.
///
/// Fails with `LiquidityUnderflow` when a negative delta exceeds `x` and
/// with `LiquidityOverflow` when the sum does not fit in 128 bits.
#[inline]
pub fn add_delta(x: u128, y: i128) -> Result<u128, PoolError> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or(PoolError::LiquidityUnderflow)
    } else {
        x.checked_add(y as u128).ok_or(PoolError::LiquidityOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_delta_small_values() {
        assert_eq!(add_delta(1, 0).unwrap(), 1);
        assert_eq!(add_delta(1, -1).unwrap(), 0);
        assert_eq!(add_delta(1, 1).unwrap(), 2);
        assert_eq!(add_delta(100, -20).unwrap(), 80);
    }

    #[test]
    fn add_delta_overflows_past_128_bits() {
        // 2^128 - 15 + 15 = 2^128
        assert!(matches!(
            add_delta(u128::MAX - 14, 15),
            Err(PoolError::LiquidityOverflow)
        ));
        assert_eq!(add_delta(u128::MAX - 14, 14).unwrap(), u128::MAX);
        assert!(matches!(
            add_delta(u128::MAX, i128::MAX),
            Err(PoolError::LiquidityOverflow)
        ));
    }

    #[test]
    fn add_delta_underflows_below_zero() {
        assert!(matches!(add_delta(0, -1), Err(PoolError::LiquidityUnderflow)));
        assert!(matches!(add_delta(3, -4), Err(PoolError::LiquidityUnderflow)));
    }

    #[test]
    fn add_delta_handles_i128_min() {
        let magnitude = i128::MIN.unsigned_abs();
        assert_eq!(add_delta(magnitude, i128::MIN).unwrap(), 0);
        assert!(matches!(
            add_delta(magnitude - 1, i128::MIN),
            Err(PoolError::LiquidityUnderflow)
        ));
    }
}
