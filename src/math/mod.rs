//! Stateless fixed-point math shared by the pool engine.
//!
//! Prices are Q64.96 square roots carried in `U256`; fee growth is Q128.

pub mod bit_math;
pub mod liquidity_math;
pub mod math_helpers;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_bitmap;
pub mod tick_math;
