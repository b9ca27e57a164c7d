//! Concentrated‑liquidity AMM engine for a single trading pair, in pure Rust.
//!
//! This crate exposes:
//! - Low‑level math primitives (`math::*`) for ticks, prices, bitmaps and
//!   single swap steps. These are free functions with no state.
//! - A stateful [`V3Pool`] engine that owns the tick registry, the tick
//!   bitmap, range positions and the oracle ring buffer, and executes
//!   mints, burns, swaps and flash loans against a [`TokenLedger`].
//!
//! # Examples
//!
//! ## Pure math
//! ```no_run
//! use clmm_engine::{math::tick_math, RESOLUTION, U256};
//!
//! let sqrt_price = tick_math::get_sqrt_ratio_at_tick(0).unwrap();
//! assert!(sqrt_price > U256::ZERO);
//! assert_eq!(RESOLUTION, 96);
//! ```
//!
//! ## Running a pool in memory
//! ```no_run
//! use clmm_engine::{
//!     math::tick_math::{get_sqrt_ratio_at_tick, MIN_SQRT_RATIO},
//!     pool::{InMemoryLedger, ManualClock, SwapParams},
//!     Address, PoolConfig, TokenLedger, V3Pool, I256, U256,
//! };
//!
//! let admin = Address::with_last_byte(0xaa);
//! let lp = Address::with_last_byte(0x01);
//! let config = PoolConfig::new(3000, 60, admin).unwrap();
//! let mut pool = V3Pool::new(
//!     Address::with_last_byte(0xf0),
//!     Address::with_last_byte(0x10),
//!     Address::with_last_byte(0x20),
//!     config,
//!     InMemoryLedger::default(),
//!     ManualClock::new(1_000),
//! );
//! pool.initialize(get_sqrt_ratio_at_tick(0).unwrap()).unwrap();
//!
//! let (token0, token1) = (pool.token0, pool.token1);
//! pool.ledger_mut().credit(token0, lp, U256::from(10u64).pow(U256::from(24u64)));
//! pool.ledger_mut().credit(token1, lp, U256::from(10u64).pow(U256::from(24u64)));
//!
//! pool.mint(lp, -600, 600, 10u128.pow(18), &[], |pool, owed0, owed1, _data| {
//!     let to = pool.pool_address;
//!     pool.ledger_mut().transfer(token0, lp, to, owed0)?;
//!     pool.ledger_mut().transfer(token1, lp, to, owed1)?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let params = SwapParams::new(true, I256::try_from(10u64.pow(15)).unwrap(), MIN_SQRT_RATIO + U256::ONE);
//! let result = pool
//!     .swap(lp, params, &[], |pool, amount0, _amount1, _data| {
//!         let to = pool.pool_address;
//!         pool.ledger_mut().transfer(token0, lp, to, amount0.into_raw())?;
//!         Ok(())
//!     })
//!     .unwrap();
//! println!("amount0: {}, amount1: {}", result.amount0_delta, result.amount1_delta);
//! ```

pub use alloy_primitives::{Address, I256, U160, U256};

pub mod config;
pub mod error;
mod hash;
pub mod math;
pub mod pool;

pub use config::PoolConfig;
pub use error::Error;
pub use hash::FastMap;
pub use pool::{TokenLedger, V3Pool};

const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);
const U256_E6: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

/// `2^160 - 1`, the largest value a sqrt price or a seconds‑per‑liquidity
/// accumulator may hold.
pub const U160_MAX: U256 = U256::from_limbs([u64::MAX, u64::MAX, u32::MAX as u64, 0]);

pub const RESOLUTION: u8 = 96;
pub const Q96: U256 = U256::from_limbs([0, 4294967296, 0, 0]);
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

/// Fees are expressed in hundredths of a bip: `1_000_000` is 100%.
pub const FEE_DENOMINATOR: u32 = 1_000_000;
