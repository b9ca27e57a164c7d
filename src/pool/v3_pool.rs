use crate::FastMap;
use crate::config::PoolConfig;
use crate::error::{Error, MathError, PoolError};
use crate::math::tick_math::get_tick_at_sqrt_ratio;
use crate::pool::liquidity::check_ticks;
use crate::pool::oracle::{Observation, Oracle, wrap_160};
use crate::pool::position::{PositionInfo, PositionKey};
use crate::pool::settlement::{Clock, InMemoryLedger, SystemClock, TokenLedger};
use crate::pool::tick::TickInfo;
use alloy_primitives::{Address, U160, U256};
use tracing::{debug, info};

/// Price, tick and oracle bookkeeping of a pool.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot0 {
    /// Current sqrt price, Q64.96. Zero until the pool is initialized.
    pub sqrt_price_x96: U256,
    /// Greatest tick whose sqrt price is at or below `sqrt_price_x96`.
    pub tick: i32,
    /// Slot of the most recent oracle observation.
    pub observation_index: u16,
    /// Number of populated oracle slots.
    pub observation_cardinality: u16,
    /// Number of oracle slots that will be populated as writes come in.
    pub observation_cardinality_next: u16,
    /// Denominator of the protocol's share of token0 swap fees, 0 if off.
    pub fee_protocol_0: u8,
    pub fee_protocol_1: u8,
    /// Cleared for the duration of every mutating operation.
    pub unlocked: bool,
}

/// Protocol fees accrued and not yet collected.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolFees {
    pub token0: u128,
    pub token1: u128,
}

/// Everything a failed operation must roll back.
#[derive(Clone, Debug, Default)]
pub(crate) struct PoolState {
    pub(crate) slot0: Slot0,
    pub(crate) liquidity: u128,
    pub(crate) fee_growth_global_0_x128: U256,
    pub(crate) fee_growth_global_1_x128: U256,
    pub(crate) protocol_fees: ProtocolFees,
    pub(crate) ticks: FastMap<i32, TickInfo>,
    pub(crate) bitmap: FastMap<i16, U256>,
    pub(crate) positions: FastMap<PositionKey, PositionInfo>,
    pub(crate) oracle: Oracle,
}

/// Converts an `Address` into its `U160` numeric representation.
#[inline(always)]
pub fn address_to_u160(address: Address) -> U160 {
    address.into()
}

/// Returns the token pair sorted by numeric address, giving the canonical
/// `(token0, token1)` ordering regardless of input order.
pub fn sort_tokens(token_a: Address, token_b: Address) -> (Address, Address) {
    if address_to_u160(token_a) < address_to_u160(token_b) {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

/// A concentrated-liquidity pool for one token pair.
///
/// The pool owns its ticks, bitmap, positions and oracle, and settles
/// with the outside world through a [`TokenLedger`] under its own
/// `pool_address`. Every mutating operation is atomic: on error the pool
/// state and the ledger are restored to what they were before the call.
/// Mutating operations invoked from inside a settlement callback fail with
/// [`PoolError::Locked`].
#[derive(Clone, Debug)]
pub struct V3Pool<L = InMemoryLedger, C = SystemClock> {
    pub pool_address: Address,
    pub token0: Address,
    pub token1: Address,
    pub(crate) config: PoolConfig,
    pub(crate) state: PoolState,
    pub(crate) ledger: L,
    pub(crate) clock: C,
}

impl<L, C> V3Pool<L, C>
where
    L: TokenLedger + Clone,
    C: Clock,
{
    /// Creates an uninitialized pool. The tokens are sorted, so either
    /// order may be passed.
    pub fn new(
        pool_address: Address,
        token_a: Address,
        token_b: Address,
        config: PoolConfig,
        ledger: L,
        clock: C,
    ) -> Self {
        let (token0, token1) = sort_tokens(token_a, token_b);

        Self {
            pool_address,
            token0,
            token1,
            config,
            state: PoolState::default(),
            ledger,
            clock,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the ledger, used by settlement callbacks to pay
    /// the pool and by callers to fund accounts.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Sets the starting price and writes the first oracle observation.
    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<(), Error> {
        if !self.state.slot0.sqrt_price_x96.is_zero() {
            return Err(PoolError::AlreadyInitialized.into());
        }

        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;
        let (cardinality, cardinality_next) = self.state.oracle.initialize(self.clock.now());

        self.state.slot0 = Slot0 {
            sqrt_price_x96,
            tick,
            observation_index: 0,
            observation_cardinality: cardinality,
            observation_cardinality_next: cardinality_next,
            fee_protocol_0: 0,
            fee_protocol_1: 0,
            unlocked: true,
        };

        info!(pool = %self.pool_address, sqrt_price_x96 = %sqrt_price_x96, tick, "initialize");
        Ok(())
    }

    /// Runs `op` holding the pool lock, restoring the pool state and the
    /// ledger if it fails.
    pub(crate) fn atomic<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.state.slot0.sqrt_price_x96.is_zero() {
            return Err(PoolError::NotInitialized.into());
        }
        if !self.state.slot0.unlocked {
            return Err(PoolError::Locked.into());
        }

        let state = self.state.clone();
        let ledger = self.ledger.clone();
        self.state.slot0.unlocked = false;

        match op(self) {
            Ok(value) => {
                self.state.slot0.unlocked = true;
                Ok(value)
            }
            Err(err) => {
                debug!(pool = %self.pool_address, error = %err, "rolling back");
                self.state = state;
                self.ledger = ledger;
                Err(err)
            }
        }
    }

    // ---------------- read-only queries ----------------

    pub fn slot0(&self) -> Slot0 {
        self.state.slot0
    }

    /// Liquidity active at the current tick.
    pub fn liquidity(&self) -> u128 {
        self.state.liquidity
    }

    pub fn fee_growth_global(&self) -> (U256, U256) {
        (
            self.state.fee_growth_global_0_x128,
            self.state.fee_growth_global_1_x128,
        )
    }

    pub fn protocol_fees(&self) -> ProtocolFees {
        self.state.protocol_fees
    }

    /// Data of an initialized tick.
    pub fn tick(&self, tick: i32) -> Option<TickInfo> {
        self.state.ticks.get(&tick).copied()
    }

    pub fn tick_bitmap_word(&self, word: i16) -> U256 {
        crate::math::tick_bitmap::get_word(&self.state.bitmap, word)
    }

    pub fn position(&self, owner: Address, tick_lower: i32, tick_upper: i32) -> Option<PositionInfo> {
        self.state
            .positions
            .get(&PositionKey::new(owner, tick_lower, tick_upper))
            .copied()
    }

    pub fn observation(&self, index: u16) -> Observation {
        self.state.oracle.get(index)
    }

    /// Tick and seconds-per-liquidity cumulatives as of each of
    /// `seconds_agos` seconds ago, in the order given.
    pub fn observe(&self, seconds_agos: &[u32]) -> Result<(Vec<i64>, Vec<U256>), Error> {
        let slot0 = self.state.slot0;
        Ok(self.state.oracle.observe(
            self.clock.now(),
            seconds_agos,
            slot0.tick,
            slot0.observation_index,
            self.state.liquidity,
            slot0.observation_cardinality,
        )?)
    }

    /// Tick cumulative, seconds-per-liquidity and seconds spent inside a
    /// range. Only differences between two snapshots of the same range
    /// are meaningful, and only while the range stays initialized.
    pub fn snapshot_cumulatives_inside(
        &self,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<(i64, U256, u32), Error> {
        check_ticks(tick_lower, tick_upper, self.config.tick_spacing)?;

        let lower = self
            .tick(tick_lower)
            .filter(|info| info.initialized)
            .ok_or(PoolError::TickNotInitialized(tick_lower))?;
        let upper = self
            .tick(tick_upper)
            .filter(|info| info.initialized)
            .ok_or(PoolError::TickNotInitialized(tick_upper))?;

        let slot0 = self.state.slot0;

        if slot0.tick < tick_lower {
            Ok((
                lower
                    .tick_cumulative_outside
                    .wrapping_sub(upper.tick_cumulative_outside),
                wrap_160(
                    lower
                        .seconds_per_liquidity_outside_x128
                        .wrapping_sub(upper.seconds_per_liquidity_outside_x128),
                ),
                lower.seconds_outside.wrapping_sub(upper.seconds_outside),
            ))
        } else if slot0.tick < tick_upper {
            let time = self.clock.now();
            let (tick_cumulative, seconds_per_liquidity) = self.state.oracle.observe_single(
                time,
                0,
                slot0.tick,
                slot0.observation_index,
                self.state.liquidity,
                slot0.observation_cardinality,
            )?;
            Ok((
                tick_cumulative
                    .wrapping_sub(lower.tick_cumulative_outside)
                    .wrapping_sub(upper.tick_cumulative_outside),
                wrap_160(
                    seconds_per_liquidity
                        .wrapping_sub(lower.seconds_per_liquidity_outside_x128)
                        .wrapping_sub(upper.seconds_per_liquidity_outside_x128),
                ),
                time.wrapping_sub(lower.seconds_outside)
                    .wrapping_sub(upper.seconds_outside),
            ))
        } else {
            Ok((
                upper
                    .tick_cumulative_outside
                    .wrapping_sub(lower.tick_cumulative_outside),
                wrap_160(
                    upper
                        .seconds_per_liquidity_outside_x128
                        .wrapping_sub(lower.seconds_per_liquidity_outside_x128),
                ),
                upper.seconds_outside.wrapping_sub(lower.seconds_outside),
            ))
        }
    }

    // ---------------- oracle administration ----------------

    /// Grows the oracle so it will hold up to `observation_cardinality_next`
    /// observations. Returns the previous and the new target.
    pub fn increase_observation_cardinality_next(
        &mut self,
        observation_cardinality_next: u16,
    ) -> Result<(u16, u16), Error> {
        self.atomic(|pool| {
            let old = pool.state.slot0.observation_cardinality_next;
            let new = pool.state.oracle.grow(old, observation_cardinality_next)?;
            pool.state.slot0.observation_cardinality_next = new;
            if old != new {
                info!(
                    pool = %pool.pool_address,
                    observation_cardinality_next_old = old,
                    observation_cardinality_next_new = new,
                    "increase_observation_cardinality_next"
                );
            }
            Ok((old, new))
        })
    }

    // ---------------- settlement helpers ----------------

    pub(crate) fn balance0(&self) -> U256 {
        self.ledger.balance_of(self.token0, self.pool_address)
    }

    pub(crate) fn balance1(&self) -> U256 {
        self.ledger.balance_of(self.token1, self.pool_address)
    }

    /// Pays `amount` of `token` from the pool to `to`.
    pub(crate) fn transfer_out(&mut self, token: Address, to: Address, amount: U256) -> Result<(), Error> {
        self.ledger
            .transfer(token, self.pool_address, to, amount)
            .map_err(|err| {
                debug!(token = %token, to = %to, amount = %amount, error = %err, "transfer out failed");
                PoolError::TransferFailed { token }
            })?;
        Ok(())
    }

    /// Requires the pool's balance of `token` to have grown by at least
    /// `owed` since `balance_before` was read.
    pub(crate) fn check_settlement(
        &self,
        token: Address,
        balance_before: U256,
        owed: U256,
    ) -> Result<(), Error> {
        let required = balance_before
            .checked_add(owed)
            .ok_or(MathError::Overflow)?;
        if self.ledger.balance_of(token, self.pool_address) < required {
            return Err(PoolError::InsufficientSettlement { token }.into());
        }
        Ok(())
    }
}
