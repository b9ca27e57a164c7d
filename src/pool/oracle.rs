//! Circular buffer of price and liquidity observations.
//!
//! Each observation carries running sums of the tick and of
//! `1 / liquidity` over time, so the average of either over any interval
//! still held in the buffer is a difference of two observations divided by
//! the elapsed seconds. Timestamps are 32-bit and are always compared
//! relative to the current time, which keeps ordering correct across a
//! wraparound of the clock.

use crate::U160_MAX;
use crate::error::PoolError;
use alloy_primitives::U256;

/// Largest number of observations the buffer can hold.
pub const MAX_CARDINALITY: u16 = u16::MAX;

/// Truncates to the 160-bit width of the seconds-per-liquidity accumulators.
#[inline]
pub(crate) fn wrap_160(value: U256) -> U256 {
    value & U160_MAX
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub block_timestamp: u32,
    /// Sum of `tick * elapsed seconds`, wrapping.
    pub tick_cumulative: i64,
    /// Sum of `elapsed seconds << 128 / liquidity`, 160-bit wrapping.
    pub seconds_per_liquidity_cumulative_x128: U256,
    pub initialized: bool,
}

impl Observation {
    /// Extrapolates `self` forward to `time` at a constant tick and
    /// liquidity. Zero liquidity adds nothing to the seconds-per-liquidity
    /// sum.
    fn transform(&self, time: u32, tick: i32, liquidity: u128) -> Self {
        let delta = time.wrapping_sub(self.block_timestamp);
        let per_liquidity = if liquidity == 0 {
            U256::ZERO
        } else {
            (U256::from(delta) << 128usize) / U256::from(liquidity)
        };

        Self {
            block_timestamp: time,
            tick_cumulative: self
                .tick_cumulative
                .wrapping_add((tick as i64).wrapping_mul(delta as i64)),
            seconds_per_liquidity_cumulative_x128: wrap_160(
                self.seconds_per_liquidity_cumulative_x128
                    .wrapping_add(per_liquidity),
            ),
            initialized: true,
        }
    }
}

/// Whether `a` is chronologically at or before `b`, with both assumed to
/// lie within the 2^32 seconds preceding `time`.
fn lte(time: u32, a: u32, b: u32) -> bool {
    if a <= time && b <= time {
        return a <= b;
    }
    let adjusted = |t: u32| {
        if t > time {
            t as u64
        } else {
            t as u64 + (1u64 << 32)
        }
    };
    adjusted(a) <= adjusted(b)
}

/// The observation buffer. Slots past the current cardinality are
/// allocated by [`Oracle::grow`] and stay uninitialized until written.
#[derive(Clone, Debug, Default)]
pub struct Oracle {
    observations: Vec<Observation>,
}

impl Oracle {
    /// Observation stored at `index`, or an empty one if the slot was
    /// never allocated.
    pub fn get(&self, index: u16) -> Observation {
        self.observations
            .get(index as usize)
            .copied()
            .unwrap_or_default()
    }

    fn set(&mut self, index: u16, observation: Observation) {
        let index = index as usize;
        if index >= self.observations.len() {
            self.observations.resize(index + 1, Observation::default());
        }
        self.observations[index] = observation;
    }

    /// Writes the first observation. Returns the initial cardinality and
    /// next cardinality, both one.
    pub fn initialize(&mut self, time: u32) -> (u16, u16) {
        self.observations.clear();
        self.observations.push(Observation {
            block_timestamp: time,
            tick_cumulative: 0,
            seconds_per_liquidity_cumulative_x128: U256::ZERO,
            initialized: true,
        });
        (1, 1)
    }

    /// Appends an observation for the interval since the one at `index`,
    /// during which the pool sat at `tick` with `liquidity` in range.
    ///
    /// At most one observation is written per second. The cardinality
    /// grows to `cardinality_next` when the write index reaches the end of
    /// the populated slots. Returns the new index and cardinality.
    pub fn write(
        &mut self,
        index: u16,
        time: u32,
        tick: i32,
        liquidity: u128,
        cardinality: u16,
        cardinality_next: u16,
    ) -> (u16, u16) {
        let last = self.get(index);
        if last.block_timestamp == time {
            return (index, cardinality);
        }

        let cardinality_updated = if cardinality_next > cardinality && index == cardinality - 1 {
            cardinality_next
        } else {
            cardinality
        };

        let index_updated = ((index as u32 + 1) % cardinality_updated as u32) as u16;
        self.set(index_updated, last.transform(time, tick, liquidity));
        (index_updated, cardinality_updated)
    }

    /// Allocates slots so the buffer can hold `next` observations.
    ///
    /// Placeholders get a non-zero timestamp and stay uninitialized, so
    /// they are never mistaken for real history. Never shrinks.
    pub fn grow(&mut self, current: u16, next: u16) -> Result<u16, PoolError> {
        if current == 0 {
            return Err(PoolError::OracleUninitialized);
        }
        if next <= current {
            return Ok(current);
        }
        for index in current..next {
            if (index as usize) >= self.observations.len() {
                self.set(
                    index,
                    Observation {
                        block_timestamp: 1,
                        ..Observation::default()
                    },
                );
            }
        }
        Ok(next)
    }

    /// Finds the initialized observations immediately at or before and at
    /// or after `target`. Assumes `target` is within the retained range.
    fn binary_search(
        &self,
        time: u32,
        target: u32,
        index: u16,
        cardinality: u16,
    ) -> Result<(Observation, Observation), PoolError> {
        let cardinality = cardinality as usize;
        // oldest observation
        let mut l = (index as usize + 1) % cardinality;
        // newest observation
        let mut r = l + cardinality - 1;

        while l <= r {
            let i = (l + r) / 2;
            let before = self.get((i % cardinality) as u16);

            if !before.initialized {
                l = i + 1;
                continue;
            }

            let at_or_after = self.get(((i + 1) % cardinality) as u16);
            let target_at_or_after = lte(time, before.block_timestamp, target);

            if target_at_or_after && lte(time, target, at_or_after.block_timestamp) {
                return Ok((before, at_or_after));
            }

            if !target_at_or_after {
                r = i.checked_sub(1).ok_or(PoolError::ObservationOutOfRange)?;
            } else {
                l = i + 1;
            }
        }

        Err(PoolError::ObservationOutOfRange)
    }

    /// Observations bracketing `target`. When `target` is newer than the
    /// latest observation, the second element is the latest one
    /// extrapolated to `target`.
    fn get_surrounding_observations(
        &self,
        time: u32,
        target: u32,
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(Observation, Observation), PoolError> {
        let newest = self.get(index);
        if lte(time, newest.block_timestamp, target) {
            if newest.block_timestamp == target {
                return Ok((newest, Observation::default()));
            }
            return Ok((newest, newest.transform(target, tick, liquidity)));
        }

        // the slot after the newest is the oldest once the buffer wrapped
        let mut oldest = self.get(((index as u32 + 1) % cardinality as u32) as u16);
        if !oldest.initialized {
            oldest = self.get(0);
        }

        if !lte(time, oldest.block_timestamp, target) {
            return Err(PoolError::ObservationOutOfRange);
        }

        self.binary_search(time, target, index, cardinality)
    }

    /// Cumulative values as of `seconds_ago` seconds before `time`,
    /// interpolated between the bracketing observations.
    pub fn observe_single(
        &self,
        time: u32,
        seconds_ago: u32,
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(i64, U256), PoolError> {
        if seconds_ago == 0 {
            let mut last = self.get(index);
            if last.block_timestamp != time {
                last = last.transform(time, tick, liquidity);
            }
            return Ok((last.tick_cumulative, last.seconds_per_liquidity_cumulative_x128));
        }

        let target = time.wrapping_sub(seconds_ago);
        let (before, at_or_after) =
            self.get_surrounding_observations(time, target, tick, index, liquidity, cardinality)?;

        if target == before.block_timestamp {
            return Ok((
                before.tick_cumulative,
                before.seconds_per_liquidity_cumulative_x128,
            ));
        }
        if target == at_or_after.block_timestamp {
            return Ok((
                at_or_after.tick_cumulative,
                at_or_after.seconds_per_liquidity_cumulative_x128,
            ));
        }

        let observation_delta = at_or_after.block_timestamp.wrapping_sub(before.block_timestamp);
        let target_delta = target.wrapping_sub(before.block_timestamp);

        let tick_cumulative = before.tick_cumulative.wrapping_add(
            (at_or_after
                .tick_cumulative
                .wrapping_sub(before.tick_cumulative)
                / observation_delta as i64)
                .wrapping_mul(target_delta as i64),
        );

        let spl_delta = wrap_160(
            at_or_after
                .seconds_per_liquidity_cumulative_x128
                .wrapping_sub(before.seconds_per_liquidity_cumulative_x128),
        );
        let seconds_per_liquidity = wrap_160(
            before.seconds_per_liquidity_cumulative_x128.wrapping_add(wrap_160(
                spl_delta * U256::from(target_delta) / U256::from(observation_delta),
            )),
        );

        Ok((tick_cumulative, seconds_per_liquidity))
    }

    /// [`Oracle::observe_single`] for each entry of `seconds_agos`, in
    /// order.
    pub fn observe(
        &self,
        time: u32,
        seconds_agos: &[u32],
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(Vec<i64>, Vec<U256>), PoolError> {
        if cardinality == 0 {
            return Err(PoolError::OracleUninitialized);
        }

        let mut tick_cumulatives = Vec::with_capacity(seconds_agos.len());
        let mut seconds_per_liquidity = Vec::with_capacity(seconds_agos.len());
        for &seconds_ago in seconds_agos {
            let (tc, spl) =
                self.observe_single(time, seconds_ago, tick, index, liquidity, cardinality)?;
            tick_cumulatives.push(tc);
            seconds_per_liquidity.push(spl);
        }
        Ok((tick_cumulatives, seconds_per_liquidity))
    }
}
