#![allow(dead_code)]

use clmm_engine::math::{
    bit_math::{least_significant_bit, most_significant_bit},
    math_helpers::{mul_div, mul_div_rounding_up},
    sqrt_price_math::{
        get_amount_0_delta, get_amount_1_delta, get_next_sqrt_price_from_input,
        get_next_sqrt_price_from_output,
    },
    swap_math::compute_swap_step,
    tick_bitmap::{flip_tick, next_initialized_tick_within_one_word},
    tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio},
};
use clmm_engine::pool::{InMemoryLedger, ManualClock, SwapParams};
use clmm_engine::{Address, FastMap, I256, PoolConfig, Q96, TokenLedger, U256, V3Pool};
use criterion::{BatchSize, Criterion, black_box};

pub type BenchPool = V3Pool<InMemoryLedger, ManualClock>;

const TICKS: [i32; 7] = [-887272, -200_000, -60, 0, 60, 200_000, 887272];

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");
    let prices: Vec<U256> = TICKS
        .iter()
        .map(|&t| get_sqrt_ratio_at_tick(t).unwrap())
        .collect();

    group.bench_function("get_sqrt_ratio_at_tick", |b| {
        b.iter(|| {
            for &tick in &TICKS {
                black_box(get_sqrt_ratio_at_tick(black_box(tick)).unwrap());
            }
        })
    });

    group.bench_function("get_tick_at_sqrt_ratio", |b| {
        b.iter(|| {
            // MAX_TICK's price is outside the accepted domain
            for price in &prices[..prices.len() - 1] {
                black_box(get_tick_at_sqrt_ratio(black_box(*price)).unwrap());
            }
        })
    });

    group.finish();
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqrt_price_math");
    let liquidity = 10u128.pow(18);
    let lower = get_sqrt_ratio_at_tick(-600).unwrap();
    let upper = get_sqrt_ratio_at_tick(600).unwrap();

    group.bench_function("get_next_sqrt_price_from_input", |b| {
        b.iter(|| {
            black_box(
                get_next_sqrt_price_from_input(Q96, liquidity, black_box(U256::from(10u64.pow(15))), true)
                    .unwrap(),
            )
        })
    });

    group.bench_function("get_next_sqrt_price_from_output", |b| {
        b.iter(|| {
            black_box(
                get_next_sqrt_price_from_output(Q96, liquidity, black_box(U256::from(10u64.pow(15))), false)
                    .unwrap(),
            )
        })
    });

    group.bench_function("get_amount_deltas", |b| {
        b.iter(|| {
            black_box(get_amount_0_delta(lower, upper, black_box(liquidity as i128)).unwrap());
            black_box(get_amount_1_delta(lower, upper, black_box(-(liquidity as i128))).unwrap());
        })
    });

    group.finish();
}

pub fn bench_swap_math(c: &mut Criterion) {
    let target = get_sqrt_ratio_at_tick(-60).unwrap();
    let amount = I256::try_from(10u64.pow(15)).unwrap();

    c.bench_function("compute_swap_step", |b| {
        b.iter(|| {
            black_box(
                compute_swap_step(Q96, black_box(target), 10u128.pow(18), black_box(amount), 3000)
                    .unwrap(),
            )
        })
    });
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let a = U256::MAX / U256::from(3u8);
    let b = U256::from(10u64.pow(18));
    let d = U256::MAX / U256::from(7u8);

    c.bench_function("mul_div", |bench| {
        bench.iter(|| black_box(mul_div(black_box(a), black_box(b), black_box(d)).unwrap()))
    });
    c.bench_function("mul_div_rounding_up", |bench| {
        bench.iter(|| black_box(mul_div_rounding_up(black_box(a), black_box(b), black_box(d)).unwrap()))
    });
}

pub fn bench_tick_bitmap(c: &mut Criterion) {
    let mut bitmap: FastMap<i16, U256> = FastMap::default();
    for tick in (-6000..=6000).step_by(600) {
        flip_tick(&mut bitmap, tick, 60).unwrap();
    }

    c.bench_function("next_initialized_tick_within_one_word", |b| {
        b.iter(|| {
            black_box(next_initialized_tick_within_one_word(&bitmap, black_box(-30), 60, true).unwrap());
            black_box(next_initialized_tick_within_one_word(&bitmap, black_box(30), 60, false).unwrap());
        })
    });
}

pub fn bench_bit_math(c: &mut Criterion) {
    let x = U256::from(0x0f00_0000_0000u64) << 100usize;
    c.bench_function("bit_scan", |b| {
        b.iter(|| {
            black_box(most_significant_bit(black_box(x)).unwrap());
            black_box(least_significant_bit(black_box(x)).unwrap());
        })
    });
}

/// Pool at tick 0 with a ladder of overlapping positions every 600 ticks.
pub fn build_pool() -> BenchPool {
    let lp = Address::with_last_byte(1);
    let config = PoolConfig::new(3000, 60, Address::ZERO).unwrap();
    let mut pool = V3Pool::new(
        Address::with_last_byte(0xf0),
        Address::with_last_byte(0x10),
        Address::with_last_byte(0x20),
        config,
        InMemoryLedger::default(),
        ManualClock::new(1),
    );
    pool.initialize(Q96).unwrap();

    let (t0, t1) = (pool.token0, pool.token1);
    for token in [t0, t1] {
        pool.ledger_mut().credit(token, lp, U256::MAX >> 8usize);
    }

    for i in 1..=20 {
        pool.mint(lp, -600 * i, 600 * i, 10u128.pow(18), &[], |pool, owed0, owed1, _| {
            let to = pool.pool_address;
            pool.ledger_mut().transfer(t0, lp, to, owed0)?;
            pool.ledger_mut().transfer(t1, lp, to, owed1)?;
            Ok(())
        })
        .unwrap();
    }
    pool
}

pub fn swap_once(pool: &mut BenchPool, zero_for_one: bool, amount: I256, limit: U256) {
    let trader = Address::with_last_byte(1);
    let (t0, t1) = (pool.token0, pool.token1);
    let params = SwapParams::new(zero_for_one, amount, limit);
    pool.swap(trader, params, &[], |pool, amount0, amount1, _| {
        let to = pool.pool_address;
        if amount0.is_positive() {
            pool.ledger_mut().transfer(t0, trader, to, amount0.unsigned_abs())?;
        }
        if amount1.is_positive() {
            pool.ledger_mut().transfer(t1, trader, to, amount1.unsigned_abs())?;
        }
        Ok(())
    })
    .unwrap();
}

pub fn bench_swap(c: &mut Criterion) {
    use clmm_engine::math::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};

    let mut group = c.benchmark_group("swap");
    let pool = build_pool();

    group.bench_function("exact_in_within_range", |b| {
        b.iter_batched(
            || pool.clone(),
            |mut pool| {
                swap_once(
                    &mut pool,
                    true,
                    I256::try_from(10u64.pow(15)).unwrap(),
                    MIN_SQRT_RATIO + U256::ONE,
                )
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("exact_in_crossing_ticks", |b| {
        b.iter_batched(
            || pool.clone(),
            |mut pool| {
                swap_once(
                    &mut pool,
                    false,
                    I256::try_from(10u128.pow(20)).unwrap(),
                    MAX_SQRT_RATIO - U256::ONE,
                )
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}
