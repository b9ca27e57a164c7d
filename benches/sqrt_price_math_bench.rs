use criterion::{criterion_group, criterion_main};

mod common;

criterion_group!(
    price_movement,
    common::bench_sqrt_price_math,
    common::bench_swap_math,
);
criterion_main!(price_movement);
