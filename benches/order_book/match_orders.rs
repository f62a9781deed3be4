use criterion::Criterion;
use matchbook::{InstrumentBook, Order, RecordingSink, Side, next_timestamp};
use std::hint::black_box;
use std::sync::Arc;

fn new_order(id: u32, price: u64, quantity: u64, side: Side) -> Arc<Order> {
    Arc::new(Order::new(
        id,
        "TEST-SYMBOL",
        price,
        quantity,
        side,
        next_timestamp(),
    ))
}

/// Register all benchmarks for matching against resting liquidity
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("InstrumentBook - Match Orders");

    // One incoming buy sweeping one hundred resting sells
    group.bench_function("sweep_resting_queue", |b| {
        b.iter(|| {
            let book = InstrumentBook::new("TEST-SYMBOL");
            let sink = RecordingSink::new();
            for i in 0..100u32 {
                book.submit(new_order(i, 1_000 + u64::from(i), 1, Side::Sell), &sink);
            }
            let taker = new_order(1_000, 1_100, 100, Side::Buy);
            book.submit(black_box(taker), &sink);
        })
    });

    // Alternating makers and takers at a single price
    group.bench_function("ping_pong_single_level", |b| {
        b.iter(|| {
            let book = InstrumentBook::new("TEST-SYMBOL");
            let sink = RecordingSink::new();
            for i in 0..50u32 {
                book.submit(new_order(i * 2, 1_000, 5, Side::Sell), &sink);
                book.submit(new_order(i * 2 + 1, 1_000, 5, Side::Buy), &sink);
            }
        })
    });

    group.finish();
}
