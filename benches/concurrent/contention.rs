use criterion::{BenchmarkId, Criterion};
use matchbook::{Command, MatchingEngine, RecordingSink, ScriptedSource, Side};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

/// Register benchmarks that measure cross-thread contention patterns
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("MatchingEngine - Contention Patterns");

    // All threads on one instrument versus each thread on its own
    for instrument_count in [1usize, 2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::new("instrument_spread", instrument_count),
            instrument_count,
            |b, &instrument_count| {
                b.iter_custom(|iters| measure_engine_throughput(8, iters, instrument_count));
            },
        );
    }

    group.finish();
}

/// Spawns `thread_count` connections submitting `iterations` orders spread
/// over `instrument_count` instruments and measures wall time.
fn measure_engine_throughput(
    thread_count: usize,
    iterations: u64,
    instrument_count: usize,
) -> Duration {
    let sink = Arc::new(RecordingSink::new());
    let engine = Arc::new(MatchingEngine::new(Arc::clone(&sink) as Arc<dyn matchbook::EventSink>));
    let barrier = Arc::new(Barrier::new(thread_count + 1)); // +1 for main thread

    let orders_per_thread = (iterations.max(1) as usize).min(10_000);
    let mut handles = Vec::with_capacity(thread_count);

    for worker in 0..thread_count {
        let engine = Arc::clone(&engine);
        let barrier = Arc::clone(&barrier);
        let instrument = format!("SYM{}", worker % instrument_count);
        let base = (worker as u32 + 1) * 1_000_000;

        handles.push(thread::spawn(move || {
            let commands: Vec<Command> = (0..orders_per_thread as u32)
                .map(|i| Command::Submit {
                    side: if i % 2 == 0 { Side::Sell } else { Side::Buy },
                    order_id: base + i,
                    instrument: instrument.clone(),
                    price: 100 + u64::from(i % 5),
                    quantity: 1,
                })
                .collect();
            let source = ScriptedSource::new(commands);

            barrier.wait();
            engine.run_connection(source);
        }));
    }

    barrier.wait();
    let start = Instant::now();
    for handle in handles {
        handle.join().expect("benchmark thread panicked");
    }
    start.elapsed()
}
