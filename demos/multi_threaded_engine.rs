//! Multi-threaded engine driver: several scripted connections trade a small
//! set of instruments against one shared engine, with the event stream
//! written to stdout.

use matchbook::{Command, MatchingEngine, ScriptedSource, Side, StreamSink};
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

// Number of simulated client connections
const CONNECTION_COUNT: usize = 8;
// Orders submitted per connection
const ORDERS_PER_CONNECTION: u32 = 5_000;
// Instruments shared by the connections
const INSTRUMENTS: [&str; 4] = ["AAPL", "MSFT", "GOOG", "AMZN"];

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    info!("Multi-threaded Matching Engine Demo");
    info!("Connections: {}", CONNECTION_COUNT);
    info!("Orders per connection: {}", ORDERS_PER_CONNECTION);

    let sink = Arc::new(StreamSink::new(io::stdout()));
    let engine = Arc::new(MatchingEngine::new(sink));

    let started = Instant::now();
    let handles: Vec<_> = (0..CONNECTION_COUNT)
        .map(|connection| {
            let instrument = INSTRUMENTS[connection % INSTRUMENTS.len()];
            let base = (connection as u32 + 1) * 1_000_000;

            let commands: Vec<Command> = (0..ORDERS_PER_CONNECTION)
                .flat_map(|i| {
                    let side = if (connection + i as usize) % 2 == 0 {
                        Side::Buy
                    } else {
                        Side::Sell
                    };
                    let submit = Command::Submit {
                        side,
                        order_id: base + i,
                        instrument: instrument.to_string(),
                        price: 100 + u64::from(i % 7),
                        quantity: 1 + u64::from(i % 3),
                    };
                    // Cancel every fifth order right after submitting it.
                    if i % 5 == 0 && i > 0 {
                        vec![submit, Command::Cancel { order_id: base + i }]
                    } else {
                        vec![submit]
                    }
                })
                .collect();

            engine.accept(ScriptedSource::new(commands))
        })
        .collect();

    for handle in handles {
        handle.join().expect("connection worker panicked");
    }

    let elapsed = started.elapsed();
    let total_orders = CONNECTION_COUNT as u64 * u64::from(ORDERS_PER_CONNECTION);
    info!(
        "Processed {} orders across {} instruments in {:?} ({:.0} orders/sec)",
        total_orders,
        INSTRUMENTS.len(),
        elapsed,
        total_orders as f64 / elapsed.as_secs_f64()
    );

    for instrument in INSTRUMENTS {
        if let Some(book) = engine.book(instrument) {
            let (bids, asks) = book.depth();
            info!(
                "{}: {} bids / {} asks resting, best bid {:?}, best ask {:?}",
                instrument,
                bids,
                asks,
                book.best_bid(),
                book.best_ask()
            );
        }
    }
}
