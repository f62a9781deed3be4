//! The matching engine and its per-connection command loop.

pub mod commands;
pub mod events;
pub mod registry;

pub use commands::{Command, CommandSource, ReadResult, ScriptedSource};
pub use events::{Event, EventSink, RecordingSink, StreamSink};
pub use registry::OrderRegistry;

use crate::collections::ConcurrentMap;
use crate::orderbook::{EngineError, InstrumentBook, Order, Side};
use crate::utils::next_timestamp;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// Routes client commands to per-instrument books.
///
/// One engine serves every connection of the process. Its only shared state
/// is the symbol → book map and the event sink; everything per-connection
/// (the order registry) stays confined to that connection's worker thread.
pub struct MatchingEngine {
    books: ConcurrentMap<String, InstrumentBook>,
    events: Arc<dyn EventSink>,
}

impl MatchingEngine {
    /// Create an engine emitting into `events`.
    pub fn new(events: Arc<dyn EventSink>) -> Self {
        Self {
            books: ConcurrentMap::new(),
            events,
        }
    }

    /// The book for `instrument`, if any order ever referenced it.
    pub fn book(&self, instrument: &str) -> Option<Arc<InstrumentBook>> {
        self.books.get(instrument)
    }

    /// Number of instruments seen so far.
    pub fn instrument_count(&self) -> usize {
        self.books.len()
    }

    /// Submit a limit order on behalf of one connection.
    ///
    /// Validates the command, stamps and registers the order, then runs the
    /// matching protocol on the instrument's book. The book lookup completes
    /// before the book's mutex is taken, so map locks and the matching mutex
    /// are never held together.
    pub fn submit_order(
        &self,
        registry: &mut OrderRegistry,
        side: Side,
        order_id: u32,
        instrument: &str,
        price: u64,
        quantity: u64,
    ) -> Result<Arc<Order>, EngineError> {
        if price == 0 {
            return Err(EngineError::InvalidPrice(price));
        }
        if quantity == 0 {
            return Err(EngineError::InvalidQuantity(quantity));
        }
        if registry.contains(order_id) {
            return Err(EngineError::DuplicateOrderId(order_id));
        }

        let order = Arc::new(Order::new(
            order_id,
            instrument,
            price,
            quantity,
            side,
            next_timestamp(),
        ));
        registry.insert(Arc::clone(&order));

        let book = self
            .books
            .get_or_insert(instrument.to_string(), || InstrumentBook::new(instrument));
        book.submit(Arc::clone(&order), self.events.as_ref());
        Ok(order)
    }

    /// Cancel an order on behalf of the connection that owns `registry`.
    ///
    /// An id this connection never submitted is rejected without touching
    /// any book: cancels only work from the originating client.
    pub fn cancel_order(&self, registry: &OrderRegistry, order_id: u32) {
        match registry.get(order_id) {
            None => {
                debug!("Cancel of unknown order {} rejected", order_id);
                self.events.order_deleted(order_id, false, next_timestamp());
            }
            Some(order) => {
                let book = self
                    .books
                    .get(order.instrument())
                    .expect("book missing for a registered order");
                book.cancel(order, self.events.as_ref());
            }
        }
    }

    /// Spawn a worker thread running the command loop for one connection.
    pub fn accept<S>(self: &Arc<Self>, source: S) -> JoinHandle<()>
    where
        S: CommandSource + Send + 'static,
    {
        let engine = Arc::clone(self);
        thread::spawn(move || engine.run_connection(source))
    }

    /// The command loop for one connection. Returns when the source reports
    /// end of stream or a read error. Orders left resting at that point stay
    /// in their books and remain matchable.
    pub fn run_connection<S: CommandSource>(&self, mut source: S) {
        let mut registry = OrderRegistry::new();
        loop {
            match source.read_command() {
                ReadResult::EndOfFile => {
                    debug!(
                        "Connection closed after {} submitted orders",
                        registry.len()
                    );
                    return;
                }
                ReadResult::Error => {
                    error!("Error reading client command, dropping connection");
                    return;
                }
                ReadResult::Command(Command::Submit {
                    side,
                    order_id,
                    instrument,
                    price,
                    quantity,
                }) => {
                    if let Err(rejected) =
                        self.submit_order(&mut registry, side, order_id, &instrument, price, quantity)
                    {
                        warn!("Rejected submit of order {}: {}", order_id, rejected);
                    }
                }
                ReadResult::Command(Command::Cancel { order_id }) => {
                    self.cancel_order(&registry, order_id);
                }
            }
        }
    }
}
