//! Execution event stream emitted by the matching protocol.
//!
//! The engine calls the sink while holding the instrument's matching mutex,
//! so per-instrument event order is exactly operation order. A sink must
//! serialize emissions arriving from different instrument locks itself.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One emitted event, in value form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// An order rested on the book
    Added {
        /// Client-scoped order id
        order_id: u32,
        /// Instrument symbol
        instrument: String,
        /// Limit price
        price: u64,
        /// Quantity resting (after any immediate executions)
        quantity: u64,
        /// Whether the order rests on the sell side
        is_sell: bool,
        /// When the order rested
        timestamp: u64,
    },

    /// An active order executed against a resting one
    Executed {
        /// Id of the resting counterparty
        resting_id: u32,
        /// Id of the incoming order
        active_id: u32,
        /// The resting order's execution sequence number, starting at 1
        execution_id: u64,
        /// Execution price (always the resting order's price)
        price: u64,
        /// Quantity exchanged
        quantity: u64,
        /// When the execution happened
        timestamp: u64,
    },

    /// Outcome of a cancel request
    Deleted {
        /// Id named by the cancel
        order_id: u32,
        /// Whether the cancel took effect
        accepted: bool,
        /// When the cancel was decided
        timestamp: u64,
    },
}

/// Consumer of the engine's event stream.
pub trait EventSink: Send + Sync {
    /// An order rested on the book with `quantity` remaining.
    fn order_added(
        &self,
        order_id: u32,
        instrument: &str,
        price: u64,
        quantity: u64,
        is_sell: bool,
        timestamp: u64,
    );

    /// `quantity` traded between an incoming and a resting order at `price`.
    fn order_executed(
        &self,
        resting_id: u32,
        active_id: u32,
        execution_id: u64,
        price: u64,
        quantity: u64,
        timestamp: u64,
    );

    /// A cancel was accepted or rejected.
    fn order_deleted(&self, order_id: u32, accepted: bool, timestamp: u64);
}

/// Sink that retains every event in memory. Test and inspection support.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far, in emission order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Number of events recorded so far.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn order_added(
        &self,
        order_id: u32,
        instrument: &str,
        price: u64,
        quantity: u64,
        is_sell: bool,
        timestamp: u64,
    ) {
        self.events.lock().push(Event::Added {
            order_id,
            instrument: instrument.to_string(),
            price,
            quantity,
            is_sell,
            timestamp,
        });
    }

    fn order_executed(
        &self,
        resting_id: u32,
        active_id: u32,
        execution_id: u64,
        price: u64,
        quantity: u64,
        timestamp: u64,
    ) {
        self.events.lock().push(Event::Executed {
            resting_id,
            active_id,
            execution_id,
            price,
            quantity,
            timestamp,
        });
    }

    fn order_deleted(&self, order_id: u32, accepted: bool, timestamp: u64) {
        self.events.lock().push(Event::Deleted {
            order_id,
            accepted,
            timestamp,
        });
    }
}

/// Line-oriented text sink over any writer. One line per event:
///
/// ```text
/// A <id> <instrument> <price> <quantity> B|S <timestamp>
/// E <resting_id> <active_id> <execution_id> <price> <quantity> <timestamp>
/// X <id> A|R <timestamp>
/// ```
///
/// The writer lock makes emissions from concurrently matching instruments
/// come out whole lines.
pub struct StreamSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> StreamSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> EventSink for StreamSink<W> {
    fn order_added(
        &self,
        order_id: u32,
        instrument: &str,
        price: u64,
        quantity: u64,
        is_sell: bool,
        timestamp: u64,
    ) {
        let side = if is_sell { 'S' } else { 'B' };
        let mut writer = self.writer.lock();
        let _ = writeln!(
            writer,
            "A {} {} {} {} {} {}",
            order_id, instrument, price, quantity, side, timestamp
        );
    }

    fn order_executed(
        &self,
        resting_id: u32,
        active_id: u32,
        execution_id: u64,
        price: u64,
        quantity: u64,
        timestamp: u64,
    ) {
        let mut writer = self.writer.lock();
        let _ = writeln!(
            writer,
            "E {} {} {} {} {} {}",
            resting_id, active_id, execution_id, price, quantity, timestamp
        );
    }

    fn order_deleted(&self, order_id: u32, accepted: bool, timestamp: u64) {
        let outcome = if accepted { 'A' } else { 'R' };
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "X {} {} {}", order_id, outcome, timestamp);
    }
}
