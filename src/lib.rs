//! # Multi-threaded Limit Order Matching Engine
//!
//! An in-memory, thread-safe limit order matching engine for an exchange-style venue. Clients
//! stream buy, sell and cancel commands for named instruments; the engine matches them against
//! resting orders under per-instrument price-time priority and emits a timestamped stream of
//! add, execution and delete events.
//!
//! ## Key Features
//!
//! - **Per-Instrument Parallelism**: Every instrument owns an independent book guarded by its own
//!   matching mutex, so order flow on disjoint symbols proceeds concurrently without contention.
//!
//! - **Price-Time Priority**: Each book side is a skip list ordered by price, then submission
//!   time, then order id, giving O(log n) insertion, cancellation and best-order lookup.
//!
//! - **Concurrent Instrument Registry**: Books are created on first use inside a bucket-locked
//!   hash map whose resize never blocks operations on unrelated keys, and whose entries stay
//!   referentially stable for the process lifetime.
//!
//! - **Strict Event Ordering**: Within one instrument the emitted event stream is a
//!   linearization of the submits and cancels applied to it, stamped by a strictly increasing
//!   clock that doubles as the price-time tie-breaker.
//!
//! - **Connection Isolation**: One worker thread per client connection with a thread-confined
//!   order registry; an order can only ever be cancelled by the client that submitted it.
//!
//! ## Design Goals
//!
//! 1. **Correctness**: Matching, cancellation and event emission stay consistent under
//!    arbitrary interleavings of connection threads.
//! 2. **Throughput**: Fine-grained locking keeps instruments independent; the hot path takes
//!    exactly one mutex.
//! 3. **Auditability**: Every state change is observable as exactly one event, in operation
//!    order.
//!
//! ## Status
//!
//! This engine is a matching core: connection framing, command parsing and the output transport
//! are supplied by the embedding process.

mod collections;

mod engine;

mod orderbook;

mod utils;

pub use collections::{Comparator, ConcurrentMap, SkipList};
pub use engine::{
    Command, CommandSource, Event, EventSink, MatchingEngine, OrderRegistry, ReadResult,
    RecordingSink, ScriptedSource, StreamSink,
};
pub use orderbook::{
    AskPriority, BidPriority, BookSnapshot, EngineError, InstrumentBook, LevelSnapshot, Order,
    Side,
};
pub use utils::{current_time_millis, next_timestamp};
