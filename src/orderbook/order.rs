//! The shared order record and its side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Which side of the book an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Buy (bid) side
    Buy,
    /// Sell (ask) side
    Sell,
}

impl Side {
    /// The side this order matches against.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Whether this is the sell side, as reported in add events.
    pub fn is_sell(&self) -> bool {
        matches!(self, Side::Sell)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A limit order, shared between the submitting connection's registry and
/// the book side it rests on.
///
/// Identity fields are immutable. The mutable fields are atomics only so the
/// record can be shared across threads soundly; every mutation happens while
/// the owning instrument's matching mutex is held.
#[derive(Debug)]
pub struct Order {
    order_id: u32,
    instrument: String,
    price: u64,
    side: Side,
    submitted_at: u64,

    /// Priority timestamp: starts at submission time and is re-stamped
    /// immediately before the order rests, so queue position reflects when
    /// the remainder entered the book.
    timestamp: AtomicU64,
    remaining: AtomicU64,
    execution_id: AtomicU64,
    cancelled: AtomicBool,
}

impl Order {
    /// Create a new order with its full quantity remaining.
    pub fn new(
        order_id: u32,
        instrument: &str,
        price: u64,
        quantity: u64,
        side: Side,
        submitted_at: u64,
    ) -> Self {
        Self {
            order_id,
            instrument: instrument.to_string(),
            price,
            side,
            submitted_at,
            timestamp: AtomicU64::new(submitted_at),
            remaining: AtomicU64::new(quantity),
            execution_id: AtomicU64::new(1),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Client-scoped order id.
    pub fn id(&self) -> u32 {
        self.order_id
    }

    /// Symbol this order trades.
    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Limit price.
    pub fn price(&self) -> u64 {
        self.price
    }

    /// Buy or sell.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Timestamp taken when the order was first received.
    pub fn submitted_at(&self) -> u64 {
        self.submitted_at
    }

    /// Current priority timestamp.
    pub fn timestamp(&self) -> u64 {
        self.timestamp.load(Ordering::Acquire)
    }

    /// Re-stamp the priority timestamp. Only valid while the order is not
    /// resting, since the book is ordered by this field.
    pub fn set_timestamp(&self, timestamp: u64) {
        self.timestamp.store(timestamp, Ordering::Release);
    }

    /// Unfilled quantity.
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }

    /// Reduce the unfilled quantity by `quantity`.
    pub fn fill(&self, quantity: u64) {
        debug_assert!(quantity <= self.remaining());
        self.remaining.fetch_sub(quantity, Ordering::AcqRel);
    }

    /// Sequence number of this order's next execution as the resting party.
    /// Starts at 1.
    pub fn execution_id(&self) -> u64 {
        self.execution_id.load(Ordering::Acquire)
    }

    /// Bump the execution sequence after an execution has been reported.
    pub fn advance_execution_id(&self) {
        self.execution_id.fetch_add(1, Ordering::AcqRel);
    }

    /// Whether a cancel has been accepted for this order.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Mark the order cancelled. One-way.
    pub fn set_cancelled(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// An order can match or be cancelled only while it is available:
    /// not cancelled and not fully filled.
    pub fn is_available(&self) -> bool {
        !self.is_cancelled() && self.remaining() > 0
    }
}
