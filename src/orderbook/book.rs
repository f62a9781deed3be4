//! Core InstrumentBook: the two priority queues of one instrument and the
//! mutex that serializes matching on them.

use super::order::{Order, Side};
use super::snapshot::{BookSnapshot, LevelSnapshot};
use crate::collections::{Comparator, SkipList};
use crate::utils::current_time_millis;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::sync::Arc;

/// Bid ordering: best (highest) price first, then earlier priority
/// timestamp, then lower order id. The id keeps the order total even when
/// two orders carry the same price and timestamp.
#[derive(Debug, Default)]
pub struct BidPriority;

impl Comparator<Arc<Order>> for BidPriority {
    fn compare(&self, a: &Arc<Order>, b: &Arc<Order>) -> Ordering {
        b.price()
            .cmp(&a.price())
            .then_with(|| a.timestamp().cmp(&b.timestamp()))
            .then_with(|| a.id().cmp(&b.id()))
    }
}

/// Ask ordering: best (lowest) price first, then earlier priority timestamp,
/// then lower order id.
#[derive(Debug, Default)]
pub struct AskPriority;

impl Comparator<Arc<Order>> for AskPriority {
    fn compare(&self, a: &Arc<Order>, b: &Arc<Order>) -> Ordering {
        a.price()
            .cmp(&b.price())
            .then_with(|| a.timestamp().cmp(&b.timestamp()))
            .then_with(|| a.id().cmp(&b.id()))
    }
}

/// Both sides of a book. Lives behind the matching mutex, so the skip lists
/// themselves need no synchronization.
pub(super) struct BookSides {
    pub(super) bids: SkipList<Arc<Order>, BidPriority>,
    pub(super) asks: SkipList<Arc<Order>, AskPriority>,
}

/// The book for a single instrument: resting buy and sell orders in
/// price-time priority, plus the mutex that makes submit and cancel on this
/// instrument linearizable. Books for different instruments share nothing,
/// so they match in parallel.
pub struct InstrumentBook {
    symbol: String,
    pub(super) sides: Mutex<BookSides>,
}

impl InstrumentBook {
    /// Create an empty book for the given symbol
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            sides: Mutex::new(BookSides {
                bids: SkipList::new(),
                asks: SkipList::new(),
            }),
        }
    }

    /// Get the symbol of this book
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Get the best bid price, if any
    pub fn best_bid(&self) -> Option<u64> {
        self.sides.lock().bids.front().map(|order| order.price())
    }

    /// Get the best ask price, if any
    pub fn best_ask(&self) -> Option<u64> {
        self.sides.lock().asks.front().map(|order| order.price())
    }

    /// Get the spread (best ask - best bid)
    pub fn spread(&self) -> Option<u64> {
        let sides = self.sides.lock();
        match (sides.bids.front(), sides.asks.front()) {
            (Some(bid), Some(ask)) => Some(ask.price().saturating_sub(bid.price())),
            _ => None,
        }
    }

    /// Get the mid price (average of best bid and best ask)
    pub fn mid_price(&self) -> Option<f64> {
        let sides = self.sides.lock();
        match (sides.bids.front(), sides.asks.front()) {
            (Some(bid), Some(ask)) => Some((bid.price() as f64 + ask.price() as f64) / 2.0),
            _ => None,
        }
    }

    /// Number of resting orders on (bid, ask) sides
    pub fn depth(&self) -> (usize, usize) {
        let sides = self.sides.lock();
        (sides.bids.len(), sides.asks.len())
    }

    /// Whether a specific order is currently resting in this book
    pub fn is_resting(&self, order: &Arc<Order>) -> bool {
        let sides = self.sides.lock();
        match order.side() {
            Side::Buy => sides.bids.contains(order),
            Side::Sell => sides.asks.contains(order),
        }
    }

    /// Create a snapshot of the current book state, aggregated by price and
    /// truncated to `depth` levels per side.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        let sides = self.sides.lock();

        BookSnapshot {
            symbol: self.symbol.clone(),
            timestamp: current_time_millis(),
            bids: aggregate_levels(sides.bids.iter(), depth),
            asks: aggregate_levels(sides.asks.iter(), depth),
        }
    }
}

/// Collapse an ordered order stream into per-price levels, keeping at most
/// `depth` of them.
fn aggregate_levels<'a>(
    orders: impl Iterator<Item = &'a Arc<Order>>,
    depth: usize,
) -> Vec<LevelSnapshot> {
    let mut levels: Vec<LevelSnapshot> = Vec::new();
    for order in orders {
        match levels.last_mut() {
            Some(level) if level.price == order.price() => {
                level.quantity += order.remaining();
                level.order_count += 1;
            }
            _ => {
                if levels.len() == depth {
                    break;
                }
                levels.push(LevelSnapshot {
                    price: order.price(),
                    quantity: order.remaining(),
                    order_count: 1,
                });
            }
        }
    }
    levels
}
