//! The matching protocol: how an incoming order crosses the opposite side
//! and rests on its own side.

use super::book::{BookSides, InstrumentBook};
use super::order::{Order, Side};
use crate::collections::{Comparator, SkipList};
use crate::engine::events::EventSink;
use crate::utils::next_timestamp;
use std::sync::Arc;
use tracing::trace;

impl InstrumentBook {
    /// Match `order` against the opposite side of this book and rest any
    /// remainder on its own side.
    ///
    /// The whole operation runs under this instrument's matching mutex, so
    /// the sequence of events emitted through `events` is a linearization of
    /// the submits and cancels on this instrument. Each execution happens at
    /// the resting order's price and carries the resting order's execution
    /// sequence number as it was before that execution.
    pub fn submit(&self, order: Arc<Order>, events: &dyn EventSink) {
        trace!(
            "Book {}: submitting order {} {} {} x {}",
            self.symbol(),
            order.id(),
            order.side(),
            order.price(),
            order.remaining()
        );

        let mut sides = self.sides.lock();
        let BookSides { bids, asks } = &mut *sides;
        match order.side() {
            Side::Buy => self.match_and_rest(&order, asks, bids, events),
            Side::Sell => self.match_and_rest(&order, bids, asks, events),
        }
    }

    fn match_and_rest<Opp, Own>(
        &self,
        active: &Arc<Order>,
        opposite: &mut SkipList<Arc<Order>, Opp>,
        own: &mut SkipList<Arc<Order>, Own>,
        events: &dyn EventSink,
    ) where
        Opp: Comparator<Arc<Order>>,
        Own: Comparator<Arc<Order>>,
    {
        while active.is_available() {
            let resting = match opposite.front() {
                Some(order) => Arc::clone(order),
                None => break,
            };
            if !prices_cross(active, &resting) {
                break;
            }

            let quantity = active.remaining().min(resting.remaining());
            let timestamp = next_timestamp();
            active.fill(quantity);
            resting.fill(quantity);
            events.order_executed(
                resting.id(),
                active.id(),
                resting.execution_id(),
                resting.price(),
                quantity,
                timestamp,
            );
            resting.advance_execution_id();

            if resting.remaining() == 0 {
                let removed = opposite.remove(&resting);
                assert!(
                    removed,
                    "exhausted resting order {} missing from book {}",
                    resting.id(),
                    self.symbol()
                );
            }
        }

        if active.is_available() {
            let timestamp = next_timestamp();
            active.set_timestamp(timestamp);
            own.insert(Arc::clone(active));
            events.order_added(
                active.id(),
                self.symbol(),
                active.price(),
                active.remaining(),
                active.side().is_sell(),
                timestamp,
            );
            trace!(
                "Book {}: order {} resting with {} remaining",
                self.symbol(),
                active.id(),
                active.remaining()
            );
        }
    }
}

/// A buy crosses a resting sell at or below its limit; a sell crosses a
/// resting buy at or above its limit.
fn prices_cross(active: &Order, resting: &Order) -> bool {
    match active.side() {
        Side::Buy => active.price() >= resting.price(),
        Side::Sell => active.price() <= resting.price(),
    }
}
