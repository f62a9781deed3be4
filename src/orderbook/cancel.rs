//! The cancellation protocol.

use super::book::InstrumentBook;
use super::order::{Order, Side};
use crate::engine::events::EventSink;
use crate::utils::next_timestamp;
use std::sync::Arc;
use tracing::trace;

impl InstrumentBook {
    /// Cancel `order`, removing it from this book if it is resting.
    ///
    /// Runs under the matching mutex. A cancel lands in exactly one of two
    /// outcomes, both reported through a single `order_deleted` event:
    /// accepted when the order was still available (its remainder is pulled
    /// from the book), rejected when it was already filled or cancelled.
    /// Cancelled and filled are absorbing, so repeated cancels keep
    /// rejecting.
    pub fn cancel(&self, order: &Arc<Order>, events: &dyn EventSink) {
        let mut sides = self.sides.lock();
        let timestamp = next_timestamp();

        if !order.is_available() {
            trace!(
                "Book {}: cancel of order {} rejected, order is {}",
                self.symbol(),
                order.id(),
                if order.is_cancelled() {
                    "already cancelled"
                } else {
                    "fully filled"
                }
            );
            events.order_deleted(order.id(), false, timestamp);
            return;
        }

        order.set_cancelled();
        let removed = match order.side() {
            Side::Buy => sides.bids.remove(order),
            Side::Sell => sides.asks.remove(order),
        };
        trace!(
            "Book {}: cancelled order {} ({} remaining, resting: {})",
            self.symbol(),
            order.id(),
            order.remaining(),
            removed
        );
        events.order_deleted(order.id(), true, timestamp);
    }
}
