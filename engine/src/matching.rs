//! The matching core: crossing algorithm, book mutation, and emission
//! timing (§4.4).

use tracing::{debug, trace};

use crate::book::AggregatedBook;
use crate::error::EngineError;
use crate::nbbo::NbboSnapshot;
use crate::order::{Order, Side};
use crate::queue::{AskKey, BidKey, OrderQueue};
use crate::trade::Trade;
use crate::validity::ValidityIndex;

/// Owns both sides of the book for one symbol and drives the crossing
/// algorithm and emission timing described in §4.4.
///
/// This is the only type in the crate that mutates the book; every other
/// module (`book`, `queue`, `validity`) exposes primitives this type
/// composes. There is exactly one instance per symbol, used from a single
/// thread, in strict event-arrival order (§5).
#[derive(Debug, Default)]
pub struct MatchingEngine {
    bids: OrderQueue<BidKey>,
    asks: OrderQueue<AskKey>,
    bid_book: AggregatedBook,
    ask_book: AggregatedBook,
    validity: ValidityIndex,
    next_arrival_seq: u64,
}

impl MatchingEngine {
    /// A fresh engine with both books empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one insert event (§4.4.1).
    ///
    /// Returns the trades produced by crossing, in occurrence order, and the
    /// single terminal NBBO snapshot. Fails if `id` is already live or if
    /// `price`/`size` is non-positive; neither mutates any state.
    pub fn process_insert(
        &mut self,
        time: u64,
        id: u64,
        side: Side,
        price: u64,
        size: u64,
    ) -> Result<(Vec<Trade>, NbboSnapshot), EngineError> {
        if price == 0 {
            return Err(EngineError::InvalidOrder {
                id,
                reason: "price must be positive",
            });
        }
        if size == 0 {
            return Err(EngineError::InvalidOrder {
                id,
                reason: "size must be positive",
            });
        }
        if self.validity.is_live(id) {
            return Err(EngineError::DuplicateOrderId { id });
        }

        let arrival_seq = self.next_arrival_seq;
        self.next_arrival_seq += 1;

        let mut incoming = Order {
            arrival_seq,
            time,
            id,
            side,
            price,
            size,
        };
        trace!(?incoming, "insert");

        self.validity.insert(id, side, price, size);
        match side {
            Side::Buy => self.bid_book.add(price, size),
            Side::Sell => self.ask_book.add(price, size),
        }

        let mut trades = Vec::new();
        match side {
            Side::Buy => self.cross_buy(&mut incoming, &mut trades),
            Side::Sell => self.cross_sell(&mut incoming, &mut trades),
        }

        if incoming.size > 0 {
            match side {
                Side::Buy => self.bids.push(incoming),
                Side::Sell => self.asks.push(incoming),
            }
        }

        debug!(trade_count = trades.len(), "insert processed");
        Ok((trades, self.snapshot_nbbo()))
    }

    /// Process one cancel event (§4.4.1).
    ///
    /// A cancel of an id that is not currently live (never seen, or already
    /// consumed by a match) is not an error: it emits the usual NBBO
    /// snapshot and otherwise does nothing (§9 open question, resolved in
    /// favor of treating both cases identically).
    pub fn process_cancel(&mut self, id: u64) -> NbboSnapshot {
        if let Some(live) = self.validity.remove(id) {
            match live.side {
                Side::Buy => self.bid_book.subtract(live.price, live.original_size),
                Side::Sell => self.ask_book.subtract(live.price, live.original_size),
            }
            trace!(id, "cancel");
        } else {
            trace!(id, "cancel of unknown or already-consumed id");
        }
        self.snapshot_nbbo()
    }

    /// Crossing routine for an incoming buy order against the ask queue
    /// (§4.4.2). Mutates `incoming.size` down to the unfilled remainder
    /// (zero if fully matched) and appends trades in occurrence order.
    fn cross_buy(&mut self, incoming: &mut Order, trades: &mut Vec<Trade>) {
        while incoming.size > 0 {
            let Some(top) = self.asks.peek_live(&self.validity).copied() else {
                break;
            };
            if incoming.price < top.price {
                break;
            }

            if incoming.size > top.size {
                incoming.size -= top.size;
                self.validity.remove(top.id);
                self.bid_book.subtract(incoming.price, top.size);
                self.ask_book.subtract(top.price, top.size);
                trades.push(Trade {
                    price: top.price,
                    size: top.size,
                    buy_order_id: incoming.id,
                    sell_order_id: top.id,
                });
                self.asks.pop();
            } else if incoming.size < top.size {
                let mut top_mut = self
                    .asks
                    .peek_live_mut(&self.validity)
                    .expect("top was just confirmed live");
                top_mut.size -= incoming.size;
                drop(top_mut);
                self.validity.remove(incoming.id);
                self.bid_book.subtract(incoming.price, incoming.size);
                self.ask_book.subtract(top.price, incoming.size);
                trades.push(Trade {
                    price: top.price,
                    size: incoming.size,
                    buy_order_id: incoming.id,
                    sell_order_id: top.id,
                });
                incoming.size = 0;
            } else {
                self.validity.remove(top.id);
                self.validity.remove(incoming.id);
                self.bid_book.subtract(incoming.price, incoming.size);
                self.ask_book.subtract(top.price, top.size);
                trades.push(Trade {
                    price: top.price,
                    size: incoming.size,
                    buy_order_id: incoming.id,
                    sell_order_id: top.id,
                });
                incoming.size = 0;
            }
        }
    }

    /// Crossing routine for an incoming sell order against the bid queue;
    /// the mirror of [`Self::cross_buy`].
    fn cross_sell(&mut self, incoming: &mut Order, trades: &mut Vec<Trade>) {
        while incoming.size > 0 {
            let Some(top) = self.bids.peek_live(&self.validity).copied() else {
                break;
            };
            if incoming.price > top.price {
                break;
            }

            if incoming.size > top.size {
                incoming.size -= top.size;
                self.validity.remove(top.id);
                self.ask_book.subtract(incoming.price, top.size);
                self.bid_book.subtract(top.price, top.size);
                trades.push(Trade {
                    price: top.price,
                    size: top.size,
                    buy_order_id: top.id,
                    sell_order_id: incoming.id,
                });
                self.bids.pop();
            } else if incoming.size < top.size {
                let mut top_mut = self
                    .bids
                    .peek_live_mut(&self.validity)
                    .expect("top was just confirmed live");
                top_mut.size -= incoming.size;
                drop(top_mut);
                self.validity.remove(incoming.id);
                self.ask_book.subtract(incoming.price, incoming.size);
                self.bid_book.subtract(top.price, incoming.size);
                trades.push(Trade {
                    price: top.price,
                    size: incoming.size,
                    buy_order_id: top.id,
                    sell_order_id: incoming.id,
                });
                incoming.size = 0;
            } else {
                self.validity.remove(top.id);
                self.validity.remove(incoming.id);
                self.ask_book.subtract(incoming.price, incoming.size);
                self.bid_book.subtract(top.price, top.size);
                trades.push(Trade {
                    price: top.price,
                    size: incoming.size,
                    buy_order_id: top.id,
                    sell_order_id: incoming.id,
                });
                incoming.size = 0;
            }
        }
    }

    /// Build the current top-of-book snapshot (§4.4.3). Always recomputed
    /// from the queues and aggregated books, never cached.
    pub fn snapshot_nbbo(&mut self) -> NbboSnapshot {
        let bid = self.bids.peek_live(&self.validity).copied();
        let ask = self.asks.peek_live(&self.validity).copied();

        let (bid_price, bid_size) = match bid {
            Some(order) => (order.price, self.bid_book.get(order.price)),
            None => (0, 0),
        };
        let (ask_price, ask_size) = match ask {
            Some(order) => (order.price, self.ask_book.get(order.price)),
            None => (0, 0),
        };

        NbboSnapshot {
            bid_price,
            bid_size,
            ask_price,
            ask_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nbbo(bid_price: u64, bid_size: u64, ask_price: u64, ask_size: u64) -> NbboSnapshot {
        NbboSnapshot {
            bid_price,
            bid_size,
            ask_price,
            ask_size,
        }
    }

    fn trade(price: u64, size: u64, buy_order_id: u64, sell_order_id: u64) -> Trade {
        Trade {
            price,
            size,
            buy_order_id,
            sell_order_id,
        }
    }

    #[test]
    fn simple_rest_no_cross() {
        let mut engine = MatchingEngine::new();
        let (trades, snap) = engine.process_insert(1, 1, Side::Buy, 100, 10).unwrap();
        assert!(trades.is_empty());
        assert_eq!(snap, nbbo(100, 10, 0, 0));
    }

    #[test]
    fn exact_match() {
        let mut engine = MatchingEngine::new();
        engine.process_insert(1, 1, Side::Buy, 100, 10).unwrap();
        let (trades, snap) = engine.process_insert(2, 2, Side::Sell, 100, 10).unwrap();
        assert_eq!(trades, vec![trade(100, 10, 1, 2)]);
        assert_eq!(snap, nbbo(0, 0, 0, 0));
    }

    #[test]
    fn partial_fill_of_incoming() {
        let mut engine = MatchingEngine::new();
        engine.process_insert(1, 1, Side::Sell, 100, 5).unwrap();
        let (trades, snap) = engine.process_insert(2, 2, Side::Buy, 100, 8).unwrap();
        assert_eq!(trades, vec![trade(100, 5, 2, 1)]);
        assert_eq!(snap, nbbo(100, 3, 0, 0));
    }

    #[test]
    fn partial_fill_of_resting() {
        let mut engine = MatchingEngine::new();
        engine.process_insert(1, 1, Side::Sell, 100, 10).unwrap();
        let (trades, snap) = engine.process_insert(2, 2, Side::Buy, 100, 4).unwrap();
        assert_eq!(trades, vec![trade(100, 4, 2, 1)]);
        assert_eq!(snap, nbbo(0, 0, 100, 6));
    }

    #[test]
    fn multi_level_sweep() {
        let mut engine = MatchingEngine::new();
        let (_, snap1) = engine.process_insert(1, 1, Side::Sell, 100, 5).unwrap();
        assert_eq!(snap1, nbbo(0, 0, 100, 5));
        let (_, snap2) = engine.process_insert(2, 2, Side::Sell, 101, 5).unwrap();
        assert_eq!(snap2, nbbo(0, 0, 100, 5));
        let (trades, snap3) = engine.process_insert(3, 3, Side::Buy, 101, 8).unwrap();
        assert_eq!(
            trades,
            vec![trade(100, 5, 3, 1), trade(101, 3, 3, 2)]
        );
        assert_eq!(snap3, nbbo(0, 0, 101, 2));
    }

    #[test]
    fn cancel_then_re_cross() {
        let mut engine = MatchingEngine::new();
        let (_, snap1) = engine.process_insert(1, 1, Side::Buy, 100, 10).unwrap();
        assert_eq!(snap1, nbbo(100, 10, 0, 0));
        let snap2 = engine.process_cancel(1);
        assert_eq!(snap2, nbbo(0, 0, 0, 0));
        let (trades, snap3) = engine.process_insert(3, 2, Side::Sell, 100, 10).unwrap();
        assert!(trades.is_empty());
        assert_eq!(snap3, nbbo(0, 0, 100, 10));
    }

    #[test]
    fn cancel_of_unknown_id_is_not_an_error() {
        let mut engine = MatchingEngine::new();
        let snap = engine.process_cancel(999);
        assert_eq!(snap, nbbo(0, 0, 0, 0));
    }

    #[test]
    fn duplicate_insert_id_is_fatal() {
        let mut engine = MatchingEngine::new();
        engine.process_insert(1, 1, Side::Buy, 100, 10).unwrap();
        let err = engine.process_insert(2, 1, Side::Buy, 100, 5).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateOrderId { id: 1 }));
    }

    #[test]
    fn zero_price_is_rejected() {
        let mut engine = MatchingEngine::new();
        let err = engine.process_insert(1, 1, Side::Buy, 0, 10).unwrap_err();
        assert!(matches!(err, EngineError::InvalidOrder { id: 1, .. }));
    }

    #[test]
    fn price_time_priority_among_resting_orders_at_same_price() {
        let mut engine = MatchingEngine::new();
        engine.process_insert(1, 1, Side::Buy, 100, 5).unwrap();
        engine.process_insert(1, 2, Side::Buy, 100, 5).unwrap();
        let (trades, _) = engine.process_insert(2, 3, Side::Sell, 100, 5).unwrap();
        assert_eq!(trades, vec![trade(100, 5, 1, 3)]);
    }
}
