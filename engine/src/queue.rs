//! Per-side priority queue over resting orders, with lazy cancellation.
//!
//! §4.2 defines the ordering; §4.3 defines the two operations the matching
//! core relies on. Stale entries (ids already removed from the validity
//! index) are discarded only when they surface at the heap top — no
//! bookkeeping is done on cancel beyond removing the id from the validity
//! index (see [`crate::validity::ValidityIndex`]).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::binary_heap::PeekMut;
use std::ops::{Deref, DerefMut};

use crate::order::Order;
use crate::validity::ValidityIndex;

/// A heap entry carrying the side-specific comparison.
///
/// `std::collections::BinaryHeap` is a max-heap, so each side's [`Ord`] impl
/// is written so that the order which should win price-time priority
/// compares as the *greatest* — highest price for bids, lowest price for
/// asks, with earlier `time` then smaller `arrival_seq` breaking ties on
/// both sides (§4.2).
pub trait PriorityKey: Ord {
    /// Wrap an order for this side's heap.
    fn from_order(order: Order) -> Self;
    /// Unwrap back into the order it carries.
    fn into_order(self) -> Order;
    /// Read-only access to the carried order.
    fn order(&self) -> &Order;
    /// Mutable access to the carried order, for in-place size decrements.
    fn order_mut(&mut self) -> &mut Order;
}

/// Bid-side ordering: higher price first, then earlier time, then smaller
/// `arrival_seq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidKey(Order);

impl PriorityKey for BidKey {
    fn from_order(order: Order) -> Self {
        BidKey(order)
    }
    fn into_order(self) -> Order {
        self.0
    }
    fn order(&self) -> &Order {
        &self.0
    }
    fn order_mut(&mut self) -> &mut Order {
        &mut self.0
    }
}

impl Ord for BidKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .price
            .cmp(&other.0.price)
            .then_with(|| other.0.time.cmp(&self.0.time))
            .then_with(|| other.0.arrival_seq.cmp(&self.0.arrival_seq))
    }
}

impl PartialOrd for BidKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ask-side ordering: lower price first, then earlier time, then smaller
/// `arrival_seq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AskKey(Order);

impl PriorityKey for AskKey {
    fn from_order(order: Order) -> Self {
        AskKey(order)
    }
    fn into_order(self) -> Order {
        self.0
    }
    fn order(&self) -> &Order {
        &self.0
    }
    fn order_mut(&mut self) -> &mut Order {
        &mut self.0
    }
}

impl Ord for AskKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .price
            .cmp(&self.0.price)
            .then_with(|| other.0.time.cmp(&self.0.time))
            .then_with(|| other.0.arrival_seq.cmp(&self.0.arrival_seq))
    }
}

impl PartialOrd for AskKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A mutable handle onto the live top of a queue, for decrementing its
/// remaining size in place. The ordering key is `(price, time, arrival_seq)`
/// — size never participates — so mutating it through this handle can never
/// invalidate heap order (§9).
pub struct TopMut<'a, K: PriorityKey>(PeekMut<'a, K>);

impl<K: PriorityKey> Deref for TopMut<'_, K> {
    type Target = Order;
    fn deref(&self) -> &Order {
        self.0.order()
    }
}

impl<K: PriorityKey> DerefMut for TopMut<'_, K> {
    fn deref_mut(&mut self) -> &mut Order {
        self.0.order_mut()
    }
}

/// One side's priority queue.
#[derive(Debug)]
pub struct OrderQueue<K: PriorityKey> {
    heap: BinaryHeap<K>,
}

impl<K: PriorityKey> Default for OrderQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PriorityKey> OrderQueue<K> {
    /// An empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Insert `order` in heap order.
    pub fn push(&mut self, order: Order) {
        self.heap.push(K::from_order(order));
    }

    /// Discard stale heap tops until the top names a live order (or the
    /// heap is empty).
    fn prune_stale(&mut self, validity: &ValidityIndex) {
        while let Some(top) = self.heap.peek() {
            if validity.is_live(top.order().id) {
                break;
            }
            self.heap.pop();
        }
    }

    /// Prune stale tops, then return the live top, if any (§4.3).
    pub fn peek_live(&mut self, validity: &ValidityIndex) -> Option<&Order> {
        self.prune_stale(validity);
        self.heap.peek().map(PriorityKey::order)
    }

    /// Prune stale tops, then return a mutable handle onto the live top, if
    /// any — used to decrement the top's remaining size without popping it.
    pub fn peek_live_mut(&mut self, validity: &ValidityIndex) -> Option<TopMut<'_, K>> {
        self.prune_stale(validity);
        self.heap.peek_mut().map(TopMut)
    }

    /// Remove the top unconditionally, returning the order it carried.
    ///
    /// Used after the caller has already resolved the top (e.g. after a
    /// full fill); callers must not call this without having confirmed a
    /// live top exists via [`Self::peek_live`] first.
    pub fn pop(&mut self) -> Option<Order> {
        self.heap.pop().map(PriorityKey::into_order)
    }

    /// Whether the heap holds no entries at all (live or stale).
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
