//! Top-of-book snapshot emitted after every input event.

/// Best bid/ask price and aggregate level size, for the book's current state.
///
/// An empty side reports zero for both of its fields (§4.4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct NbboSnapshot {
    /// Best bid price, or 0 if the bid side is empty.
    pub bid_price: u64,
    /// Aggregate resting size at `bid_price`, or 0 if the bid side is empty.
    pub bid_size: u64,
    /// Best ask price, or 0 if the ask side is empty.
    pub ask_price: u64,
    /// Aggregate resting size at `ask_price`, or 0 if the ask side is empty.
    pub ask_size: u64,
}
