//! The order record and the side enum it is keyed on.

use std::fmt;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Side {
    /// A resting or incoming buy order.
    Buy,
    /// A resting or incoming sell order.
    Sell,
}

impl Side {
    /// The opposite side, used when looking up the crossing queue.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// A live or resting limit order.
///
/// `size` is the *remaining* quantity and decreases as the order is
/// partially filled; every other field is immutable for the order's
/// lifetime. `arrival_seq` is assigned once, by the matching core, from a
/// monotone counter shared by inserts and cancels — it is the final
/// tiebreak in the price-time ordering (see [`crate::queue`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    /// Monotone counter value assigned at arrival; the final ordering tiebreak.
    pub arrival_seq: u64,
    /// Event timestamp as given by the input stream.
    pub time: u64,
    /// Client-provided id, unique among live orders.
    pub id: u64,
    /// Buy or sell.
    pub side: Side,
    /// Limit price, a positive integer tick.
    pub price: u64,
    /// Remaining size, a positive integer that decreases as the order fills.
    pub size: u64,
}
