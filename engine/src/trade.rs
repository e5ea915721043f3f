//! Trade records emitted by the matching core.

/// One execution between a taker and a resting maker (§4.4.4).
///
/// Field order is fixed regardless of which side initiated the cross: the
/// price is always the maker's (resting) price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Trade {
    /// The resting (maker) order's price.
    pub price: u64,
    /// The matched quantity.
    pub size: u64,
    /// Id of the order on the buy side of this trade.
    pub buy_order_id: u64,
    /// Id of the order on the sell side of this trade.
    pub sell_order_id: u64,
}
