//! Single-symbol, price-time priority limit order matching engine.
//!
//! The crate's only public entry point that matters for correctness is
//! [`MatchingEngine`]: it owns both sides of the book and is the sole
//! mutator of the validity index, the two aggregated books, and the two
//! priority queues. Everything else here — [`Order`], [`Trade`],
//! [`NbboSnapshot`] — is a plain data record passed across that boundary.
//!
//! The engine is strictly serial: one event in, one NBBO snapshot and zero
//! or more trades out, before the next event is read. There is no internal
//! concurrency and no I/O; both are the caller's concern.

pub mod book;
pub mod error;
pub mod matching;
pub mod nbbo;
pub mod order;
pub mod prelude;
pub mod queue;
pub mod trade;
pub mod validity;

pub use error::EngineError;
pub use matching::MatchingEngine;
pub use nbbo::NbboSnapshot;
pub use order::{Order, Side};
pub use trade::Trade;
