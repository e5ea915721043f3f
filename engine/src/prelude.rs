//! Convenience re-export of the types most callers need.

pub use crate::error::EngineError;
pub use crate::matching::MatchingEngine;
pub use crate::nbbo::NbboSnapshot;
pub use crate::order::{Order, Side};
pub use crate::trade::Trade;
