//! Prelude module for convenient imports
//!
//! ```rust
//! use stat_core::prelude::*;
//! ```

pub use crate::aggregator::StatAccumulator;
pub use crate::resolver::{prepare_actor, prepare_in_place};
pub use crate::supplies::SupplyTotals;
