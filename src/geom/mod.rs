//! Chains and spatial queries.
//!
//! - [`Chain`] - One streamline as an ordered point list with cached bounds
//! - [`compute_bounds`] / [`search`] - Bounds write-back and box queries over a store

mod chain;
mod search;

pub use chain::*;
pub use search::*;
