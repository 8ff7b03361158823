//! Analytics over project task lists.

pub mod aggregator;

pub use aggregator::*;
