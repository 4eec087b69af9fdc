//! Filter implementations for the candidate pool.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_taken;
pub mod recommendable;

// Re-export for convenience
pub use already_taken::AlreadyTakenFilter;
pub use recommendable::RecommendableFilter;
