//! Core traits for the candidate pool.
//!
//! This module defines the Filter trait that narrows the set of courses
//! every ranking strategy gets to see.

use anyhow::Result;
use data_loader::CourseIdx;
use sources::RankingContext;

/// Core trait for narrowing the candidate pool.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be used in concurrent contexts
/// - Filters take ownership of the pool and return the narrowed pool
/// - Pool order must be preserved
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a candidate pool.
    ///
    /// # Arguments
    /// * `pool` - The course indices to filter (takes ownership)
    /// * `ctx` - Request context: matrix, student, catalog rules
    ///
    /// # Returns
    /// * `Ok(Vec<CourseIdx>)` - The remaining courses
    /// * `Err` - If filtering fails
    fn apply(&self, pool: Vec<CourseIdx>, ctx: &RankingContext<'_>) -> Result<Vec<CourseIdx>>;
}
