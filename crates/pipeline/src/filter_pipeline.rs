//! The FilterPipeline narrows the candidate pool.
//!
//! Chains filters together using the builder pattern. The engine runs
//! `AlreadyTakenFilter` then `RecommendableFilter` over every course in
//! the catalog before any strategy ranks.

use crate::filters::{AlreadyTakenFilter, RecommendableFilter};
use crate::traits::Filter;
use anyhow::{Context, Result};
use data_loader::CourseIdx;
use sources::RankingContext;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(AlreadyTakenFilter)
///     .add_filter(RecommendableFilter);
///
/// let pool = pipeline.apply(all_courses, &ctx)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The pool every recommendation request starts from: unrated courses,
    /// narrowed to electives when any exist
    pub fn candidate_pool() -> Self {
        Self::new()
            .add_filter(AlreadyTakenFilter)
            .add_filter(RecommendableFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Apply all filters in sequence to the pool.
    ///
    /// Logs each filter's input and output count. Stops at the first
    /// filter that fails.
    pub fn apply(&self, pool: Vec<CourseIdx>, ctx: &RankingContext<'_>) -> Result<Vec<CourseIdx>> {
        let mut current = pool;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter
                .apply(current, ctx)
                .with_context(|| format!("Filter {} failed", filter.name()))?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
