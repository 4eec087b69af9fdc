//! Request pipeline for course recommendations.
//!
//! This crate provides:
//! - Filter trait and implementations that build the candidate pool
//! - FilterPipeline for composing filters
//! - Route detection and the ordered StrategyChain
//! - Chart formatting and the output normalizer
//!
//! ## Architecture
//! A request moves through the pipeline in stages:
//! 1. Filters narrow the catalog to unrated, recommendable courses
//! 2. The route picks which strategies apply
//! 3. The chain tries those strategies in order until one ranks something
//! 4. Rankings are converted to chart datasets and normalized for display
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{detect_route, FilterPipeline, StrategyChain};
//!
//! let route = detect_route(&student, &matrix, 3);
//! let pool = FilterPipeline::candidate_pool().apply(all_courses, &ctx)?;
//! let result = StrategyChain::default().rank(&pool, &ctx)?;
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod strategy_chain;
pub mod chart;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use strategy_chain::{detect_route, ChainResult, StrategyChain, MIN_POPULATION};
pub use chart::{normalize, to_chart_format, ChartData, ChartRow, ScoredEntry};
