//! Engine crate for the course recommendation service.
//!
//! This crate contains the [`RecommendationEngine`] that coordinates the
//! loader, strategies and pipeline for one request at a time, plus its
//! configuration and error types.

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::{
    chart_payload, ChartPayload, Outcome, RecommendationEngine, Recommendations,
    COURSE_SCORE_RANGE, PERSON_SCORE_RANGE,
};
pub use error::{RecommendError, Result};
pub use pipeline::{ChartData, ChartRow, ScoredEntry};
