//! Error types for recommendation requests.
//!
//! "No good candidates" never shows up here: unknown students, an empty
//! catalog and exhausted students all produce an empty
//! [`Recommendations`](crate::Recommendations) instead.

use data_loader::DataLoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    /// Both the primary pipeline and the latent factor fallback failed
    #[error("Recommendation failed (primary: {primary}; legacy fallback: {legacy})")]
    ComputationFailure { primary: String, legacy: String },

    /// The data source failed outside a recommendation request
    #[error("Data source error: {0}")]
    Source(#[from] DataLoadError),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
