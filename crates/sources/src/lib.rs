//! # Sources Crate
//!
//! This crate scores and ranks candidate courses for one student.
//!
//! ## Components
//!
//! ### Similarity Engine
//! Pearson similarity between students and cosine similarity between
//! courses, memoized per request by unordered index pair.
//!
//! ### Ranking Strategies
//! Every strategy implements [`RankingStrategy`] over the same candidate
//! pool and [`RankingContext`]:
//! - **Collaborative**: similarity-weighted average of similar students' scores
//! - **Cold start**: popularity with a boost for the student's major
//! - **Popularity**: raw count of students who took the course
//!
//! ### Latent Factor Recommender
//! Legacy SVD estimate of courses and similar students, used when the
//! strategies above fail outright.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{build_student_context, CollaborativeStrategy, RankingStrategy};
//!
//! let student = build_student_context(&matrix, "s01")?;
//! let ctx = RankingContext { matrix: &matrix, student: &student, /* ... */ };
//! let ranked = CollaborativeStrategy::new().rank(&pool, &ctx)?;
//! ```

// Public modules
pub mod types;
pub mod user_context;
pub mod similarity;
pub mod traits;
pub mod collaborative;
pub mod cold_start;
pub mod popularity;
pub mod latent_factor;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export commonly used types
pub use types::{
    rank_candidates, Candidate, CandidateMetadata, CandidateSource, CatalogRules, RankingContext,
    Route,
};
pub use user_context::{build_student_context, StudentContext};
pub use similarity::{cosine_similarity, pearson_correlation, SimilarityEngine};
pub use traits::RankingStrategy;
pub use collaborative::CollaborativeStrategy;
pub use cold_start::ColdStartStrategy;
pub use popularity::PopularityStrategy;
pub use latent_factor::{Factorization, LatentFactorRecommender, LatentRecommendations};
