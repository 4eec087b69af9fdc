//! The ranking strategy contract.
//!
//! Every strategy (collaborative, cold start, popularity, latent factor)
//! takes the same pre-filtered candidate pool and the same per-request
//! context, so the pipeline can try them in order without knowing which
//! one it is talking to.

use crate::types::{Candidate, CandidateSource, RankingContext};
use anyhow::Result;
use data_loader::CourseIdx;

/// A strategy that turns a pool of unrated courses into a ranked list.
///
/// ## Contract
/// - `rank` returns at most `ctx.limit` candidates, best first
/// - every returned course comes from `pool`
/// - an empty result is a valid "nothing to recommend", not an error
pub trait RankingStrategy: Send + Sync {
    /// Name for logging
    fn name(&self) -> &str;

    /// Source tag attached to the candidates this strategy produces
    fn source(&self) -> CandidateSource;

    /// Whether the strategy should be tried for this request
    fn is_applicable(&self, _ctx: &RankingContext<'_>) -> bool {
        true
    }

    /// Score and rank the candidate pool
    fn rank(&self, pool: &[CourseIdx], ctx: &RankingContext<'_>) -> Result<Vec<Candidate>>;
}
