//! Popularity Strategy - the last resort
//!
//! Ranks the pool by how many students took each course. Always
//! applicable, needs neither a major nor any history. Courses nobody has
//! scored are left out, so an untouched catalog ranks empty.

use crate::traits::RankingStrategy;
use crate::types::{rank_candidates, Candidate, CandidateSource, RankingContext};
use anyhow::Result;
use data_loader::CourseIdx;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
pub struct PopularityStrategy;

impl PopularityStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl RankingStrategy for PopularityStrategy {
    fn name(&self) -> &str {
        "PopularityStrategy"
    }

    fn source(&self) -> CandidateSource {
        CandidateSource::Popularity
    }

    #[instrument(skip(self, pool, ctx), fields(student_id = %ctx.student.student_id))]
    fn rank(&self, pool: &[CourseIdx], ctx: &RankingContext<'_>) -> Result<Vec<Candidate>> {
        let mut candidates: Vec<Candidate> = pool
            .iter()
            .copied()
            .filter(|&c| !ctx.student.has_taken(c))
            .filter_map(|course| {
                let popularity = ctx.matrix.popularity(course);
                if popularity == 0 {
                    return None;
                }
                let mut candidate =
                    Candidate::new(course, CandidateSource::Popularity, popularity as f64);
                candidate.metadata.scorer_count = Some(popularity);
                Some(candidate)
            })
            .collect();

        rank_candidates(&mut candidates, ctx.limit);

        debug!("Generated {} popularity candidates", candidates.len());
        Ok(candidates)
    }
}
