//! Filter to keep only recommendable courses.
//!
//! Keeps courses whose classification starts with the elective prefix.
//! When the pool holds no such course, the pool passes through unchanged
//! so later strategies still have something to rank.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::CourseIdx;
use sources::RankingContext;
use tracing::debug;

pub struct RecommendableFilter;

impl Filter for RecommendableFilter {
    fn name(&self) -> &str {
        "RecommendableFilter"
    }

    fn apply(&self, pool: Vec<CourseIdx>, ctx: &RankingContext<'_>) -> Result<Vec<CourseIdx>> {
        let electives: Vec<CourseIdx> = pool
            .iter()
            .copied()
            .filter(|&course| ctx.rules.is_primary_elective(ctx.classification(course)))
            .collect();

        if electives.is_empty() {
            debug!(
                "No course matches prefix {:?}, keeping all {} unrated courses",
                ctx.rules.elective_prefix,
                pool.len()
            );
            return Ok(pool);
        }
        Ok(electives)
    }
}
