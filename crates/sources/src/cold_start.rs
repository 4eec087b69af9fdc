//! Cold Start Strategy - major-aware popularity
//!
//! Serves students with too little history for similarity to mean
//! anything.
//!
//! ## Algorithm
//! 1. Ask the data source which courses are open to the student's major
//!    (open to all, or owned by the major)
//! 2. Keep pool courses whose classification starts with the elective
//!    prefix; if none do, relax to any classification carrying an
//!    elective marker
//! 3. Score = popularity + 1.0, plus a flat boost for major courses
//! 4. Major courses first (by score), then the rest, up to `limit`

use crate::traits::RankingStrategy;
use crate::types::{rank_candidates, Candidate, CandidateSource, RankingContext};
use anyhow::{Context, Result};
use data_loader::CourseIdx;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Added to every candidate's popularity
pub const POPULARITY_BASE: f64 = 1.0;

/// Added when the course is open to the student's major
pub const MAJOR_BOOST: f64 = 10.0;

pub struct ColdStartStrategy {
    major_boost: f64,
    popularity_base: f64,
}

impl ColdStartStrategy {
    pub fn new() -> Self {
        Self {
            major_boost: MAJOR_BOOST,
            popularity_base: POPULARITY_BASE,
        }
    }

    /// Configure the major affinity boost (default: 10.0)
    pub fn with_major_boost(mut self, boost: f64) -> Self {
        self.major_boost = boost;
        self
    }

    /// Configure the base added to popularity (default: 1.0)
    pub fn with_popularity_base(mut self, base: f64) -> Self {
        self.popularity_base = base;
        self
    }

    /// Elective courses from the pool, relaxing to marker matches when no
    /// course carries the primary prefix
    fn recommendable(&self, pool: &[CourseIdx], ctx: &RankingContext<'_>) -> Vec<CourseIdx> {
        let untaken = pool.iter().copied().filter(|&c| !ctx.student.has_taken(c));

        let primary: Vec<CourseIdx> = untaken
            .clone()
            .filter(|&c| ctx.rules.is_primary_elective(ctx.classification(c)))
            .collect();
        if !primary.is_empty() {
            return primary;
        }

        debug!("No primary electives in pool, relaxing to elective markers");
        untaken
            .filter(|&c| ctx.rules.is_any_elective(ctx.classification(c)))
            .collect()
    }
}

impl Default for ColdStartStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl RankingStrategy for ColdStartStrategy {
    fn name(&self) -> &str {
        "ColdStartStrategy"
    }

    fn source(&self) -> CandidateSource {
        CandidateSource::ColdStart
    }

    /// Needs a declared major to build the affinity pool
    fn is_applicable(&self, ctx: &RankingContext<'_>) -> bool {
        ctx.student.major.is_some()
    }

    #[instrument(skip(self, pool, ctx), fields(student_id = %ctx.student.student_id))]
    fn rank(&self, pool: &[CourseIdx], ctx: &RankingContext<'_>) -> Result<Vec<Candidate>> {
        let Some(major) = ctx.student.major.as_deref() else {
            return Ok(Vec::new());
        };

        let major_pool: HashSet<CourseIdx> = ctx
            .source
            .list_courses_for_major(major)
            .with_context(|| format!("Failed to list courses for major {}", major))?
            .iter()
            .filter_map(|id| ctx.matrix.course_idx(id))
            .collect();

        let candidates = self.recommendable(pool, ctx);
        if candidates.is_empty() {
            warn!("Cold start pool is empty for major {}", major);
            return Ok(Vec::new());
        }

        let (mut major_courses, mut other_courses): (Vec<Candidate>, Vec<Candidate>) = candidates
            .into_iter()
            .map(|course| {
                let popularity = ctx.matrix.popularity(course);
                let is_major = major_pool.contains(&course);
                let mut score = popularity as f64 + self.popularity_base;
                if is_major {
                    score += self.major_boost;
                }

                let mut candidate = Candidate::new(course, CandidateSource::ColdStart, score);
                candidate.metadata.scorer_count = Some(popularity);
                candidate.metadata.is_major_course = is_major;
                candidate
            })
            .partition(|c| c.metadata.is_major_course);

        debug!(
            "Cold start split: {} major courses, {} other courses",
            major_courses.len(),
            other_courses.len()
        );

        rank_candidates(&mut major_courses, ctx.limit);
        let remaining = ctx.limit.saturating_sub(major_courses.len());
        rank_candidates(&mut other_courses, remaining);
        major_courses.extend(other_courses);

        Ok(major_courses)
    }
}
