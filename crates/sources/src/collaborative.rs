//! Collaborative Strategy - user-based collaborative filtering
//!
//! "Students whose grades and ratings look like yours liked these courses"
//!
//! ## Algorithm
//! 1. Keep pool courses whose classification starts with the elective prefix
//! 2. For each course, collect the students who scored it
//! 3. No scorers: predict the flat default (new courses stay eligible)
//! 4. Otherwise: `Σ(sim * score) / Σ|sim|` over scorers with positive
//!    Pearson similarity to the target student
//! 5. Zero total weight: fall back to the plain mean of the scorers' scores
//! 6. Sort descending, keep the top `limit`

use crate::traits::RankingStrategy;
use crate::types::{rank_candidates, Candidate, CandidateSource, RankingContext, Route};
use anyhow::Result;
use data_loader::{CourseIdx, StudentIdx};
use tracing::{debug, instrument};

/// Prediction for a course nobody has scored yet
pub const DEFAULT_PREDICTION: f64 = 3.0;

/// Similarity-weighted average over similar students' scores
pub struct CollaborativeStrategy {
    default_prediction: f64,
}

impl CollaborativeStrategy {
    pub fn new() -> Self {
        Self {
            default_prediction: DEFAULT_PREDICTION,
        }
    }

    /// Configure the prediction for unscored courses (default: 3.0)
    pub fn with_default_prediction(mut self, prediction: f64) -> Self {
        self.default_prediction = prediction;
        self
    }

    /// Predict the target student's score for one course.
    ///
    /// Returns the prediction plus the positive similarity weight behind it
    /// (`None` when the default or the plain mean was used).
    fn predict(
        &self,
        course: CourseIdx,
        scorers: &[StudentIdx],
        ctx: &RankingContext<'_>,
    ) -> (f64, Option<f64>) {
        if scorers.is_empty() {
            return (self.default_prediction, None);
        }

        let target = ctx.student.student_idx;
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for &other in scorers {
            let similarity = ctx.similarity.student_similarity(ctx.matrix, target, other);
            if similarity > 0.0 {
                weighted_sum += similarity * ctx.matrix.score(other, course);
                total_weight += similarity.abs();
            }
        }

        if total_weight == 0.0 {
            let mean = scorers
                .iter()
                .map(|&s| ctx.matrix.score(s, course))
                .sum::<f64>()
                / scorers.len() as f64;
            return (mean, None);
        }

        (weighted_sum / total_weight, Some(total_weight))
    }
}

impl Default for CollaborativeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl RankingStrategy for CollaborativeStrategy {
    fn name(&self) -> &str {
        "CollaborativeStrategy"
    }

    fn source(&self) -> CandidateSource {
        CandidateSource::Collaborative
    }

    fn is_applicable(&self, ctx: &RankingContext<'_>) -> bool {
        ctx.route == Route::Collaborative
    }

    #[instrument(skip(self, pool, ctx), fields(student_id = %ctx.student.student_id))]
    fn rank(&self, pool: &[CourseIdx], ctx: &RankingContext<'_>) -> Result<Vec<Candidate>> {
        let target = ctx.student.student_idx;
        let electives: Vec<CourseIdx> = pool
            .iter()
            .copied()
            .filter(|&c| ctx.rules.is_primary_elective(ctx.classification(c)))
            .collect();

        debug!(
            "Scoring {} elective candidates out of a pool of {}",
            electives.len(),
            pool.len()
        );

        let mut candidates: Vec<Candidate> = electives
            .into_iter()
            .map(|course| {
                let scorers: Vec<StudentIdx> = ctx
                    .matrix
                    .scorers_of(course)
                    .into_iter()
                    .filter(|&s| s != target)
                    .collect();
                let (score, weight) = self.predict(course, &scorers, ctx);

                let mut candidate = Candidate::new(course, CandidateSource::Collaborative, score);
                candidate.metadata.scorer_count = Some(scorers.len());
                candidate.metadata.similarity_weight = weight;
                candidate
            })
            .collect();

        rank_candidates(&mut candidates, ctx.limit);

        debug!("Generated {} collaborative candidates", candidates.len());
        Ok(candidates)
    }
}
