//! # Recommendation Engine
//!
//! This module coordinates one recommendation request:
//! 1. Clear the similarity caches
//! 2. Load a fresh interaction matrix from the data source
//! 3. Build the student context and detect the route
//! 4. Narrow the catalog to the candidate pool
//! 5. Run the strategy chain (collaborative, cold start, popularity)
//! 6. Rank similar students
//! 7. If anything above fails, retry with the latent factor recommender
//!
//! ## Freshness
//! Nothing but the similarity caches survives between requests, and those
//! are cleared on entry. Indices from one load are never reused.
//!
//! The caches use interior mutability without locks, so an engine must not
//! be shared between threads; give each worker its own engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use data_loader::{CourseIdx, DataSource, InteractionMatrix, StudentIdx};
use pipeline::{
    detect_route, normalize, to_chart_format, ChartData, FilterPipeline, ScoredEntry,
    StrategyChain,
};
use sources::{
    build_student_context, CandidateSource, ColdStartStrategy, CollaborativeStrategy,
    LatentFactorRecommender, RankingContext, Route, SimilarityEngine,
};

use crate::config::EngineConfig;
use crate::error::{RecommendError, Result};

/// Weight of the shared-course ratio in the similar-student fallback
const SHARED_RATIO_WEIGHT: f64 = 0.6;

/// Weight of score closeness in the similar-student fallback
const CLOSENESS_WEIGHT: f64 = 0.4;

/// Range chart course scores are normalized to
pub const COURSE_SCORE_RANGE: (f64, f64) = (1.0, 5.0);

/// Range chart student similarities are normalized to
pub const PERSON_SCORE_RANGE: (f64, f64) = (0.0, 1.0);

/// How a request was answered
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Outcome {
    /// The primary pipeline ran; `source` is `None` when nothing was eligible
    Ranked {
        route: Route,
        source: Option<CandidateSource>,
    },
    /// The primary pipeline failed and the latent factor fallback answered
    LegacyFallback,
    /// The student id is not in the current load
    UnknownStudent,
    /// There are no courses at all
    EmptyCatalog,
}

/// Result of one recommendation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    /// Course ids, best first
    pub courses: Vec<ScoredEntry>,
    /// Student ids, most similar first
    pub students: Vec<ScoredEntry>,
    /// Course id -> name for every returned course
    pub course_names: HashMap<String, String>,
    /// Student id -> name for every returned student
    pub student_names: HashMap<String, String>,
    pub outcome: Outcome,
}

impl Recommendations {
    pub fn empty(outcome: Outcome) -> Self {
        Self {
            courses: Vec::new(),
            students: Vec::new(),
            course_names: HashMap::new(),
            student_names: HashMap::new(),
            outcome,
        }
    }

    /// Attach ids and names from the matrix the indices came from
    fn from_ranked(
        matrix: &InteractionMatrix,
        courses: Vec<(CourseIdx, f64)>,
        students: Vec<(StudentIdx, f64)>,
        outcome: Outcome,
    ) -> Self {
        let mut result = Self::empty(outcome);

        for (idx, score) in courses {
            if let Some(course) = matrix.course(idx) {
                result.courses.push(ScoredEntry::new(course.id.clone(), score));
                result.course_names.insert(course.id.clone(), course.name.clone());
            }
        }
        for (idx, score) in students {
            if let Some(student) = matrix.student(idx) {
                result.students.push(ScoredEntry::new(student.id.clone(), score));
                result
                    .student_names
                    .insert(student.id.clone(), student.name.clone());
            }
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty() && self.students.is_empty()
    }
}

/// Course and person charts, ready for a bar chart widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub course: ChartData,
    pub person: ChartData,
}

/// Main engine that coordinates the recommendation pipeline
pub struct RecommendationEngine {
    source: Arc<dyn DataSource>,
    config: EngineConfig,
    similarity: SimilarityEngine,
    filter_pipeline: FilterPipeline,
    chain: StrategyChain,
    legacy: LatentFactorRecommender,
}

impl RecommendationEngine {
    /// Create an engine with all components configured from `config`
    pub fn new(source: Arc<dyn DataSource>, config: EngineConfig) -> Self {
        let chain = StrategyChain::standard(
            CollaborativeStrategy::new().with_default_prediction(config.default_prediction),
            ColdStartStrategy::new().with_major_boost(config.major_boost),
        );
        let legacy = LatentFactorRecommender::new().with_energy_ratio(config.energy_ratio);

        Self {
            source,
            config,
            similarity: SimilarityEngine::new(),
            filter_pipeline: FilterPipeline::candidate_pool(),
            chain,
            legacy,
        }
    }

    pub fn with_defaults(source: Arc<dyn DataSource>) -> Self {
        Self::new(source, EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Similarity caches, for inspection
    pub fn similarity(&self) -> &SimilarityEngine {
        &self.similarity
    }

    /// Main entry point: courses and similar students for one student
    ///
    /// # Returns
    /// * `Ok(Recommendations)` - possibly empty, see [`Outcome`]
    /// * `Err(ComputationFailure)` - both the primary pipeline and the
    ///   latent factor fallback failed
    #[instrument(skip(self))]
    pub fn get_recommendations(
        &self,
        student_id: &str,
        top_n_courses: usize,
        top_n_students: usize,
    ) -> Result<Recommendations> {
        let start_time = Instant::now();
        self.similarity.clear();

        let result = match self.recommend_primary(student_id, top_n_courses, top_n_students) {
            Ok(result) => result,
            Err(primary) => {
                warn!(
                    "Primary pipeline failed for student {}: {:#}; using latent factor fallback",
                    student_id, primary
                );
                self.recommend_legacy(student_id, top_n_courses, top_n_students)
                    .map_err(|legacy| RecommendError::ComputationFailure {
                        primary: format!("{:#}", primary),
                        legacy: format!("{:#}", legacy),
                    })?
            }
        };

        info!(
            "Served {} courses and {} students for student {} ({:?}) in {:.2?}",
            result.courses.len(),
            result.students.len(),
            student_id,
            result.outcome,
            start_time.elapsed()
        );
        Ok(result)
    }

    /// Load, route, filter, rank
    fn recommend_primary(
        &self,
        student_id: &str,
        top_n_courses: usize,
        top_n_students: usize,
    ) -> anyhow::Result<Recommendations> {
        let matrix = InteractionMatrix::load(self.source.as_ref(), &self.config.admin_id)
            .context("Failed to load interaction matrix")?;

        if matrix.num_courses() == 0 {
            debug!("Catalog is empty");
            return Ok(Recommendations::empty(Outcome::EmptyCatalog));
        }
        let Some(student_idx) = matrix.student_idx(student_id) else {
            debug!("Student {} is not in the current load", student_id);
            return Ok(Recommendations::empty(Outcome::UnknownStudent));
        };

        let student = build_student_context(&matrix, student_id)
            .context("Failed to build student context")?;
        let route = detect_route(&student, &matrix, self.config.cold_start_threshold);
        debug!(
            "Student {} has {} scored courses, route {:?}",
            student_id,
            student.scored_count(),
            route
        );

        let ctx = RankingContext {
            matrix: &matrix,
            similarity: &self.similarity,
            student: &student,
            source: self.source.as_ref(),
            rules: &self.config.catalog,
            route,
            limit: top_n_courses,
        };

        let all_courses: Vec<CourseIdx> = (0..matrix.num_courses()).collect();
        let pool = self
            .filter_pipeline
            .apply(all_courses, &ctx)
            .context("Failed to build candidate pool")?;
        let ranked = self.chain.rank(&pool, &ctx)?;

        let courses = ranked
            .candidates
            .iter()
            .map(|c| (c.course_idx, c.score))
            .collect();
        let students = self.rank_similar_students(&matrix, student_idx, top_n_students);

        Ok(Recommendations::from_ranked(
            &matrix,
            courses,
            students,
            Outcome::Ranked {
                route: ranked.route,
                source: ranked.source,
            },
        ))
    }

    /// Latent factor answer for the same request
    fn recommend_legacy(
        &self,
        student_id: &str,
        top_n_courses: usize,
        top_n_students: usize,
    ) -> anyhow::Result<Recommendations> {
        let matrix = InteractionMatrix::load(self.source.as_ref(), &self.config.admin_id)
            .context("Failed to load interaction matrix")?;

        if matrix.num_courses() == 0 {
            return Ok(Recommendations::empty(Outcome::EmptyCatalog));
        }
        let Some(student_idx) = matrix.student_idx(student_id) else {
            return Ok(Recommendations::empty(Outcome::UnknownStudent));
        };

        let legacy = self
            .legacy
            .recommend(&matrix, student_idx, top_n_courses, top_n_students)?;

        Ok(Recommendations::from_ranked(
            &matrix,
            legacy.courses,
            legacy.students,
            Outcome::LegacyFallback,
        ))
    }

    /// Other students ranked by positive Pearson similarity.
    ///
    /// With no positive similarity at all, falls back to a blend of the
    /// shared-course ratio and score closeness over students sharing at
    /// least one course.
    fn rank_similar_students(
        &self,
        matrix: &InteractionMatrix,
        student: StudentIdx,
        limit: usize,
    ) -> Vec<(StudentIdx, f64)> {
        let others = (0..matrix.num_students()).filter(|&other| other != student);

        let mut ranked: Vec<(StudentIdx, f64)> = others
            .clone()
            .map(|other| (other, self.similarity.student_similarity(matrix, student, other)))
            .filter(|(_, similarity)| *similarity > 0.0)
            .collect();

        if ranked.is_empty() {
            debug!("No positively similar students, using shared-course blend");
            ranked = others
                .filter_map(|other| blended_similarity(matrix, student, other).map(|s| (other, s)))
                .collect();
        }

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }

    /// Courses most similar to `course_id` by positive cosine similarity.
    ///
    /// An unknown course id gives an empty list.
    #[instrument(skip(self))]
    pub fn similar_courses(&self, course_id: &str, top_n: usize) -> Result<Vec<ScoredEntry>> {
        self.similarity.clear();
        let matrix = InteractionMatrix::load(self.source.as_ref(), &self.config.admin_id)?;

        let Some(target) = matrix.course_idx(course_id) else {
            debug!("Course {} is not in the current load", course_id);
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(CourseIdx, f64)> = (0..matrix.num_courses())
            .filter(|&other| other != target)
            .map(|other| (other, self.similarity.course_similarity(&matrix, target, other)))
            .filter(|(_, similarity)| *similarity > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_n);

        Ok(ranked
            .into_iter()
            .filter_map(|(idx, score)| {
                matrix
                    .course(idx)
                    .map(|course| ScoredEntry::new(course.id.clone(), score))
            })
            .collect())
    }

    /// Recommendations as normalized chart datasets.
    ///
    /// Course scores are rescaled into [`COURSE_SCORE_RANGE`], student
    /// similarities into [`PERSON_SCORE_RANGE`].
    pub fn chart_payload(
        &self,
        student_id: &str,
        top_n_courses: usize,
        top_n_students: usize,
    ) -> Result<ChartPayload> {
        let recommendations = self.get_recommendations(student_id, top_n_courses, top_n_students)?;
        Ok(chart_payload(&recommendations))
    }
}

/// Build normalized course and person charts from a result
pub fn chart_payload(recommendations: &Recommendations) -> ChartPayload {
    let course = to_chart_format(&recommendations.courses, &recommendations.course_names);
    let person = to_chart_format(&recommendations.students, &recommendations.student_names);

    let (course_low, course_high) = COURSE_SCORE_RANGE;
    let (person_low, person_high) = PERSON_SCORE_RANGE;
    ChartPayload {
        course: normalize(course, course_low, course_high),
        person: normalize(person, person_low, person_high),
    }
}

/// `ratio * 0.6 + closeness * 0.4` for two students sharing a course.
///
/// - `ratio`: shared courses over the smaller of the two histories
/// - `closeness`: `max(0, 1 - MAE / 5)` over shared courses
fn blended_similarity(matrix: &InteractionMatrix, a: StudentIdx, b: StudentIdx) -> Option<f64> {
    let scores = matrix.scores();
    let shared: Vec<(f64, f64)> = scores
        .row(a)
        .iter()
        .zip(scores.row(b).iter())
        .filter(|(x, y)| **x > 0.0 && **y > 0.0)
        .map(|(x, y)| (*x, *y))
        .collect();
    if shared.is_empty() {
        return None;
    }

    let smaller = matrix.scored_count(a).min(matrix.scored_count(b));
    let ratio = shared.len() as f64 / smaller as f64;
    let mae = shared.iter().map(|(x, y)| (x - y).abs()).sum::<f64>() / shared.len() as f64;
    let closeness = (1.0 - mae / data_loader::MAX_SCORE).max(0.0);

    Some(ratio * SHARED_RATIO_WEIGHT + closeness * CLOSENESS_WEIGHT)
}
