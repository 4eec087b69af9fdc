//! Shared types for candidate ranking.

use crate::similarity::SimilarityEngine;
use crate::user_context::StudentContext;
use data_loader::{CourseIdx, DataSource, InteractionMatrix};
use serde::{Deserialize, Serialize};

/// Which strategy produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateSource {
    /// User-based collaborative filtering
    Collaborative,
    /// Major-aware popularity for students with little history
    ColdStart,
    /// Raw count of students who took the course
    Popularity,
}

/// Path chosen for a request after inspecting the student and population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Too little history for the student
    ColdStart,
    /// Fewer than two students in the system
    InsufficientPopulation,
    /// Enough data for similarity-weighted prediction
    Collaborative,
}

/// A scored course recommendation candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub course_idx: CourseIdx,
    pub source: CandidateSource,
    pub score: f64,
    pub metadata: CandidateMetadata,
}

/// Extra information about how a candidate was scored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateMetadata {
    /// Students who took the course before
    pub scorer_count: Option<usize>,
    /// Course is in the student's major pool
    pub is_major_course: bool,
    /// Sum of positive similarity weights behind a collaborative prediction
    pub similarity_weight: Option<f64>,
}

impl Candidate {
    pub fn new(course_idx: CourseIdx, source: CandidateSource, score: f64) -> Self {
        Self {
            course_idx,
            source,
            score,
            metadata: CandidateMetadata::default(),
        }
    }
}

/// Sort candidates by descending score and keep the top `limit`.
///
/// The sort is stable, so ties keep their input order; NaN compares equal.
pub fn rank_candidates(candidates: &mut Vec<Candidate>, limit: usize) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(limit);
}

/// Rules deciding which classifications are "recommendable"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRules {
    /// Classification prefix of the primary recommendable category
    pub elective_prefix: String,
    /// Substrings that mark a course as elective/optional when nothing
    /// matches the prefix
    pub elective_markers: Vec<String>,
}

impl Default for CatalogRules {
    fn default() -> Self {
        Self {
            elective_prefix: "Professional Elective".to_string(),
            elective_markers: vec!["Elective".to_string(), "Optional".to_string()],
        }
    }
}

impl CatalogRules {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            elective_prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elective_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Classification starts with the elective prefix
    pub fn is_primary_elective(&self, classification: &str) -> bool {
        !classification.is_empty() && classification.starts_with(&self.elective_prefix)
    }

    /// Classification contains any elective/optional marker
    pub fn is_any_elective(&self, classification: &str) -> bool {
        !classification.is_empty()
            && self
                .elective_markers
                .iter()
                .any(|marker| classification.contains(marker.as_str()))
    }
}

/// Everything a strategy may look at while ranking one request
pub struct RankingContext<'a> {
    pub matrix: &'a InteractionMatrix,
    pub similarity: &'a SimilarityEngine,
    pub student: &'a StudentContext,
    pub source: &'a dyn DataSource,
    pub rules: &'a CatalogRules,
    pub route: Route,
    /// Requested top-N
    pub limit: usize,
}

impl RankingContext<'_> {
    /// Classification of a course, empty when the index is unknown
    pub fn classification(&self, course: CourseIdx) -> &str {
        self.matrix
            .course(course)
            .map(|c| c.classification.as_str())
            .unwrap_or("")
    }
}
