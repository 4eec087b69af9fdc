//! Core domain types for the course catalog.
//!
//! External ids (`StudentId`, `CourseId`) are stable strings owned by the
//! backing store. Dense indices (`StudentIdx`, `CourseIdx`) are assigned on
//! every load and are only meaningful for the [`InteractionMatrix`] that
//! produced them.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable external identifier of a student (e.g. a student number)
pub type StudentId = String;

/// Stable external identifier of a course
pub type CourseId = String;

/// Dense row index into a loaded [`InteractionMatrix`]
pub type StudentIdx = usize;

/// Dense column index into a loaded [`InteractionMatrix`]
pub type CourseIdx = usize;

// =============================================================================
// Entities
// =============================================================================

/// A student enrolled in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Declared major; `None` when the student has not declared one
    pub major: Option<String>,
    /// Admission cohort (year)
    pub cohort: Option<u16>,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            major: None,
            cohort: None,
        }
    }

    /// Set the declared major. Blank strings count as "no major".
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = non_blank(major.into());
        self
    }

    pub fn with_cohort(mut self, cohort: u16) -> Self {
        self.cohort = Some(cohort);
        self
    }
}

/// A course in the education plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Category string such as "Professional Elective (AI)"
    pub classification: String,
    /// Major that owns the course; `None` means open to all majors
    pub owning_major: Option<String>,
}

impl Course {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        classification: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            classification: classification.into(),
            owning_major: None,
        }
    }

    pub fn with_owning_major(mut self, major: impl Into<String>) -> Self {
        self.owning_major = non_blank(major.into());
        self
    }

    /// Whether students of `major` may take this course
    pub fn is_open_to(&self, major: &str) -> bool {
        match &self.owning_major {
            None => true,
            Some(owner) => owner == major,
        }
    }
}

/// A student took (or selected) a course, with optional feedback
///
/// The existence of the row is the signal; grade and rating only refine it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Numeric grade, usually 0-100
    pub grade: Option<f64>,
    /// Satisfaction rating, 0-5
    pub rating: Option<f64>,
}

impl Interaction {
    pub fn new(student_id: impl Into<String>, course_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            course_id: course_id.into(),
            grade: None,
            rating: None,
        }
    }

    pub fn with_grade(mut self, grade: f64) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }
}

pub(crate) fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// InteractionMatrix - the per-request preference snapshot
// =============================================================================

/// Dense student x course preference matrix plus both id mappings.
///
/// A cell holds a preference score in `(0, 5]`; `0.0` means the student
/// never took the course. The matrix is built whole by
/// `InteractionMatrix::load` and never patched afterwards.
#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    /// index -> student
    pub(crate) students: Vec<Student>,
    /// index -> course
    pub(crate) courses: Vec<Course>,
    /// shape (#students, #courses)
    pub(crate) scores: DMatrix<f64>,
    pub(crate) student_index: HashMap<StudentId, StudentIdx>,
    pub(crate) course_index: HashMap<CourseId, CourseIdx>,
}

impl InteractionMatrix {
    /// Create an empty matrix with no students and no courses
    pub fn new() -> Self {
        Self {
            students: Vec::new(),
            courses: Vec::new(),
            scores: DMatrix::zeros(0, 0),
            student_index: HashMap::new(),
            course_index: HashMap::new(),
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn scores(&self) -> &DMatrix<f64> {
        &self.scores
    }

    pub fn student(&self, idx: StudentIdx) -> Option<&Student> {
        self.students.get(idx)
    }

    pub fn course(&self, idx: CourseIdx) -> Option<&Course> {
        self.courses.get(idx)
    }

    pub fn student_idx(&self, id: &str) -> Option<StudentIdx> {
        self.student_index.get(id).copied()
    }

    pub fn course_idx(&self, id: &str) -> Option<CourseIdx> {
        self.course_index.get(id).copied()
    }

    pub fn num_students(&self) -> usize {
        self.students.len()
    }

    pub fn num_courses(&self) -> usize {
        self.courses.len()
    }

    /// Preference score of a student for a course (0.0 = no interaction)
    pub fn score(&self, student: StudentIdx, course: CourseIdx) -> f64 {
        self.scores[(student, course)]
    }

    /// Number of courses the student has a nonzero score for
    pub fn scored_count(&self, student: StudentIdx) -> usize {
        self.scores.row(student).iter().filter(|&&s| s > 0.0).count()
    }

    /// Courses the student has taken, as dense indices
    pub fn taken_courses(&self, student: StudentIdx) -> Vec<CourseIdx> {
        self.scores
            .row(student)
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > 0.0)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Students with a nonzero score for the course
    pub fn scorers_of(&self, course: CourseIdx) -> Vec<StudentIdx> {
        self.scores
            .column(course)
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > 0.0)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Popularity = number of students who took the course
    pub fn popularity(&self, course: CourseIdx) -> usize {
        self.scores.column(course).iter().filter(|&&s| s > 0.0).count()
    }

    /// Get counts for debugging/validation: (students, courses, interactions)
    pub fn counts(&self) -> (usize, usize, usize) {
        let interactions = self.scores.iter().filter(|&&s| s > 0.0).count();
        (self.students.len(), self.courses.len(), interactions)
    }
}

impl Default for InteractionMatrix {
    fn default() -> Self {
        Self::new()
    }
}
