//! Helper functions to build a StudentContext from an InteractionMatrix
//!
//! Gathers the per-student facts every strategy needs once, up front, so
//! ranking does not keep re-scanning matrix rows.

use anyhow::{anyhow, Result};
use data_loader::{CourseIdx, InteractionMatrix, StudentIdx};
use std::collections::HashSet;

/// Per-request view of the student being served
#[derive(Debug, Clone, PartialEq)]
pub struct StudentContext {
    pub student_idx: StudentIdx,
    pub student_id: String,
    pub major: Option<String>,
    /// Courses with a nonzero score
    pub taken_courses: HashSet<CourseIdx>,
}

impl StudentContext {
    pub fn new(student_idx: StudentIdx, student_id: impl Into<String>) -> Self {
        Self {
            student_idx,
            student_id: student_id.into(),
            major: None,
            taken_courses: HashSet::new(),
        }
    }

    pub fn scored_count(&self) -> usize {
        self.taken_courses.len()
    }

    /// Fewer than `threshold` scored courses
    pub fn is_cold_start(&self, threshold: usize) -> bool {
        self.scored_count() < threshold
    }

    pub fn has_taken(&self, course: CourseIdx) -> bool {
        self.taken_courses.contains(&course)
    }
}

/// Build a StudentContext for a student id in the loaded matrix
pub fn build_student_context(matrix: &InteractionMatrix, student_id: &str) -> Result<StudentContext> {
    let student_idx = matrix
        .student_idx(student_id)
        .ok_or_else(|| anyhow!("Student {} not found", student_id))?;
    let student = matrix
        .student(student_idx)
        .ok_or_else(|| anyhow!("Student index {} out of range", student_idx))?;

    let mut context = StudentContext::new(student_idx, student_id);
    context.major = student.major.clone();

    context.taken_courses = matrix.taken_courses(student_idx).into_iter().collect();

    Ok(context)
}
