//! Interaction loading.
//!
//! Builds an [`InteractionMatrix`] from the data-access collaborator:
//! - assign dense indices to every student (minus the admin account)
//! - assign dense indices to every course, taken or not
//! - score every choice row into its matrix cell
//!
//! The matrix is rebuilt from the source of truth on every request; nothing
//! here is cached.

use crate::error::Result;
use crate::scoring::preference_score;
use crate::source::DataSource;
use crate::types::*;
use nalgebra::DMatrix;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Account id excluded from every load unless configured otherwise
pub const DEFAULT_ADMIN_ID: &str = "admin";

impl InteractionMatrix {
    /// Load a fresh matrix from `source`.
    ///
    /// Any error from the source aborts the load; there is no partial
    /// matrix.
    #[instrument(skip(source))]
    pub fn load(source: &dyn DataSource, admin_id: &str) -> Result<Self> {
        let (students, courses, interactions) = source.list_all()?;

        Ok(Self::build(students, courses, interactions, admin_id))
    }

    /// Build a matrix from already-fetched rows
    pub fn build(
        students: Vec<Student>,
        courses: Vec<Course>,
        interactions: Vec<Interaction>,
        admin_id: &str,
    ) -> Self {
        let students: Vec<Student> = students
            .into_iter()
            .filter(|student| student.id != admin_id)
            .collect();

        let student_index: HashMap<StudentId, StudentIdx> = students
            .iter()
            .enumerate()
            .map(|(idx, student)| (student.id.clone(), idx))
            .collect();

        let course_index: HashMap<CourseId, CourseIdx> = courses
            .iter()
            .enumerate()
            .map(|(idx, course)| (course.id.clone(), idx))
            .collect();

        let mut scores = DMatrix::zeros(students.len(), courses.len());
        let mut skipped = 0usize;

        for row in &interactions {
            let (Some(&s), Some(&c)) = (
                student_index.get(&row.student_id),
                course_index.get(&row.course_id),
            ) else {
                skipped += 1;
                continue;
            };
            scores[(s, c)] = preference_score(row.grade, row.rating);
        }

        if skipped > 0 {
            warn!("Skipped {} interaction rows with unknown student or course", skipped);
        }

        debug!(
            "Loaded {} students, {} courses, {} interaction rows",
            students.len(),
            courses.len(),
            interactions.len() - skipped
        );

        Self {
            students,
            courses,
            scores,
            student_index,
            course_index,
        }
    }
}
