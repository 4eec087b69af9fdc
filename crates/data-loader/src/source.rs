//! The data-access collaborator.
//!
//! [`DataSource`] is the only way the engine reads students, courses and
//! choices. Two implementations ship with the crate:
//! - [`InMemorySource`]: plain vectors, for tests and embedding callers
//! - [`FileSource`]: a directory of `.dat` files, re-read on every call

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tabular reads the recommendation engine needs from the store.
///
/// `Send + Sync` lets a host share one source across request handlers;
/// the engine itself never holds data between requests.
pub trait DataSource: Send + Sync {
    /// All students (the administrative account may or may not be included)
    fn list_students(&self) -> Result<Vec<Student>>;

    /// Every course in the education plan
    fn list_courses(&self) -> Result<Vec<Course>>;

    /// Every (student, course, grade?, rating?) row
    fn list_interactions(&self) -> Result<Vec<Interaction>>;

    /// Students, courses and choices for one load.
    ///
    /// Fails if any of the three reads fails.
    fn list_all(&self) -> Result<(Vec<Student>, Vec<Course>, Vec<Interaction>)> {
        Ok((self.list_students()?, self.list_courses()?, self.list_interactions()?))
    }

    /// Ids of courses open to all majors or owned by `major`
    fn list_courses_for_major(&self, major: &str) -> Result<Vec<CourseId>> {
        Ok(self
            .list_courses()?
            .into_iter()
            .filter(|course| course.is_open_to(major))
            .map(|course| course.id)
            .collect())
    }
}

// =============================================================================
// InMemorySource
// =============================================================================

/// Data source backed by in-memory vectors
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    students: Vec<Student>,
    courses: Vec<Course>,
    interactions: Vec<Interaction>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_student(&mut self, student: Student) {
        self.students.push(student);
    }

    pub fn insert_course(&mut self, course: Course) {
        self.courses.push(course);
    }

    pub fn insert_interaction(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    /// Builder form of [`insert_student`](Self::insert_student)
    pub fn with_student(mut self, student: Student) -> Self {
        self.insert_student(student);
        self
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.insert_course(course);
        self
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.insert_interaction(interaction);
        self
    }
}

impl DataSource for InMemorySource {
    fn list_students(&self) -> Result<Vec<Student>> {
        Ok(self.students.clone())
    }

    fn list_courses(&self) -> Result<Vec<Course>> {
        Ok(self.courses.clone())
    }

    fn list_interactions(&self) -> Result<Vec<Interaction>> {
        Ok(self.interactions.clone())
    }
}

// =============================================================================
// FileSource
// =============================================================================

/// Data source reading `students.dat`, `courses.dat` and `choices.dat`
/// from a directory. Files are re-read on every call so edits are picked
/// up by the next request.
#[derive(Debug, Clone)]
pub struct FileSource {
    data_dir: PathBuf,
}

impl FileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn students_path(&self) -> PathBuf {
        self.data_dir.join("students.dat")
    }

    fn courses_path(&self) -> PathBuf {
        self.data_dir.join("courses.dat")
    }

    fn choices_path(&self) -> PathBuf {
        self.data_dir.join("choices.dat")
    }

    /// Parse all three files in parallel
    pub fn read_all(&self) -> Result<(Vec<Student>, Vec<Course>, Vec<Interaction>)> {
        let students_path = self.students_path();
        let courses_path = self.courses_path();
        let choices_path = self.choices_path();

        // Nest joins to get three-way parallelism
        let ((students, courses), choices) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_students(&students_path),
                    || parser::parse_courses(&courses_path),
                )
            },
            || parser::parse_choices(&choices_path),
        );

        let students = students?;
        let courses = courses?;
        let choices = choices?;

        debug!(
            "Read {} students, {} courses, {} choices from {:?}",
            students.len(),
            courses.len(),
            choices.len(),
            self.data_dir
        );
        Ok((students, courses, choices))
    }
}

impl DataSource for FileSource {
    fn list_all(&self) -> Result<(Vec<Student>, Vec<Course>, Vec<Interaction>)> {
        self.read_all()
    }

    fn list_students(&self) -> Result<Vec<Student>> {
        parser::parse_students(&self.students_path())
    }

    fn list_courses(&self) -> Result<Vec<Course>> {
        parser::parse_courses(&self.courses_path())
    }

    fn list_interactions(&self) -> Result<Vec<Interaction>> {
        parser::parse_choices(&self.choices_path())
    }
}
