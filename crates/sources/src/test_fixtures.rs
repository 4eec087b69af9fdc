//! Shared fixtures for strategy tests.

use crate::similarity::SimilarityEngine;
use crate::types::{CatalogRules, RankingContext, Route};
use crate::user_context::{build_student_context, StudentContext};
use data_loader::{
    Course, CourseIdx, DataSource, InMemorySource, Interaction, InteractionMatrix, Student,
    DEFAULT_ADMIN_ID,
};

pub(crate) struct Fixture {
    pub source: InMemorySource,
    pub matrix: InteractionMatrix,
    pub similarity: SimilarityEngine,
    pub rules: CatalogRules,
}

impl Fixture {
    pub fn new(source: InMemorySource) -> Self {
        let matrix = InteractionMatrix::load(&source, DEFAULT_ADMIN_ID).unwrap();
        Self {
            source,
            matrix,
            similarity: SimilarityEngine::new(),
            rules: CatalogRules::default(),
        }
    }

    pub fn student(&self, id: &str) -> StudentContext {
        build_student_context(&self.matrix, id).unwrap()
    }

    pub fn context<'a>(
        &'a self,
        student: &'a StudentContext,
        route: Route,
        limit: usize,
    ) -> RankingContext<'a> {
        RankingContext {
            matrix: &self.matrix,
            similarity: &self.similarity,
            student,
            source: &self.source as &dyn DataSource,
            rules: &self.rules,
            route,
            limit,
        }
    }

    /// Every course the student has not taken
    pub fn unrated_pool(&self, student: &StudentContext) -> Vec<CourseIdx> {
        (0..self.matrix.num_courses())
            .filter(|&c| !student.has_taken(c))
            .collect()
    }

    pub fn course_idx(&self, id: &str) -> CourseIdx {
        self.matrix.course_idx(id).unwrap()
    }
}

/// Three students, five courses.
///
/// - s1: C1=3.0, C2=2.0, C3=2.5
/// - s2: C1=3.0, C2=2.0, C3=2.5, C4=4.2
/// - s3: C1=3.0, C2=1.5, C3=2.0, C4=2.0
///
/// C4 and C5 are professional electives; nobody has taken C5.
pub(crate) fn three_student_source() -> InMemorySource {
    InMemorySource::new()
        .with_student(Student::new("admin", "Administrator"))
        .with_student(Student::new("s1", "Alice").with_major("CS"))
        .with_student(Student::new("s2", "Bob").with_major("CS"))
        .with_student(Student::new("s3", "Carol").with_major("EE"))
        .with_course(Course::new("C1", "Programming", "Core"))
        .with_course(Course::new("C2", "Discrete Math", "Core"))
        .with_course(Course::new("C3", "Data Structures", "Core"))
        .with_course(Course::new("C4", "Machine Learning", "Professional Elective"))
        .with_course(
            Course::new("C5", "Compilers", "Professional Elective").with_owning_major("CS"),
        )
        .with_interaction(Interaction::new("s1", "C1").with_grade(95.0))
        .with_interaction(Interaction::new("s1", "C2").with_grade(75.0))
        .with_interaction(Interaction::new("s1", "C3").with_grade(85.0))
        .with_interaction(Interaction::new("s2", "C1").with_grade(95.0))
        .with_interaction(Interaction::new("s2", "C2").with_grade(75.0))
        .with_interaction(Interaction::new("s2", "C3").with_grade(85.0))
        .with_interaction(Interaction::new("s2", "C4").with_grade(95.0).with_rating(3.0))
        .with_interaction(Interaction::new("s3", "C1").with_grade(90.0))
        .with_interaction(Interaction::new("s3", "C2").with_grade(65.0))
        .with_interaction(Interaction::new("s3", "C3").with_grade(70.0))
        .with_interaction(Interaction::new("s3", "C4").with_rating(5.0))
}
