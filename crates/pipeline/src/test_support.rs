//! Fixtures shared by the pipeline unit tests.

use data_loader::{
    Course, DataSource, InMemorySource, Interaction, InteractionMatrix, Student, DEFAULT_ADMIN_ID,
};
use sources::{
    build_student_context, CatalogRules, RankingContext, Route, SimilarityEngine, StudentContext,
};

pub(crate) struct TestBed {
    pub source: InMemorySource,
    pub matrix: InteractionMatrix,
    pub similarity: SimilarityEngine,
    pub rules: CatalogRules,
}

impl TestBed {
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

    pub fn idx(&self, course_id: &str) -> usize {
        self.matrix.course_idx(course_id).unwrap()
    }
}

/// s1 took C1 and C2; C3 and C4 are electives, C5 is core.
pub(crate) fn small_catalog() -> InMemorySource {
    InMemorySource::new()
        .with_student(Student::new("s1", "Alice").with_major("CS"))
        .with_student(Student::new("s2", "Bob").with_major("CS"))
        .with_course(Course::new("C1", "Programming", "Core"))
        .with_course(Course::new("C2", "Networks", "Professional Elective"))
        .with_course(Course::new("C3", "Compilers", "Professional Elective"))
        .with_course(Course::new("C4", "Graphics", "Professional Elective (Media)"))
        .with_course(Course::new("C5", "Physics", "Core"))
        .with_interaction(Interaction::new("s1", "C1").with_grade(88.0))
        .with_interaction(Interaction::new("s1", "C2").with_grade(91.0))
        .with_interaction(Interaction::new("s2", "C3").with_grade(77.0))
}
