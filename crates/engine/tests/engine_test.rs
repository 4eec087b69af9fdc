//! End-to-end tests for the recommendation engine.

use data_loader::{
    Course, CourseId, DataLoadError, DataSource, InMemorySource, Interaction, Student,
};
use engine::{EngineConfig, Outcome, RecommendError, RecommendationEngine};
use sources::{CandidateSource, Route};
use std::sync::Arc;

/// Wraps an in-memory source and fails selected operations on demand
struct FlakySource {
    inner: InMemorySource,
    fail_major_lookup: bool,
    fail_interactions: bool,
}

impl FlakySource {
    fn new(inner: InMemorySource) -> Self {
        Self {
            inner,
            fail_major_lookup: false,
            fail_interactions: false,
        }
    }
}

impl DataSource for FlakySource {
    fn list_students(&self) -> data_loader::Result<Vec<Student>> {
        self.inner.list_students()
    }

    fn list_courses(&self) -> data_loader::Result<Vec<Course>> {
        self.inner.list_courses()
    }

    fn list_interactions(&self) -> data_loader::Result<Vec<Interaction>> {
        if self.fail_interactions {
            return Err(DataLoadError::SourceUnavailable("choices table locked".to_string()));
        }
        self.inner.list_interactions()
    }

    fn list_courses_for_major(&self, major: &str) -> data_loader::Result<Vec<CourseId>> {
        if self.fail_major_lookup {
            return Err(DataLoadError::SourceUnavailable(format!("major {} unavailable", major)));
        }
        self.inner.list_courses_for_major(major)
    }
}

/// Three students with history, five courses; C4 and C5 are electives
fn create_test_source() -> InMemorySource {
    InMemorySource::new()
        .with_student(Student::new("admin", "Administrator"))
        .with_student(Student::new("s1", "Alice").with_major("CS"))
        .with_student(Student::new("s2", "Bob").with_major("CS"))
        .with_student(Student::new("s3", "Carol").with_major("EE"))
        .with_course(Course::new("C1", "Programming", "Core"))
        .with_course(Course::new("C2", "Discrete Math", "Core"))
        .with_course(Course::new("C3", "Data Structures", "Core"))
        .with_course(Course::new("C4", "Machine Learning", "Professional Elective"))
        .with_course(Course::new("C5", "Compilers", "Professional Elective").with_owning_major("CS"))
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
        .with_interaction(Interaction::new("admin", "C5").with_grade(100.0))
}

fn engine_for(source: impl DataSource + 'static) -> RecommendationEngine {
    RecommendationEngine::with_defaults(Arc::new(source))
}

#[test]
fn test_unknown_student_is_empty_not_error() {
    let engine = engine_for(create_test_source());
    let result = engine.get_recommendations("s999", 5, 5).unwrap();

    assert_eq!(result.outcome, Outcome::UnknownStudent);
    assert!(result.is_empty());
}

#[test]
fn test_admin_is_unknown() {
    let engine = engine_for(create_test_source());
    let result = engine.get_recommendations("admin", 5, 5).unwrap();
    assert_eq!(result.outcome, Outcome::UnknownStudent);
}

#[test]
fn test_empty_catalog_is_empty_not_error() {
    let source = InMemorySource::new().with_student(Student::new("s1", "Alice").with_major("CS"));
    let engine = engine_for(source);
    let result = engine.get_recommendations("s1", 5, 5).unwrap();

    assert_eq!(result.outcome, Outcome::EmptyCatalog);
    assert!(result.is_empty());
}

#[test]
fn test_collaborative_top_entry_is_weighted_average() {
    let engine = engine_for(create_test_source());
    let result = engine.get_recommendations("s1", 5, 5).unwrap();

    assert_eq!(
        result.outcome,
        Outcome::Ranked {
            route: Route::Collaborative,
            source: Some(CandidateSource::Collaborative),
        }
    );

    // r(s1, s2) = 1, r(s1, s3) = 0.75 / sqrt(0.5 * 7/6)
    let r13 = 0.75 / (0.5_f64 * 7.0 / 6.0).sqrt();
    let expected = (4.2 + r13 * 2.0) / (1.0 + r13);

    assert_eq!(result.courses[0].id, "C4");
    assert!((result.courses[0].score - expected).abs() < 1e-9);
    assert_eq!(result.courses[1].id, "C5");
    assert_eq!(result.courses[1].score, 3.0);
    assert_eq!(result.course_names["C4"], "Machine Learning");
}

#[test]
fn test_zero_history_student_with_major() {
    let source = create_test_source().with_student(Student::new("s4", "Dave").with_major("CS"));
    let engine = engine_for(source);

    for top_n in [0, 1, 2, 10] {
        let result = engine.get_recommendations("s4", top_n, top_n).unwrap();
        assert!(result.courses.len() <= top_n);
        assert!(result.students.len() <= top_n);
        if top_n > 0 {
            assert_eq!(
                result.outcome,
                Outcome::Ranked {
                    route: Route::ColdStart,
                    source: Some(CandidateSource::ColdStart),
                }
            );
        }
    }
}

#[test]
fn test_exhausted_student_gets_empty_course_list() {
    let mut source = create_test_source();
    source.insert_interaction(Interaction::new("s2", "C5").with_grade(80.0));
    let engine = engine_for(source);

    let result = engine.get_recommendations("s2", 5, 5).unwrap();
    assert!(result.courses.is_empty());
    assert!(!result.students.is_empty());
    assert!(matches!(result.outcome, Outcome::Ranked { source: None, .. }));
}

/// One student with three core courses and one untaken elective
fn lone_student_source(major: Option<&str>) -> InMemorySource {
    let mut student = Student::new("s1", "Alice");
    if let Some(major) = major {
        student = student.with_major(major);
    }
    InMemorySource::new()
        .with_student(Student::new("admin", "Administrator"))
        .with_student(student)
        .with_course(Course::new("C1", "Programming", "Core"))
        .with_course(Course::new("C2", "Discrete Math", "Core"))
        .with_course(Course::new("C3", "Data Structures", "Core"))
        .with_course(Course::new("C4", "Machine Learning", "Professional Elective"))
        .with_interaction(Interaction::new("s1", "C1").with_grade(95.0))
        .with_interaction(Interaction::new("s1", "C2").with_grade(75.0))
        .with_interaction(Interaction::new("s1", "C3").with_grade(85.0))
        .with_interaction(Interaction::new("admin", "C4").with_grade(100.0))
}

#[test]
fn test_lone_student_with_major_gets_cold_start() {
    let engine = engine_for(lone_student_source(Some("CS")));
    let result = engine.get_recommendations("s1", 5, 5).unwrap();

    assert_eq!(
        result.outcome,
        Outcome::Ranked {
            route: Route::InsufficientPopulation,
            source: Some(CandidateSource::ColdStart),
        }
    );
    // Nobody else took C4: popularity 0, base 1, major boost 10
    assert_eq!(result.courses.len(), 1);
    assert_eq!(result.courses[0].id, "C4");
    assert_eq!(result.courses[0].score, 11.0);
    assert!(result.students.is_empty());
}

#[test]
fn test_lone_student_without_major_gets_nothing() {
    let engine = engine_for(lone_student_source(None));
    let result = engine.get_recommendations("s1", 5, 5).unwrap();

    // Popularity only ranks courses someone has scored
    assert_eq!(
        result.outcome,
        Outcome::Ranked {
            route: Route::InsufficientPopulation,
            source: None,
        }
    );
    assert!(result.is_empty());
}

#[test]
fn test_collaborative_route_falls_through_to_cold_start() {
    // No course carries the primary elective prefix
    let source = InMemorySource::new()
        .with_student(Student::new("s1", "Alice").with_major("CS"))
        .with_student(Student::new("s2", "Bob").with_major("CS"))
        .with_course(Course::new("C1", "Programming", "Core"))
        .with_course(Course::new("C2", "Discrete Math", "Core"))
        .with_course(Course::new("C3", "Data Structures", "Core"))
        .with_course(Course::new("C4", "Film Studies", "General Elective"))
        .with_course(Course::new("C5", "Public Speaking", "Optional Seminar"))
        .with_interaction(Interaction::new("s1", "C1").with_grade(95.0))
        .with_interaction(Interaction::new("s1", "C2").with_grade(75.0))
        .with_interaction(Interaction::new("s1", "C3").with_grade(85.0))
        .with_interaction(Interaction::new("s2", "C1").with_grade(90.0))
        .with_interaction(Interaction::new("s2", "C2").with_grade(70.0))
        .with_interaction(Interaction::new("s2", "C4").with_rating(4.0));
    let engine = engine_for(source);

    let result = engine.get_recommendations("s1", 5, 5).unwrap();
    assert_eq!(
        result.outcome,
        Outcome::Ranked {
            route: Route::Collaborative,
            source: Some(CandidateSource::ColdStart),
        }
    );
    let ids: Vec<&str> = result.courses.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["C4", "C5"]);
    assert_eq!(result.courses[0].score, 12.0);
    assert_eq!(result.courses[1].score, 11.0);
}

#[test]
fn test_similar_students_exclude_self() {
    let engine = engine_for(create_test_source());
    for student in ["s1", "s2", "s3"] {
        let result = engine.get_recommendations(student, 5, 5).unwrap();
        assert!(result.students.iter().all(|entry| entry.id != student));
        assert!(result.students.iter().all(|entry| entry.score > 0.0));
        for pair in result.students.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn test_similar_students_blended_fallback() {
    // s1 and s2 disagree completely on two shared courses; s3 shares nothing
    let source = InMemorySource::new()
        .with_student(Student::new("s1", "Alice"))
        .with_student(Student::new("s2", "Bob"))
        .with_student(Student::new("s3", "Carol"))
        .with_course(Course::new("C1", "A", "Core"))
        .with_course(Course::new("C2", "B", "Core"))
        .with_course(Course::new("C3", "C", "Core"))
        .with_interaction(Interaction::new("s1", "C1").with_grade(95.0))
        .with_interaction(Interaction::new("s1", "C2").with_grade(50.0))
        .with_interaction(Interaction::new("s2", "C1").with_grade(50.0))
        .with_interaction(Interaction::new("s2", "C2").with_grade(95.0))
        .with_interaction(Interaction::new("s3", "C3").with_grade(95.0));
    let engine = engine_for(source);

    let result = engine.get_recommendations("s1", 5, 5).unwrap();

    // ratio 2/2 = 1, MAE = 2.0, closeness = 0.6
    assert_eq!(result.students.len(), 1);
    assert_eq!(result.students[0].id, "s2");
    assert!((result.students[0].score - (0.6 + 0.6 * 0.4)).abs() < 1e-12);
    assert_eq!(result.student_names["s2"], "Bob");
}

#[test]
fn test_legacy_fallback_when_primary_fails() {
    let mut source = FlakySource::new(
        create_test_source().with_student(Student::new("s4", "Dave").with_major("CS")),
    );
    source.fail_major_lookup = true;
    let engine = engine_for(source);

    let result = engine.get_recommendations("s4", 3, 2).unwrap();

    assert_eq!(result.outcome, Outcome::LegacyFallback);
    assert_eq!(result.courses.len(), 3);
    assert_eq!(result.students.len(), 2);
    assert!(result.students.iter().all(|entry| entry.id != "s4"));
}

#[test]
fn test_collaborative_path_survives_major_lookup_failure() {
    let mut source = FlakySource::new(create_test_source());
    source.fail_major_lookup = true;
    let engine = engine_for(source);

    // Collaborative ranks first, so cold start never queries the source
    let result = engine.get_recommendations("s1", 5, 5).unwrap();
    assert!(matches!(result.outcome, Outcome::Ranked { .. }));
}

#[test]
fn test_both_paths_failing_surfaces_both_messages() {
    let mut source = FlakySource::new(create_test_source());
    source.fail_interactions = true;
    let engine = engine_for(source);

    let err = engine.get_recommendations("s1", 5, 5).unwrap_err();
    match &err {
        RecommendError::ComputationFailure { primary, legacy } => {
            assert!(primary.contains("choices table locked"));
            assert!(legacy.contains("choices table locked"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("legacy fallback"));
}

#[test]
fn test_caches_are_cleared_per_request() {
    let engine = engine_for(create_test_source());

    engine.get_recommendations("s1", 5, 5).unwrap();
    let after_first = engine.similarity().cache_sizes();
    engine.get_recommendations("s1", 5, 5).unwrap();
    assert_eq!(engine.similarity().cache_sizes(), after_first);

    // Only s2's pairs remain after a request for s2
    engine.get_recommendations("s2", 5, 5).unwrap();
    assert_eq!(engine.similarity().cache_sizes().0, 2);
}

#[test]
fn test_similar_courses() {
    let engine = engine_for(create_test_source());

    let similar = engine.similar_courses("C1", 10).unwrap();
    assert!(similar.iter().all(|entry| entry.id != "C1"));
    assert!(similar.iter().all(|entry| entry.score > 0.0 && entry.score <= 1.0));
    // Nobody but the admin took C5
    assert!(similar.iter().all(|entry| entry.id != "C5"));
    assert_eq!(similar.len(), 3);

    assert!(engine.similar_courses("C999", 10).unwrap().is_empty());
}

#[test]
fn test_chart_payload_ranges() {
    let engine = engine_for(create_test_source());
    let payload = engine.chart_payload("s1", 5, 5).unwrap();

    assert_eq!(payload.course.scores(), vec![5.0, 1.0]);
    assert_eq!(payload.course.labels(), vec!["Machine Learning", "Compilers"]);
    for score in payload.person.scores() {
        assert!((0.0..=1.0).contains(&score));
    }
}

#[test]
fn test_custom_config_changes_route() {
    let config = EngineConfig::default().with_cold_start_threshold(10);
    let engine = RecommendationEngine::new(Arc::new(create_test_source()), config);

    let result = engine.get_recommendations("s1", 5, 5).unwrap();
    assert_eq!(
        result.outcome,
        Outcome::Ranked {
            route: Route::ColdStart,
            source: Some(CandidateSource::ColdStart),
        }
    );
}
