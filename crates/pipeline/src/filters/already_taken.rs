//! Filter to remove courses the student has already taken.
//!
//! This is always the first filter in the pipeline: a course with a
//! nonzero score is never a recommendation.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::CourseIdx;
use sources::RankingContext;

/// Removes courses the student has a nonzero score for.
///
/// ## Algorithm
/// Uses the HashSet in StudentContext.taken_courses for O(1) lookups.
pub struct AlreadyTakenFilter;

impl Filter for AlreadyTakenFilter {
    fn name(&self) -> &str {
        "AlreadyTakenFilter"
    }

    fn apply(&self, pool: Vec<CourseIdx>, ctx: &RankingContext<'_>) -> Result<Vec<CourseIdx>> {
        Ok(pool
            .into_iter()
            .filter(|course| !ctx.student.has_taken(*course))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{small_catalog, TestBed};
    use sources::Route;

    #[test]
    fn test_already_taken_filter() {
        let bed = TestBed::new(small_catalog());
        let student = bed.student("s1");
        let ctx = bed.context(&student, Route::ColdStart, 10);

        let pool: Vec<CourseIdx> = (0..bed.matrix.num_courses()).collect();
        let filtered = AlreadyTakenFilter.apply(pool, &ctx).unwrap();

        assert_eq!(filtered, vec![bed.idx("C3"), bed.idx("C4"), bed.idx("C5")]);
    }
}
