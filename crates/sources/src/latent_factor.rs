//! Latent Factor Recommender - the legacy SVD strategy
//!
//! Only used when the primary pipeline fails outright. Rankings may differ
//! from the collaborative path; it exists so a request still gets an
//! answer.
//!
//! ## Algorithm
//! 1. Thin SVD of the full preference matrix `M = U Σ Vᵀ`
//! 2. Keep the smallest `k` whose singular values cover 90% of their sum
//! 3. Item features `Mᵀ U_k Σ_k⁻¹`, student features `M V_k Σ_k⁻¹`
//! 4. Course estimate: average of the student's own scores, weighted by
//!    `1 / (1 + ‖item − rated_item‖)` in factor space
//! 5. Student similarity: `0.5 + 0.5 · cos` in factor space

use crate::similarity::cosine_similarity;
use anyhow::{anyhow, Result};
use data_loader::{CourseIdx, InteractionMatrix, StudentIdx};
use nalgebra::{DMatrix, DVector, SVD};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Share of the singular value sum the retained factors must cover
pub const DEFAULT_ENERGY_RATIO: f64 = 0.9;

/// Singular values below this are treated as zero when inverting
const SINGULAR_EPSILON: f64 = 1e-10;

/// Item and student projections into the reduced factor space
#[derive(Debug, Clone)]
pub struct Factorization {
    /// (#courses × k)
    pub item_features: DMatrix<f64>,
    /// (#students × k)
    pub student_features: DMatrix<f64>,
    /// Retained factor count
    pub rank: usize,
}

/// Course and student rankings produced by the legacy path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatentRecommendations {
    pub courses: Vec<(CourseIdx, f64)>,
    pub students: Vec<(StudentIdx, f64)>,
}

pub struct LatentFactorRecommender {
    energy_ratio: f64,
}

impl LatentFactorRecommender {
    pub fn new() -> Self {
        Self {
            energy_ratio: DEFAULT_ENERGY_RATIO,
        }
    }

    /// Configure the retained energy ratio (default: 0.9)
    pub fn with_energy_ratio(mut self, ratio: f64) -> Self {
        self.energy_ratio = ratio;
        self
    }

    /// Factorize the preference matrix
    pub fn factorize(&self, scores: &DMatrix<f64>) -> Result<Factorization> {
        if scores.nrows() == 0 || scores.ncols() == 0 {
            return Err(anyhow!(
                "Cannot factorize an empty {}x{} matrix",
                scores.nrows(),
                scores.ncols()
            ));
        }

        let svd = SVD::new(scores.clone(), true, true);
        let u = svd.u.as_ref().ok_or_else(|| anyhow!("SVD failed to compute U"))?;
        let v_t = svd.v_t.as_ref().ok_or_else(|| anyhow!("SVD failed to compute V^T"))?;
        let sigma = &svd.singular_values;

        // Largest singular values first
        let mut order: Vec<usize> = (0..sigma.len()).collect();
        order.sort_by(|&a, &b| sigma[b].partial_cmp(&sigma[a]).unwrap_or(Ordering::Equal));

        let sorted: Vec<f64> = order.iter().map(|&i| sigma[i]).collect();
        let rank = retained_rank(&sorted, self.energy_ratio);
        let kept = &order[..rank];

        let u_k = u.select_columns(kept.iter());
        let v_k = v_t.select_rows(kept.iter()).transpose();
        let sigma_inv = DMatrix::from_diagonal(&DVector::from_iterator(
            rank,
            kept.iter().map(|&i| {
                if sigma[i].abs() > SINGULAR_EPSILON {
                    1.0 / sigma[i]
                } else {
                    0.0
                }
            }),
        ));

        let item_features = scores.transpose() * &u_k * &sigma_inv;
        let student_features = scores * &v_k * &sigma_inv;

        debug!("Retained {} of {} factors", rank, sorted.len());
        Ok(Factorization {
            item_features,
            student_features,
            rank,
        })
    }

    /// Estimate `student`'s score for `course` from the courses they rated
    pub fn estimate(
        &self,
        factors: &Factorization,
        matrix: &InteractionMatrix,
        student: StudentIdx,
        course: CourseIdx,
    ) -> f64 {
        let target = factors.item_features.row(course);
        let mut sim_total = 0.0;
        let mut weighted_total = 0.0;

        for rated in matrix.taken_courses(student) {
            if rated == course {
                continue;
            }
            let distance = (&target - &factors.item_features.row(rated)).norm();
            let similarity = 1.0 / (1.0 + distance);
            sim_total += similarity;
            weighted_total += matrix.score(student, rated) * similarity;
        }

        if sim_total == 0.0 {
            return 0.0;
        }
        weighted_total / sim_total
    }

    /// Estimate every listed course, best first, at most `limit`
    fn rank_courses(
        &self,
        factors: &Factorization,
        matrix: &InteractionMatrix,
        student: StudentIdx,
        courses: &[CourseIdx],
        limit: usize,
    ) -> Vec<(CourseIdx, f64)> {
        let mut estimates: Vec<(CourseIdx, f64)> = courses
            .par_iter()
            .map(|&course| (course, self.estimate(factors, matrix, student, course)))
            .collect();
        sort_descending(&mut estimates, limit);
        estimates
    }

    /// Other students ranked by `0.5 + 0.5 · cos` in factor space
    pub fn similar_students(
        &self,
        factors: &Factorization,
        student: StudentIdx,
        limit: usize,
    ) -> Vec<(StudentIdx, f64)> {
        let features = &factors.student_features;
        let target = features.row(student);

        let mut ranked: Vec<(StudentIdx, f64)> = (0..features.nrows())
            .filter(|&other| other != student)
            .map(|other| {
                let cos = cosine_similarity(target.iter(), features.row(other).iter());
                (other, 0.5 + 0.5 * cos)
            })
            .collect();
        sort_descending(&mut ranked, limit);
        ranked
    }

    /// Full legacy recommendation for one student.
    ///
    /// A student with no unrated course gets an empty result.
    #[instrument(skip(self, matrix))]
    pub fn recommend(
        &self,
        matrix: &InteractionMatrix,
        student: StudentIdx,
        top_n_courses: usize,
        top_n_students: usize,
    ) -> Result<LatentRecommendations> {
        if student >= matrix.num_students() {
            return Err(anyhow!("Student index {} out of range", student));
        }

        let unrated: Vec<CourseIdx> = (0..matrix.num_courses())
            .filter(|&c| matrix.score(student, c) == 0.0)
            .collect();
        if unrated.is_empty() {
            debug!("No unrated courses for student index {}", student);
            return Ok(LatentRecommendations::default());
        }

        let factors = self.factorize(matrix.scores())?;
        let courses = self.rank_courses(&factors, matrix, student, &unrated, top_n_courses);
        let students = self.similar_students(&factors, student, top_n_students);

        Ok(LatentRecommendations { courses, students })
    }
}

impl Default for LatentFactorRecommender {
    fn default() -> Self {
        Self::new()
    }
}

/// Smallest factor count whose cumulative sum reaches `ratio` of the total.
///
/// `sorted` must be descending. Always at least 1.
fn retained_rank(sorted: &[f64], ratio: f64) -> usize {
    let total: f64 = sorted.iter().sum();
    let target = total * ratio;

    let mut cumulative = 0.0;
    let mut k = 0;
    while k < sorted.len() && cumulative < target {
        cumulative += sorted[k];
        k += 1;
    }
    k.clamp(1, sorted.len().max(1))
}

fn sort_descending<T>(entries: &mut Vec<(T, f64)>, limit: usize) {
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    entries.truncate(limit);
}
