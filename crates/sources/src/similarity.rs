//! Similarity Engine
//!
//! Pairwise similarity between students (Pearson correlation over shared
//! courses) and between courses (cosine over full column vectors), each
//! memoized by an unordered index pair.
//!
//! ## Cache lifetime
//! Indices are only valid for one loaded matrix, so the owner must call
//! [`SimilarityEngine::clear`] before serving a new request. Within one
//! request the caches let the course ranking and the similar-student
//! ranking share computed pairs.
//!
//! The caches use `RefCell`: the engine is `!Sync` and cannot be shared
//! across threads with a warm cache.

use data_loader::{CourseIdx, InteractionMatrix, StudentIdx};
use std::cell::RefCell;
use std::collections::HashMap;

/// Similarity returned when two students share exactly one course
pub const SINGLE_OVERLAP_SIMILARITY: f64 = 0.1;

/// Canonical `(min, max)` cache key
fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Pearson correlation over the entries where both vectors are nonzero.
///
/// - no shared entries: `0.0`
/// - exactly one shared entry: [`SINGLE_OVERLAP_SIMILARITY`]
/// - zero variance in either masked vector: `0.0`
pub fn pearson_correlation<'a, A, B>(a: A, b: B) -> f64
where
    A: IntoIterator<Item = &'a f64>,
    B: IntoIterator<Item = &'a f64>,
{
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .into_iter()
        .zip(b)
        .filter(|(x, y)| **x != 0.0 && **y != 0.0)
        .map(|(x, y)| (*x, *y))
        .unzip();

    match xs.len() {
        0 => return 0.0,
        1 => return SINGLE_OVERLAP_SIMILARITY,
        _ => {}
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numerator += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Cosine similarity of two full vectors; `0.0` if either has zero norm
pub fn cosine_similarity<'a, A, B>(a: A, b: B) -> f64
where
    A: IntoIterator<Item = &'a f64>,
    B: IntoIterator<Item = &'a f64>,
{
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.into_iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Memoizing similarity calculator
#[derive(Debug, Default)]
pub struct SimilarityEngine {
    student_cache: RefCell<HashMap<(StudentIdx, StudentIdx), f64>>,
    course_cache: RefCell<HashMap<(CourseIdx, CourseIdx), f64>>,
}

impl SimilarityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached pair
    pub fn clear(&self) {
        self.student_cache.borrow_mut().clear();
        self.course_cache.borrow_mut().clear();
    }

    /// (student pairs, course pairs) currently cached
    pub fn cache_sizes(&self) -> (usize, usize) {
        (
            self.student_cache.borrow().len(),
            self.course_cache.borrow().len(),
        )
    }

    /// Pearson similarity between two students' score rows
    pub fn student_similarity(
        &self,
        matrix: &InteractionMatrix,
        a: StudentIdx,
        b: StudentIdx,
    ) -> f64 {
        let key = pair_key(a, b);
        if let Some(&cached) = self.student_cache.borrow().get(&key) {
            return cached;
        }

        let scores = matrix.scores();
        let similarity = pearson_correlation(scores.row(a).iter(), scores.row(b).iter());
        self.student_cache.borrow_mut().insert(key, similarity);
        similarity
    }

    /// Cosine similarity between two courses' score columns
    pub fn course_similarity(
        &self,
        matrix: &InteractionMatrix,
        a: CourseIdx,
        b: CourseIdx,
    ) -> f64 {
        let key = pair_key(a, b);
        if let Some(&cached) = self.course_cache.borrow().get(&key) {
            return cached;
        }

        let scores = matrix.scores();
        let similarity = cosine_similarity(scores.column(a).iter(), scores.column(b).iter());
        self.course_cache.borrow_mut().insert(key, similarity);
        similarity
    }
}
