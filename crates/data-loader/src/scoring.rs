//! Preference scoring.
//!
//! Converts a raw `(grade, rating)` pair into a preference score in
//! `(0, 5]`. Zero is never produced: it is reserved in the matrix for
//! "never took the course".

/// Score assigned when a course was taken but carries no usable feedback
pub const NEUTRAL_SCORE: f64 = 2.0;

/// Upper bound of every preference score
pub const MAX_SCORE: f64 = 5.0;

/// Weight applied to the 0-5 rating
pub const RATING_WEIGHT: f64 = 0.4;

/// Valid rating range
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Compute the preference score for one interaction.
///
/// Grade bands give the base: `>=90 -> 3.0`, `>=80 -> 2.5`, `>=70 -> 2.0`,
/// `>=60 -> 1.5`, otherwise `1.0`. A rating, clamped into `[0, 5]`, adds
/// `rating * 0.4`. With no usable signal the score is [`NEUTRAL_SCORE`].
/// The result is capped at [`MAX_SCORE`].
pub fn preference_score(grade: Option<f64>, rating: Option<f64>) -> f64 {
    let mut score = 0.0;

    if let Some(grade) = grade.filter(|g| g.is_finite()) {
        score += grade_band(grade);
    }

    if let Some(rating) = rating.filter(|r| r.is_finite()) {
        score += rating.clamp(MIN_RATING, MAX_RATING) * RATING_WEIGHT;
    }

    // A zero (or negative) total cannot be stored: it would read as "not taken"
    if score <= 0.0 {
        score = NEUTRAL_SCORE;
    }

    score.min(MAX_SCORE)
}

fn grade_band(grade: f64) -> f64 {
    if grade >= 90.0 {
        3.0
    } else if grade >= 80.0 {
        2.5
    } else if grade >= 70.0 {
        2.0
    } else if grade >= 60.0 {
        1.5
    } else {
        1.0
    }
}
