//! # Data Loader Crate
//!
//! This crate reads the course catalog and turns it into a per-request
//! student x course preference matrix.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Student, Course, Interaction, InteractionMatrix)
//! - **source**: The `DataSource` collaborator trait plus in-memory and file backends
//! - **parser**: Parse `.dat` files into Rust structs
//! - **scoring**: Turn (grade, rating) into a bounded preference score
//! - **index**: Build the matrix and id mappings from a source
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{FileSource, InteractionMatrix, DEFAULT_ADMIN_ID};
//!
//! let source = FileSource::new("data/courses");
//! let matrix = InteractionMatrix::load(&source, DEFAULT_ADMIN_ID)?;
//!
//! let alice = matrix.student_idx("s01").unwrap();
//! println!("Alice took {} courses", matrix.scored_count(alice));
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod scoring;
pub mod source;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::DEFAULT_ADMIN_ID;
pub use scoring::{preference_score, MAX_RATING, MAX_SCORE, MIN_RATING, NEUTRAL_SCORE};
pub use source::{DataSource, FileSource, InMemorySource};
pub use types::{
    // Type aliases
    CourseId,
    CourseIdx,
    StudentId,
    StudentIdx,
    // Core types
    Course,
    Interaction,
    InteractionMatrix,
    Student,
};
