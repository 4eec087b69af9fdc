//! Parser for course data files.
//!
//! Handles the three `::`-separated files of a data directory:
//! - students.dat: studentId::name::major::cohort
//! - courses.dat: courseId::name::classification::owningMajor
//! - choices.dat: studentId::courseId::grade::rating (rating 0-5)
//!
//! Optional fields may be left empty (`s01::Alice::::2021`).

use crate::error::{DataLoadError, Result};
use crate::scoring::{MAX_RATING, MIN_RATING};
use crate::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read a file as ISO-8859-1 (Latin-1) when it is not valid UTF-8.
///
/// Exports from older registrar systems are frequently Latin-1 encoded,
/// where each byte maps directly to a Unicode code point.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    };

    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Cursor over the `::`-separated fields of one line
struct Fields<'a> {
    parts: std::str::Split<'a, &'static str>,
    file: &'static str,
    line: usize,
}

impl<'a> Fields<'a> {
    fn new(line_text: &'a str, file: &'static str, line: usize) -> Self {
        Self {
            parts: line_text.split("::"),
            file,
            line,
        }
    }

    fn required(&mut self, name: &str) -> Result<&'a str> {
        let value = self.parts.next().map(str::trim).unwrap_or("");
        if value.is_empty() {
            return Err(self.error(format!("Missing {}", name)));
        }
        Ok(value)
    }

    /// Optional trailing field: absent and empty both read as `None`
    fn optional(&mut self) -> Option<&'a str> {
        self.parts.next().map(str::trim).filter(|v| !v.is_empty())
    }

    fn error(&self, reason: String) -> DataLoadError {
        DataLoadError::ParseError {
            file: self.file.to_string(),
            line: self.line,
            reason,
        }
    }
}

/// Lenient numeric parse: anything that is not a finite number is absent
fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.parse::<f64>().ok()).filter(|v| v.is_finite())
}

/// Iterate non-empty lines with their 1-based line numbers
fn data_lines(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parse one students.dat line
fn parse_student_line(line_text: &str, line_no: usize) -> Result<Student> {
    let mut fields = Fields::new(line_text, "students.dat", line_no);

    let id = fields.required("studentId")?;
    let name = fields.required("name")?;
    let major = fields.optional();
    let cohort = match fields.optional() {
        Some(raw) => Some(raw.parse::<u16>().map_err(|e| {
            fields.error(format!("Invalid cohort: {}", e))
        })?),
        None => None,
    };

    let mut student = Student::new(id, name);
    if let Some(major) = major {
        student = student.with_major(major);
    }
    student.cohort = cohort;
    Ok(student)
}

/// Parse one courses.dat line
fn parse_course_line(line_text: &str, line_no: usize) -> Result<Course> {
    let mut fields = Fields::new(line_text, "courses.dat", line_no);

    let id = fields.required("courseId")?;
    let name = fields.required("name")?;
    let classification = fields.optional().unwrap_or("");
    let owning_major = fields.optional();

    let mut course = Course::new(id, name, classification);
    if let Some(major) = owning_major {
        course = course.with_owning_major(major);
    }
    Ok(course)
}

/// Parse one choices.dat line
fn parse_choice_line(line_text: &str, line_no: usize) -> Result<Interaction> {
    let mut fields = Fields::new(line_text, "choices.dat", line_no);

    let student_id = fields.required("studentId")?;
    let course_id = fields.required("courseId")?;
    let raw_grade = fields.optional();
    let raw_rating = fields.optional();

    let grade = parse_number(raw_grade);
    if raw_grade.is_some() && grade.is_none() {
        debug!(line = line_no, "Ignoring non-numeric grade {:?}", raw_grade);
    }

    let rating = parse_number(raw_rating);
    if let Some(value) = rating.filter(|r| !(MIN_RATING..=MAX_RATING).contains(r)) {
        return Err(DataLoadError::InvalidValue {
            field: "rating".to_string(),
            value: value.to_string(),
        });
    }

    Ok(Interaction {
        student_id: student_id.to_string(),
        course_id: course_id.to_string(),
        grade,
        rating,
    })
}

/// Parse the students.dat file
pub fn parse_students(path: &Path) -> Result<Vec<Student>> {
    let lines = read_lines(path)?;
    data_lines(&lines)
        .map(|(line_no, line)| parse_student_line(line, line_no))
        .collect()
}

/// Parse the courses.dat file
pub fn parse_courses(path: &Path) -> Result<Vec<Course>> {
    let lines = read_lines(path)?;
    data_lines(&lines)
        .map(|(line_no, line)| parse_course_line(line, line_no))
        .collect()
}

/// Parse the choices.dat file
pub fn parse_choices(path: &Path) -> Result<Vec<Interaction>> {
    let lines = read_lines(path)?;
    data_lines(&lines)
        .map(|(line_no, line)| parse_choice_line(line, line_no))
        .collect()
}
