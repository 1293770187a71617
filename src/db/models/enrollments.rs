//! Database models for enrollments.

use crate::types::{CourseId, EnrollmentId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new enrollment
#[derive(Debug, Clone)]
pub struct EnrollmentCreateDBRequest {
    pub student_id: UserId,
    pub course_id: CourseId,
    pub grade: Option<f64>,
}

/// Database request for updating an enrollment
#[derive(Debug, Clone)]
pub struct EnrollmentUpdateDBRequest {
    /// `Some(None)` clears the grade, `Some(Some(g))` sets it, `None` keeps it
    pub grade: Option<Option<f64>>,
}

/// Database response for an enrollment, denormalized with the student's
/// username and the course name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EnrollmentDBResponse {
    pub id: EnrollmentId,
    pub student_id: UserId,
    pub student_username: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub grade: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a student's attempt to enroll in a course.
///
/// Capacity and duplicate checks are business outcomes, not errors; the row
/// is only inserted on [`EnrollAttempt::Enrolled`].
#[derive(Debug, Clone)]
pub enum EnrollAttempt {
    Enrolled(EnrollmentDBResponse),
    ClassFull,
    AlreadyEnrolled,
}
