//! API request/response models for enrollments, the student dashboard, and
//! the teacher grade sheet.

use std::collections::HashMap;

use super::courses::CourseResponse;
use super::pagination::Pagination;
use crate::db::models::enrollments::EnrollmentDBResponse;
use crate::types::{CourseId, EnrollmentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentCreate {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub course_id: CourseId,
    pub grade: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentUpdate {
    /// New grade; explicit null clears it, absent keeps it
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<f64>)]
    pub grade: Option<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: EnrollmentId,
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub student_username: String,
    #[schema(value_type = String, format = "uuid")]
    pub course_id: CourseId,
    pub course_name: String,
    pub grade: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<EnrollmentDBResponse> for EnrollmentResponse {
    fn from(db: EnrollmentDBResponse) -> Self {
        Self {
            id: db.id,
            student_id: db.student_id,
            student_username: db.student_username,
            course_id: db.course_id,
            course_name: db.course_name,
            grade: db.grade,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing enrollments
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListEnrollmentsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Restrict the list to one student
    #[param(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<UserId>,

    /// Restrict the list to one course
    #[param(value_type = Option<String>, format = "uuid")]
    pub course_id: Option<CourseId>,
}

/// Outcome of a self-enroll attempt.
///
/// Capacity and duplicate checks are business outcomes, not HTTP errors;
/// warning outcomes leave the enrollment set unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnrollOutcome {
    Enrolled,
    ClassFull,
    AlreadyEnrolled,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollResponse {
    pub outcome: EnrollOutcome,
    pub message: String,
    /// Present only when the outcome is `enrolled`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<EnrollmentResponse>,
}

/// Outcome of a self-unenroll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnenrollOutcome {
    Dropped,
    NotEnrolled,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnenrollResponse {
    pub outcome: UnenrollOutcome,
    pub message: String,
}

/// The student dashboard: own enrollments plus the full catalog with live
/// headcounts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentDashboard {
    pub enrollments: Vec<EnrollmentResponse>,
    pub catalog: Vec<CourseResponse>,
}

/// The teacher dashboard: courses owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherDashboard {
    pub courses: Vec<CourseResponse>,
}

/// One course's roster as seen by its teacher.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RosterResponse {
    pub course: CourseResponse,
    pub enrollments: Vec<EnrollmentResponse>,
}

/// A submitted grade sheet.
///
/// Values are strings straight out of the form: blank entries are skipped,
/// anything else must parse as a number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GradeSheet {
    #[schema(value_type = HashMap<String, String>)]
    pub grades: HashMap<EnrollmentId, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GradeSheetResponse {
    /// Number of grades written
    pub updated: usize,
    pub message: String,
}

/// Warning returned when a teacher touches a course they do not own.
///
/// No state changes; the payload points the caller back at their dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotYourClassResponse {
    pub warning: String,
    pub message: String,
    pub dashboard: String,
}

impl NotYourClassResponse {
    pub fn new() -> Self {
        Self {
            warning: "not_your_class".to_string(),
            message: "You are not the teacher of this course".to_string(),
            dashboard: "/teacher".to_string(),
        }
    }
}

impl Default for NotYourClassResponse {
    fn default() -> Self {
        Self::new()
    }
}
