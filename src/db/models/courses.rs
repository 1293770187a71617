//! Database models for courses.

use crate::types::{CourseId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new course
#[derive(Debug, Clone)]
pub struct CourseCreateDBRequest {
    pub name: String,
    pub capacity: i32,
    pub teacher_id: UserId,
}

/// Database request for updating a course
#[derive(Debug, Clone)]
pub struct CourseUpdateDBRequest {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub teacher_id: Option<UserId>,
}

/// Database response for a course.
///
/// `teacher_username` and `enrolled_count` are denormalized through joins so
/// the API layer never issues follow-up lookups per row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseDBResponse {
    pub id: CourseId,
    pub name: String,
    pub capacity: i32,
    pub teacher_id: UserId,
    pub teacher_username: String,
    pub enrolled_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
