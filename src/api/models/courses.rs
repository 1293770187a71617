//! API request/response models for courses.

use super::pagination::Pagination;
use crate::db::models::courses::CourseDBResponse;
use crate::types::{CourseId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseCreate {
    pub name: String,
    pub capacity: i32,
    #[schema(value_type = String, format = "uuid")]
    pub teacher_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseUpdate {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub teacher_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CourseId,
    pub name: String,
    pub capacity: i32,
    #[schema(value_type = String, format = "uuid")]
    pub teacher_id: UserId,
    pub teacher_username: String,
    /// Live headcount; may exceed capacity after an admin lowers it
    pub enrolled_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CourseDBResponse> for CourseResponse {
    fn from(db: CourseDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            capacity: db.capacity,
            teacher_id: db.teacher_id,
            teacher_username: db.teacher_username,
            enrolled_count: db.enrolled_count,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing courses
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListCoursesQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Restrict the list to one teacher's courses
    #[param(value_type = Option<String>, format = "uuid")]
    pub teacher_id: Option<UserId>,
}
