//! Database repository for courses.

use crate::types::{abbrev_uuid, CourseId, UserId};
use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::courses::{CourseCreateDBRequest, CourseDBResponse, CourseUpdateDBRequest},
    },
};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Shared SELECT for course rows with the teacher username and live headcount
/// joined in.
const COURSE_SELECT: &str = r#"
    SELECT c.id, c.name, c.capacity, c.teacher_id,
           u.username AS teacher_username,
           (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS enrolled_count,
           c.created_at, c.updated_at
    FROM courses c
    JOIN users u ON u.id = c.teacher_id
"#;

/// Filter for listing courses
#[derive(Debug, Clone)]
pub struct CourseFilter {
    pub skip: i64,
    pub limit: i64,
    pub teacher_id: Option<UserId>,
}

impl CourseFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            teacher_id: None,
        }
    }

    pub fn with_teacher(mut self, teacher_id: UserId) -> Self {
        self.teacher_id = Some(teacher_id);
        self
    }
}

pub struct Courses<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Courses<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// All courses taught by one teacher, ordered by name
    #[instrument(skip(self), fields(teacher_id = %abbrev_uuid(&teacher_id)), err)]
    pub async fn list_by_teacher(&mut self, teacher_id: UserId) -> Result<Vec<CourseDBResponse>> {
        let courses = sqlx::query_as::<_, CourseDBResponse>(&format!(
            "{COURSE_SELECT} WHERE c.teacher_id = $1 ORDER BY c.name"
        ))
        .bind(teacher_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(courses)
    }

    /// The whole catalog, ordered by name (the student dashboard shows every
    /// course)
    #[instrument(skip(self), err)]
    pub async fn catalog(&mut self) -> Result<Vec<CourseDBResponse>> {
        let courses = sqlx::query_as::<_, CourseDBResponse>(&format!("{COURSE_SELECT} ORDER BY c.name"))
            .fetch_all(&mut *self.db)
            .await?;

        Ok(courses)
    }

    /// Total courses matching the filter, ignoring pagination
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &CourseFilter) -> Result<i64> {
        let count: i64 = match filter.teacher_id {
            Some(teacher_id) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE teacher_id = $1")
                    .bind(teacher_id)
                    .fetch_one(&mut *self.db)
                    .await?
            }
            None => sqlx::query_scalar("SELECT COUNT(*) FROM courses")
                .fetch_one(&mut *self.db)
                .await?,
        };

        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Courses<'c> {
    type CreateRequest = CourseCreateDBRequest;
    type UpdateRequest = CourseUpdateDBRequest;
    type Response = CourseDBResponse;
    type Id = CourseId;
    type Filter = CourseFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let course_id = Uuid::new_v4();

        let id: CourseId = sqlx::query_scalar(
            r#"
            INSERT INTO courses (id, name, capacity, teacher_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(course_id)
        .bind(&request.name)
        .bind(request.capacity)
        .bind(request.teacher_id)
        .fetch_one(&mut *self.db)
        .await?;

        // Re-read through the join so the response carries teacher_username
        // and enrolled_count like every other course read
        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(course_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let course = sqlx::query_as::<_, CourseDBResponse>(&format!("{COURSE_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(course)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<CourseId>) -> Result<std::collections::HashMap<Self::Id, CourseDBResponse>> {
        if ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }

        let courses = sqlx::query_as::<_, CourseDBResponse>(&format!("{COURSE_SELECT} WHERE c.id = ANY($1)"))
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(courses.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let courses = match filter.teacher_id {
            Some(teacher_id) => {
                sqlx::query_as::<_, CourseDBResponse>(&format!(
                    "{COURSE_SELECT} WHERE c.teacher_id = $1 ORDER BY c.name LIMIT $2 OFFSET $3"
                ))
                .bind(teacher_id)
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, CourseDBResponse>(&format!(
                    "{COURSE_SELECT} ORDER BY c.name LIMIT $1 OFFSET $2"
                ))
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(&mut *self.db)
                .await?
            }
        };

        Ok(courses)
    }

    #[instrument(skip(self), fields(course_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Enrollments in this course go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(course_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Lowering capacity below the current headcount is allowed; the gate
        // only applies at enroll time
        let updated: Option<CourseId> = sqlx::query_scalar(
            r#"
            UPDATE courses SET
                name = COALESCE($2, name),
                capacity = COALESCE($3, capacity),
                teacher_id = COALESCE($4, teacher_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.capacity)
        .bind(request.teacher_id)
        .fetch_optional(&mut *self.db)
        .await?;

        let id = updated.ok_or(DbError::NotFound)?;
        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}
