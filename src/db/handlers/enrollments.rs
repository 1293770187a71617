//! Database repository for enrollments.
//!
//! Besides plain CRUD, this repository owns the capacity-gated enroll flow
//! and transactional grade-sheet updates.

use crate::types::{abbrev_uuid, CourseId, EnrollmentId, UserId};
use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::enrollments::{
            EnrollAttempt, EnrollmentCreateDBRequest, EnrollmentDBResponse, EnrollmentUpdateDBRequest,
        },
    },
};
use sqlx::{Connection, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Shared SELECT for enrollment rows with student username and course name
/// joined in.
const ENROLLMENT_SELECT: &str = r#"
    SELECT e.id, e.student_id, s.username AS student_username,
           e.course_id, c.name AS course_name,
           e.grade, e.created_at
    FROM enrollments e
    JOIN users s ON s.id = e.student_id
    JOIN courses c ON c.id = e.course_id
"#;

/// Filter for listing enrollments
#[derive(Debug, Clone, Default)]
pub struct EnrollmentFilter {
    pub skip: i64,
    pub limit: i64,
    pub student_id: Option<UserId>,
    pub course_id: Option<CourseId>,
}

impl EnrollmentFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            ..Default::default()
        }
    }

    pub fn with_student(mut self, student_id: UserId) -> Self {
        self.student_id = Some(student_id);
        self
    }

    pub fn with_course(mut self, course_id: CourseId) -> Self {
        self.course_id = Some(course_id);
        self
    }
}

pub struct Enrollments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Enrollments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Capacity-gated self-enroll.
    ///
    /// Locks the course row so the headcount check and the insert are atomic;
    /// two racing requests for the last seat serialize on the lock and the
    /// loser sees a full class. Returns [`DbError::NotFound`] for an unknown
    /// course.
    #[instrument(
        skip(self),
        fields(student_id = %abbrev_uuid(&student_id), course_id = %abbrev_uuid(&course_id)),
        err
    )]
    pub async fn enroll(&mut self, student_id: UserId, course_id: CourseId) -> Result<EnrollAttempt> {
        let mut tx = self.db.begin().await?;

        let capacity: Option<i32> = sqlx::query_scalar("SELECT capacity FROM courses WHERE id = $1 FOR UPDATE")
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?;
        let capacity = capacity.ok_or(DbError::NotFound)?;

        let enrolled: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?;

        if enrolled >= i64::from(capacity) {
            // Nothing to roll back, but close the transaction cleanly
            tx.rollback().await?;
            return Ok(EnrollAttempt::ClassFull);
        }

        let inserted = sqlx::query_scalar::<_, EnrollmentId>(
            r#"
            INSERT INTO enrollments (id, student_id, course_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(e) => {
                let db_err = DbError::from(e);
                if db_err.is_duplicate_enrollment() {
                    tx.rollback().await?;
                    return Ok(EnrollAttempt::AlreadyEnrolled);
                }
                return Err(db_err);
            }
        };

        let enrollment = sqlx::query_as::<_, EnrollmentDBResponse>(&format!("{ENROLLMENT_SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(EnrollAttempt::Enrolled(enrollment))
    }

    /// Drop the (student, course) enrollment if present.
    ///
    /// Returns true if a row was deleted.
    #[instrument(
        skip(self),
        fields(student_id = %abbrev_uuid(&student_id), course_id = %abbrev_uuid(&course_id)),
        err
    )]
    pub async fn unenroll(&mut self, student_id: UserId, course_id: CourseId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enrollments WHERE student_id = $1 AND course_id = $2")
            .bind(student_id)
            .bind(course_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All of one student's enrollments, ordered by course name
    #[instrument(skip(self), fields(student_id = %abbrev_uuid(&student_id)), err)]
    pub async fn list_for_student(&mut self, student_id: UserId) -> Result<Vec<EnrollmentDBResponse>> {
        let enrollments = sqlx::query_as::<_, EnrollmentDBResponse>(&format!(
            "{ENROLLMENT_SELECT} WHERE e.student_id = $1 ORDER BY c.name"
        ))
        .bind(student_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(enrollments)
    }

    /// A course's roster, ordered by student username
    #[instrument(skip(self), fields(course_id = %abbrev_uuid(&course_id)), err)]
    pub async fn list_for_course(&mut self, course_id: CourseId) -> Result<Vec<EnrollmentDBResponse>> {
        let enrollments = sqlx::query_as::<_, EnrollmentDBResponse>(&format!(
            "{ENROLLMENT_SELECT} WHERE e.course_id = $1 ORDER BY s.username"
        ))
        .bind(course_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(enrollments)
    }

    /// Apply a batch of grade updates for one course in a single transaction.
    ///
    /// Enrollment ids that do not belong to the course are ignored. Returns
    /// the number of grades actually written.
    #[instrument(skip(self, grades), fields(course_id = %abbrev_uuid(&course_id), count = grades.len()), err)]
    pub async fn set_grades(&mut self, course_id: CourseId, grades: &[(EnrollmentId, f64)]) -> Result<usize> {
        let mut tx = self.db.begin().await?;
        let mut updated = 0usize;

        for (enrollment_id, grade) in grades {
            let result = sqlx::query("UPDATE enrollments SET grade = $3 WHERE id = $1 AND course_id = $2")
                .bind(enrollment_id)
                .bind(course_id)
                .bind(grade)
                .execute(&mut *tx)
                .await?;
            updated += result.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Total enrollments matching the filter, ignoring pagination
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &EnrollmentFilter) -> Result<i64> {
        let count: i64 = match (filter.student_id, filter.course_id) {
            (Some(student_id), Some(course_id)) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE student_id = $1 AND course_id = $2")
                    .bind(student_id)
                    .bind(course_id)
                    .fetch_one(&mut *self.db)
                    .await?
            }
            (Some(student_id), None) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE student_id = $1")
                    .bind(student_id)
                    .fetch_one(&mut *self.db)
                    .await?
            }
            (None, Some(course_id)) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
                    .bind(course_id)
                    .fetch_one(&mut *self.db)
                    .await?
            }
            (None, None) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
                    .fetch_one(&mut *self.db)
                    .await?
            }
        };

        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Enrollments<'c> {
    type CreateRequest = EnrollmentCreateDBRequest;
    type UpdateRequest = EnrollmentUpdateDBRequest;
    type Response = EnrollmentDBResponse;
    type Id = EnrollmentId;
    type Filter = EnrollmentFilter;

    /// Direct insert used by admin creation. Bypasses the capacity gate (that
    /// gate belongs to self-enroll) but still trips the duplicate-pair
    /// constraint.
    #[instrument(
        skip(self, request),
        fields(student_id = %abbrev_uuid(&request.student_id), course_id = %abbrev_uuid(&request.course_id)),
        err
    )]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id: EnrollmentId = sqlx::query_scalar(
            r#"
            INSERT INTO enrollments (id, student_id, course_id, grade)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.student_id)
        .bind(request.course_id)
        .bind(request.grade)
        .fetch_one(&mut *self.db)
        .await?;

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(enrollment_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let enrollment = sqlx::query_as::<_, EnrollmentDBResponse>(&format!("{ENROLLMENT_SELECT} WHERE e.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(enrollment)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(
        &mut self,
        ids: Vec<EnrollmentId>,
    ) -> Result<std::collections::HashMap<Self::Id, EnrollmentDBResponse>> {
        if ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }

        let enrollments = sqlx::query_as::<_, EnrollmentDBResponse>(&format!("{ENROLLMENT_SELECT} WHERE e.id = ANY($1)"))
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(enrollments.into_iter().map(|e| (e.id, e)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        // Optional student/course filters; both are rare enough that the four
        // query shapes stay explicit
        let enrollments = match (filter.student_id, filter.course_id) {
            (Some(student_id), Some(course_id)) => {
                sqlx::query_as::<_, EnrollmentDBResponse>(&format!(
                    "{ENROLLMENT_SELECT} WHERE e.student_id = $1 AND e.course_id = $2 ORDER BY e.created_at DESC LIMIT $3 OFFSET $4"
                ))
                .bind(student_id)
                .bind(course_id)
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(&mut *self.db)
                .await?
            }
            (Some(student_id), None) => {
                sqlx::query_as::<_, EnrollmentDBResponse>(&format!(
                    "{ENROLLMENT_SELECT} WHERE e.student_id = $1 ORDER BY e.created_at DESC LIMIT $2 OFFSET $3"
                ))
                .bind(student_id)
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(&mut *self.db)
                .await?
            }
            (None, Some(course_id)) => {
                sqlx::query_as::<_, EnrollmentDBResponse>(&format!(
                    "{ENROLLMENT_SELECT} WHERE e.course_id = $1 ORDER BY e.created_at DESC LIMIT $2 OFFSET $3"
                ))
                .bind(course_id)
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(&mut *self.db)
                .await?
            }
            (None, None) => {
                sqlx::query_as::<_, EnrollmentDBResponse>(&format!(
                    "{ENROLLMENT_SELECT} ORDER BY e.created_at DESC LIMIT $1 OFFSET $2"
                ))
                .bind(filter.limit)
                .bind(filter.skip)
                .fetch_all(&mut *self.db)
                .await?
            }
        };

        Ok(enrollments)
    }

    #[instrument(skip(self), fields(enrollment_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(enrollment_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        if let Some(grade) = request.grade {
            let result = sqlx::query("UPDATE enrollments SET grade = $2 WHERE id = $1")
                .bind(id)
                .bind(grade)
                .execute(&mut *self.db)
                .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::NotFound);
            }
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}
