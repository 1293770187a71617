//! Student-facing routes: the dashboard and the enroll/unenroll flow.
//!
//! Enrollment outcomes that are business rules rather than failures (class
//! full, already enrolled, not enrolled) come back as 200s with an outcome
//! payload and leave the database unchanged.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::models::{
        courses::CourseResponse,
        enrollments::{
            EnrollOutcome, EnrollResponse, EnrollmentResponse, StudentDashboard, UnenrollOutcome, UnenrollResponse,
        },
    },
    auth::permissions::StudentUser,
    db::{
        handlers::{Courses, Enrollments},
        models::enrollments::EnrollAttempt,
    },
    errors::Error,
    types::CourseId,
    AppState,
};

/// Student dashboard: own enrollments plus the full catalog
#[utoipa::path(
    get,
    path = "/student",
    tag = "student",
    responses(
        (status = 200, description = "Student dashboard", body = StudentDashboard),
        (status = 303, description = "Not a student; redirected"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn dashboard(
    StudentUser(user): StudentUser,
    State(state): State<AppState>,
) -> Result<Json<StudentDashboard>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let enrollments = Enrollments::new(&mut conn)
        .list_for_student(user.id)
        .await?
        .into_iter()
        .map(EnrollmentResponse::from)
        .collect();

    let catalog = Courses::new(&mut conn)
        .catalog()
        .await?
        .into_iter()
        .map(CourseResponse::from)
        .collect();

    Ok(Json(StudentDashboard { enrollments, catalog }))
}

/// Enroll in a course
#[utoipa::path(
    post,
    path = "/student/enroll/{course_id}",
    tag = "student",
    params(("course_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Enroll outcome", body = EnrollResponse),
        (status = 303, description = "Not a student; redirected"),
        (status = 404, description = "Unknown course"),
    )
)]
#[tracing::instrument(skip_all, fields(course_id = %course_id))]
pub async fn enroll(
    StudentUser(user): StudentUser,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<EnrollResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);

    let attempt = repo.enroll(user.id, course_id).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Course".to_string(),
            id: course_id.to_string(),
        },
        other => Error::Database(other),
    })?;

    let response = match attempt {
        EnrollAttempt::Enrolled(enrollment) => EnrollResponse {
            outcome: EnrollOutcome::Enrolled,
            message: format!("Enrolled in {}", enrollment.course_name),
            enrollment: Some(EnrollmentResponse::from(enrollment)),
        },
        EnrollAttempt::ClassFull => EnrollResponse {
            outcome: EnrollOutcome::ClassFull,
            message: "Class full.".to_string(),
            enrollment: None,
        },
        EnrollAttempt::AlreadyEnrolled => EnrollResponse {
            outcome: EnrollOutcome::AlreadyEnrolled,
            message: "You are already enrolled in this course".to_string(),
            enrollment: None,
        },
    };

    Ok(Json(response))
}

/// Drop a course
#[utoipa::path(
    post,
    path = "/student/unenroll/{course_id}",
    tag = "student",
    params(("course_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Unenroll outcome", body = UnenrollResponse),
        (status = 303, description = "Not a student; redirected"),
    )
)]
#[tracing::instrument(skip_all, fields(course_id = %course_id))]
pub async fn unenroll(
    StudentUser(user): StudentUser,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<UnenrollResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);

    let dropped = repo.unenroll(user.id, course_id).await?;

    let response = if dropped {
        UnenrollResponse {
            outcome: UnenrollOutcome::Dropped,
            message: "Dropped the course".to_string(),
        }
    } else {
        UnenrollResponse {
            outcome: UnenrollOutcome::NotEnrolled,
            message: "You are not enrolled in this course".to_string(),
        }
    };

    Ok(Json(response))
}
