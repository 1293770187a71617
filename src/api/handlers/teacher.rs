//! Teacher-facing routes: the dashboard, course rosters, and grade entry.
//!
//! Ownership is checked in the handler: a teacher touching a course they do
//! not own gets a "not your class" warning pointing back at their dashboard,
//! and nothing is updated.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgConnection;

use crate::{
    api::models::{
        courses::CourseResponse,
        enrollments::{
            EnrollmentResponse, GradeSheet, GradeSheetResponse, NotYourClassResponse, RosterResponse, TeacherDashboard,
        },
        users::CurrentUser,
    },
    auth::permissions::TeacherUser,
    db::{
        handlers::{Courses, Enrollments, Repository},
        models::courses::CourseDBResponse,
    },
    errors::Error,
    types::CourseId,
    AppState,
};

/// Fetch the course and check the caller owns it.
///
/// `Err(Error::NotFound)` for an unknown course; `Ok(Err(warning))` for a
/// course taught by someone else.
async fn owned_course(
    conn: &mut PgConnection,
    user: &CurrentUser,
    course_id: CourseId,
) -> Result<Result<CourseDBResponse, NotYourClassResponse>, Error> {
    let mut courses = Courses::new(conn);
    let course = courses.get_by_id(course_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Course".to_string(),
        id: course_id.to_string(),
    })?;

    if course.teacher_id != user.id {
        return Ok(Err(NotYourClassResponse::new()));
    }

    Ok(Ok(course))
}

/// Teacher dashboard: courses owned by the caller
#[utoipa::path(
    get,
    path = "/teacher",
    tag = "teacher",
    responses(
        (status = 200, description = "Teacher dashboard", body = TeacherDashboard),
        (status = 303, description = "Not a teacher; redirected"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn dashboard(
    TeacherUser(user): TeacherUser,
    State(state): State<AppState>,
) -> Result<Json<TeacherDashboard>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let courses = Courses::new(&mut conn)
        .list_by_teacher(user.id)
        .await?
        .into_iter()
        .map(CourseResponse::from)
        .collect();

    Ok(Json(TeacherDashboard { courses }))
}

/// Course roster with grades
#[utoipa::path(
    get,
    path = "/teacher/course/{course_id}",
    tag = "teacher",
    params(("course_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Roster, or a not-your-class warning", body = RosterResponse),
        (status = 303, description = "Not a teacher; redirected"),
        (status = 404, description = "Unknown course"),
    )
)]
#[tracing::instrument(skip_all, fields(course_id = %course_id))]
pub async fn roster(
    TeacherUser(user): TeacherUser,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Response, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let course = match owned_course(&mut conn, &user, course_id).await? {
        Ok(course) => course,
        Err(warning) => return Ok(Json(warning).into_response()),
    };

    let enrollments = Enrollments::new(&mut conn)
        .list_for_course(course_id)
        .await?
        .into_iter()
        .map(EnrollmentResponse::from)
        .collect();

    Ok(Json(RosterResponse {
        course: CourseResponse::from(course),
        enrollments,
    })
    .into_response())
}

/// Submit a grade sheet for a course
///
/// Blank values are skipped, enrollment ids not in this course are ignored,
/// and an unparseable non-blank value fails the whole sheet with a 400 and no
/// partial update.
#[utoipa::path(
    post,
    path = "/teacher/course/{course_id}",
    request_body = GradeSheet,
    tag = "teacher",
    params(("course_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Grades saved, or a not-your-class warning", body = GradeSheetResponse),
        (status = 303, description = "Not a teacher; redirected"),
        (status = 400, description = "Unparseable grade value"),
        (status = 404, description = "Unknown course"),
    )
)]
#[tracing::instrument(skip_all, fields(course_id = %course_id))]
pub async fn submit_grades(
    TeacherUser(user): TeacherUser,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    Json(sheet): Json<GradeSheet>,
) -> Result<Response, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if let Err(warning) = owned_course(&mut conn, &user, course_id).await? {
        return Ok(Json(warning).into_response());
    }

    // Parse everything up front so a bad value fails before any write
    let mut updates = Vec::new();
    for (enrollment_id, value) in &sheet.grades {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let grade: f64 = value.parse().map_err(|_| Error::BadRequest {
            message: format!("Invalid grade value '{value}'"),
        })?;
        updates.push((*enrollment_id, grade));
    }

    let updated = Enrollments::new(&mut conn).set_grades(course_id, &updates).await?;

    Ok(Json(GradeSheetResponse {
        updated,
        message: "Grades saved".to_string(),
    })
    .into_response())
}
