use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::PgConnection;

use crate::{
    api::models::{
        courses::{CourseCreate, CourseResponse, CourseUpdate, ListCoursesQuery},
        pagination::PaginatedResponse,
        users::Role,
    },
    auth::permissions::AdminUser,
    db::{
        handlers::{courses::CourseFilter, Courses, Repository, Users},
        models::courses::{CourseCreateDBRequest, CourseUpdateDBRequest},
    },
    errors::Error,
    types::{CourseId, UserId},
    AppState,
};

/// Reject a `teacher_id` that does not reference a teacher-role user
async fn ensure_is_teacher(conn: &mut PgConnection, teacher_id: UserId) -> Result<(), Error> {
    let mut users = Users::new(conn);
    let user = users.get_by_id(teacher_id).await?;

    match user {
        Some(user) if user.role == Role::Teacher => Ok(()),
        _ => Err(Error::BadRequest {
            message: "teacher_id must reference a teacher-role user".to_string(),
        }),
    }
}

/// List courses
#[utoipa::path(
    get,
    path = "/admin/courses",
    tag = "courses",
    params(ListCoursesQuery),
    responses(
        (status = 200, description = "List of courses", body = PaginatedResponse<CourseResponse>),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_courses(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<PaginatedResponse<CourseResponse>>, Error> {
    let (skip, limit) = query.pagination.params();
    let mut filter = CourseFilter::new(skip, limit);
    if let Some(teacher_id) = query.teacher_id {
        filter = filter.with_teacher(teacher_id);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut conn);

    let total_count = repo.count(&filter).await?;
    let courses = repo.list(&filter).await?;
    let data = courses.into_iter().map(CourseResponse::from).collect();

    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

/// Create a course
#[utoipa::path(
    post,
    path = "/admin/courses",
    request_body = CourseCreate,
    tag = "courses",
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), Error> {
    if request.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Course name cannot be empty".to_string(),
        });
    }
    if request.capacity <= 0 {
        return Err(Error::BadRequest {
            message: "Course capacity must be a positive number".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    ensure_is_teacher(&mut conn, request.teacher_id).await?;

    let create_request = CourseCreateDBRequest {
        name: request.name,
        capacity: request.capacity,
        teacher_id: request.teacher_id,
    };

    let mut repo = Courses::new(&mut conn);
    let course = repo.create(&create_request).await?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from(course))))
}

/// Get a course by ID
#[utoipa::path(
    get,
    path = "/admin/courses/{course_id}",
    tag = "courses",
    params(("course_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Course details", body = CourseResponse),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all, fields(course_id = %course_id))]
pub async fn get_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<CourseResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut conn);

    let course = repo.get_by_id(course_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Course".to_string(),
        id: course_id.to_string(),
    })?;

    Ok(Json(CourseResponse::from(course)))
}

/// Update a course
///
/// Lowering capacity below the current headcount is allowed; existing
/// enrollments are never dropped by a capacity change.
#[utoipa::path(
    patch,
    path = "/admin/courses/{course_id}",
    request_body = CourseUpdate,
    tag = "courses",
    params(("course_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all, fields(course_id = %course_id))]
pub async fn update_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    Json(request): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, Error> {
    if let Some(capacity) = request.capacity {
        if capacity <= 0 {
            return Err(Error::BadRequest {
                message: "Course capacity must be a positive number".to_string(),
            });
        }
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if let Some(teacher_id) = request.teacher_id {
        ensure_is_teacher(&mut conn, teacher_id).await?;
    }

    let update_request = CourseUpdateDBRequest {
        name: request.name,
        capacity: request.capacity,
        teacher_id: request.teacher_id,
    };

    let mut repo = Courses::new(&mut conn);
    let course = repo.update(course_id, &update_request).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Course".to_string(),
            id: course_id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(CourseResponse::from(course)))
}

/// Delete a course
///
/// Cascades to the course's enrollments.
#[utoipa::path(
    delete,
    path = "/admin/courses/{course_id}",
    tag = "courses",
    params(("course_id" = String, Path, format = "uuid")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all, fields(course_id = %course_id))]
pub async fn delete_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Courses::new(&mut conn);

    let deleted = repo.delete(course_id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Course".to_string(),
            id: course_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
