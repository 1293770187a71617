use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        enrollments::{EnrollmentCreate, EnrollmentResponse, EnrollmentUpdate, ListEnrollmentsQuery},
        pagination::PaginatedResponse,
    },
    auth::permissions::AdminUser,
    db::{
        handlers::{enrollments::EnrollmentFilter, Enrollments, Repository},
        models::enrollments::{EnrollmentCreateDBRequest, EnrollmentUpdateDBRequest},
    },
    errors::Error,
    types::EnrollmentId,
    AppState,
};

/// List enrollments
#[utoipa::path(
    get,
    path = "/admin/enrollments",
    tag = "enrollments",
    params(ListEnrollmentsQuery),
    responses(
        (status = 200, description = "List of enrollments", body = PaginatedResponse<EnrollmentResponse>),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_enrollments(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListEnrollmentsQuery>,
) -> Result<Json<PaginatedResponse<EnrollmentResponse>>, Error> {
    let (skip, limit) = query.pagination.params();
    let mut filter = EnrollmentFilter::new(skip, limit);
    if let Some(student_id) = query.student_id {
        filter = filter.with_student(student_id);
    }
    if let Some(course_id) = query.course_id {
        filter = filter.with_course(course_id);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);

    let total_count = repo.count(&filter).await?;
    let enrollments = repo.list(&filter).await?;
    let data = enrollments.into_iter().map(EnrollmentResponse::from).collect();

    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

/// Create an enrollment
///
/// Admin creation bypasses the capacity gate (that gate belongs to student
/// self-enroll) but still trips the duplicate-pair constraint, returned as a
/// 409.
#[utoipa::path(
    post,
    path = "/admin/enrollments",
    request_body = EnrollmentCreate,
    tag = "enrollments",
    responses(
        (status = 201, description = "Enrollment created", body = EnrollmentResponse),
        (status = 400, description = "Invalid student or course reference"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Student already enrolled in this course"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_enrollment(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<EnrollmentCreate>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), Error> {
    let create_request = EnrollmentCreateDBRequest {
        student_id: request.student_id,
        course_id: request.course_id,
        grade: request.grade,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);
    let enrollment = repo.create(&create_request).await?;

    Ok((StatusCode::CREATED, Json(EnrollmentResponse::from(enrollment))))
}

/// Get an enrollment by ID
#[utoipa::path(
    get,
    path = "/admin/enrollments/{enrollment_id}",
    tag = "enrollments",
    params(("enrollment_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Enrollment details", body = EnrollmentResponse),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all, fields(enrollment_id = %enrollment_id))]
pub async fn get_enrollment(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(enrollment_id): Path<EnrollmentId>,
) -> Result<Json<EnrollmentResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);

    let enrollment = repo.get_by_id(enrollment_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Enrollment".to_string(),
        id: enrollment_id.to_string(),
    })?;

    Ok(Json(EnrollmentResponse::from(enrollment)))
}

/// Update an enrollment's grade
#[utoipa::path(
    patch,
    path = "/admin/enrollments/{enrollment_id}",
    request_body = EnrollmentUpdate,
    tag = "enrollments",
    params(("enrollment_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "Enrollment updated", body = EnrollmentResponse),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all, fields(enrollment_id = %enrollment_id))]
pub async fn update_enrollment(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(enrollment_id): Path<EnrollmentId>,
    Json(request): Json<EnrollmentUpdate>,
) -> Result<Json<EnrollmentResponse>, Error> {
    let update_request = EnrollmentUpdateDBRequest { grade: request.grade };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);
    let enrollment = repo.update(enrollment_id, &update_request).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Enrollment".to_string(),
            id: enrollment_id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(EnrollmentResponse::from(enrollment)))
}

/// Delete an enrollment
#[utoipa::path(
    delete,
    path = "/admin/enrollments/{enrollment_id}",
    tag = "enrollments",
    params(("enrollment_id" = String, Path, format = "uuid")),
    responses(
        (status = 204, description = "Enrollment deleted"),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all, fields(enrollment_id = %enrollment_id))]
pub async fn delete_enrollment(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(enrollment_id): Path<EnrollmentId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);

    let deleted = repo.delete(enrollment_id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Enrollment".to_string(),
            id: enrollment_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
