use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        pagination::PaginatedResponse,
        users::{ListUsersQuery, UserCreate, UserResponse, UserUpdate},
    },
    auth::{password, permissions::AdminUser},
    db::{
        handlers::{users::UserFilter, Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
    types::UserId,
    AppState,
};

/// Validate a plaintext password against the configured length policy
fn validate_password(password: &str, config: &crate::config::Config) -> Result<(), Error> {
    let policy = &config.auth.password;
    if password.len() < policy.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", policy.min_length),
        });
    }
    if password.len() > policy.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", policy.max_length),
        });
    }
    Ok(())
}

/// Hash a password on a blocking thread
async fn hash_password(password: String) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

/// List users
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<UserResponse>),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, Error> {
    let (skip, limit) = query.pagination.params();
    let mut filter = UserFilter::new(skip, limit);
    if let Some(role) = query.role {
        filter = filter.with_role(role);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let total_count = repo.count(&filter).await?;
    let users = repo.list(&filter).await?;
    let data = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = UserCreate,
    tag = "users",
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Username already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    if request.username.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Username cannot be empty".to_string(),
        });
    }
    validate_password(&request.password, &state.config)?;

    let password_hash = hash_password(request.password).await?;
    let create_request = UserCreateDBRequest {
        username: request.username,
        password_hash,
        role: request.role,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);
    let user = repo.create(&create_request).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/admin/users/{user_id}",
    tag = "users",
    params(("user_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn get_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo.get_by_id(user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a user
///
/// An absent or null password keeps the stored hash; supplying one re-hashes.
#[utoipa::path(
    patch,
    path = "/admin/users/{user_id}",
    request_body = UserUpdate,
    tag = "users",
    params(("user_id" = String, Path, format = "uuid")),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Username already taken"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn update_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    let password_hash = match request.password {
        Some(password) => {
            validate_password(&password, &state.config)?;
            Some(hash_password(password).await?)
        }
        None => None,
    };

    let update_request = UserUpdateDBRequest {
        username: request.username,
        password_hash,
        role: request.role,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);
    let user = repo.update(user_id, &update_request).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "User".to_string(),
            id: user_id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete a user
///
/// Cascades to the user's enrollments and, for teachers, their courses and
/// those courses' enrollments.
#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}",
    tag = "users",
    params(("user_id" = String, Path, format = "uuid")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not found"),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn delete_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let deleted = repo.delete(user_id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "User".to_string(),
            id: user_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
