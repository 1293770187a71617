//! Test utilities for integration testing (available with `test-utils` feature).

use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    api::models::users::{Role, UserResponse},
    auth::password,
    db::{
        handlers::{Courses, Enrollments, Repository, Users},
        models::{
            courses::{CourseCreateDBRequest, CourseDBResponse},
            enrollments::{EnrollmentCreateDBRequest, EnrollmentDBResponse},
            users::UserCreateDBRequest,
        },
    },
    types::{CourseId, UserId},
};

/// Password shared by all fixture users, including the bootstrap admin.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn create_test_config() -> crate::config::Config {
    let mut config = crate::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: None,
        admin_username: "admin".to_string(),
        admin_password: TEST_PASSWORD.to_string(),
        secret_key: Some("test-secret-key-for-jwt-sessions".to_string()),
        ..Default::default()
    };
    // The test client talks plain HTTP, so Secure cookies would be dropped
    config.auth.session.cookie_secure = false;
    config
}

/// Spin up the full application against the given pool and return a test
/// server with cookie persistence, so a login call authenticates the rest of
/// the test.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

/// Log in as `username` with the fixture password, storing the session cookie
/// in the server's cookie jar.
pub async fn login(server: &TestServer, username: &str) {
    let response = server
        .post("/authentication/login")
        .json(&serde_json::json!({
            "username": username,
            "password": TEST_PASSWORD,
        }))
        .await;
    response.assert_status_ok();
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let username = format!("testuser_{}", Uuid::new_v4().simple());

    let user_create = UserCreateDBRequest {
        username,
        password_hash: password::hash_string(TEST_PASSWORD).expect("Failed to hash fixture password"),
        role,
    };

    let user = users_repo.create(&user_create).await.expect("Failed to create test user");
    UserResponse::from(user)
}

pub async fn create_test_course(pool: &PgPool, teacher_id: UserId, name: &str, capacity: i32) -> CourseDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut courses_repo = Courses::new(&mut conn);

    let course_create = CourseCreateDBRequest {
        name: name.to_string(),
        capacity,
        teacher_id,
    };

    courses_repo.create(&course_create).await.expect("Failed to create test course")
}

pub async fn create_test_enrollment(pool: &PgPool, student_id: UserId, course_id: CourseId) -> EnrollmentDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut enrollments_repo = Enrollments::new(&mut conn);

    let enrollment_create = EnrollmentCreateDBRequest {
        student_id,
        course_id,
        grade: None,
    };

    enrollments_repo
        .create(&enrollment_create)
        .await
        .expect("Failed to create test enrollment")
}

/// Count the enrollment rows for a course directly, bypassing the API.
pub async fn enrollment_count(pool: &PgPool, course_id: CourseId) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count enrollments")
}
