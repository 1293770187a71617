//! OpenAPI documentation for the portal API.
//!
//! The document is served interactively at `/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Authentication
        api::handlers::auth::login,
        api::handlers::auth::session,
        api::handlers::auth::logout,
        // Home
        api::handlers::home::dispatch,
        api::handlers::home::healthz,
        // Student
        api::handlers::student::dashboard,
        api::handlers::student::enroll,
        api::handlers::student::unenroll,
        // Teacher
        api::handlers::teacher::dashboard,
        api::handlers::teacher::roster,
        api::handlers::teacher::submit_grades,
        // Admin CRUD
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        api::handlers::courses::list_courses,
        api::handlers::courses::create_course,
        api::handlers::courses::get_course,
        api::handlers::courses::update_course,
        api::handlers::courses::delete_course,
        api::handlers::enrollments::list_enrollments,
        api::handlers::enrollments::create_enrollment,
        api::handlers::enrollments::get_enrollment,
        api::handlers::enrollments::update_enrollment,
        api::handlers::enrollments::delete_enrollment,
    ),
    components(
        schemas(
            api::models::auth::LoginRequest,
            api::models::auth::AuthResponse,
            api::models::auth::AuthSuccessResponse,
            api::models::users::Role,
            api::models::users::CurrentUser,
            api::models::users::UserCreate,
            api::models::users::UserUpdate,
            api::models::users::UserResponse,
            api::models::courses::CourseCreate,
            api::models::courses::CourseUpdate,
            api::models::courses::CourseResponse,
            api::models::enrollments::EnrollmentCreate,
            api::models::enrollments::EnrollmentUpdate,
            api::models::enrollments::EnrollmentResponse,
            api::models::enrollments::EnrollOutcome,
            api::models::enrollments::EnrollResponse,
            api::models::enrollments::UnenrollOutcome,
            api::models::enrollments::UnenrollResponse,
            api::models::enrollments::StudentDashboard,
            api::models::enrollments::TeacherDashboard,
            api::models::enrollments::RosterResponse,
            api::models::enrollments::GradeSheet,
            api::models::enrollments::GradeSheetResponse,
            api::models::enrollments::NotYourClassResponse,
            api::models::pagination::PaginatedResponse<api::models::users::UserResponse>,
            api::models::pagination::PaginatedResponse<api::models::courses::CourseResponse>,
            api::models::pagination::PaginatedResponse<api::models::enrollments::EnrollmentResponse>,
        )
    ),
    tags(
        (name = "authentication", description = "Session login and logout"),
        (name = "home", description = "Role dispatch and liveness"),
        (name = "student", description = "Student dashboard and enrollment"),
        (name = "teacher", description = "Teacher dashboard, rosters, and grades"),
        (name = "users", description = "User administration"),
        (name = "courses", description = "Course administration"),
        (name = "enrollments", description = "Enrollment administration"),
    ),
    info(
        title = "Registrar API",
        description = "University enrollment portal: students enroll in courses, teachers enter grades, admins manage the catalog."
    )
)]
pub struct ApiDoc;
