//! University enrollment portal.
//!
//! Students enroll in courses (capacity permitting), teachers grade their
//! rosters, and admins manage users, courses, and enrollments. Everyone
//! authenticates with a username and password and carries exactly one role.
//!
//! # Architecture
//!
//! - [`api`]: HTTP handlers and request/response models (axum)
//! - [`auth`]: password hashing, JWT session cookies, role gates
//! - [`db`]: repositories and database-facing models (sqlx/PostgreSQL)
//! - [`config`]: YAML + environment configuration (figment)
//!
//! The binary entrypoint builds an [`Application`] from a [`Config`] and
//! serves it until shutdown.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
pub use types::{CourseId, EnrollmentId, UserId};

use crate::{
    api::models::users::Role,
    auth::password,
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Error,
};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the registrar database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user on first startup.
///
/// Idempotent: if any admin already exists, nothing is created and `None` is
/// returned. The username and password come from `admin_username` and
/// `admin_password` in the configuration.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(config: &Config, db: &PgPool) -> Result<Option<UserId>, Error> {
    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut tx);

    if users.admin_exists().await? {
        tx.commit().await.map_err(|e| Error::Database(e.into()))?;
        return Ok(None);
    }

    let password_hash = password::hash_string(&config.admin_password)?;
    let created = users
        .create(&UserCreateDBRequest {
            username: config.admin_username.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    info!(username = %config.admin_username, "Created initial admin user");
    Ok(Some(created.id))
}

/// Connect to PostgreSQL and bring the schema up to date
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("database_url must be set (or use DATABASE_URL)"))?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    migrator().run(&pool).await?;
    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .expose_headers(vec![axum::http::header::LOCATION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Routes are grouped by audience: authentication at the root, role
/// dashboards under `/student` and `/teacher`, and admin CRUD nested under
/// `/admin`. Interactive API docs are served at `/docs`.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/session", get(api::handlers::auth::session))
        .route("/authentication/logout", post(api::handlers::auth::logout));

    // Admin CRUD. The AdminUser extractor masks these as 404 for anyone else.
    let admin_routes = Router::new()
        .route(
            "/users",
            get(api::handlers::users::list_users).post(api::handlers::users::create_user),
        )
        .route(
            "/users/{user_id}",
            get(api::handlers::users::get_user)
                .patch(api::handlers::users::update_user)
                .delete(api::handlers::users::delete_user),
        )
        .route(
            "/courses",
            get(api::handlers::courses::list_courses).post(api::handlers::courses::create_course),
        )
        .route(
            "/courses/{course_id}",
            get(api::handlers::courses::get_course)
                .patch(api::handlers::courses::update_course)
                .delete(api::handlers::courses::delete_course),
        )
        .route(
            "/enrollments",
            get(api::handlers::enrollments::list_enrollments).post(api::handlers::enrollments::create_enrollment),
        )
        .route(
            "/enrollments/{enrollment_id}",
            get(api::handlers::enrollments::get_enrollment)
                .patch(api::handlers::enrollments::update_enrollment)
                .delete(api::handlers::enrollments::delete_enrollment),
        );

    let router = Router::new()
        .route("/", get(api::handlers::home::dispatch))
        .route("/healthz", get(api::handlers::home::healthz))
        .route("/student", get(api::handlers::student::dashboard))
        .route("/student/enroll/{course_id}", post(api::handlers::student::enroll))
        .route("/student/unenroll/{course_id}", post(api::handlers::student::unenroll))
        .route("/teacher", get(api::handlers::teacher::dashboard))
        .route(
            "/teacher/course/{course_id}",
            get(api::handlers::teacher::roster).post(api::handlers::teacher::submit_grades),
        )
        .merge(auth_routes)
        .nest("/admin", admin_routes)
        .merge(Scalar::with_url("/docs", openapi::ApiDoc::openapi()))
        .with_state(state.clone());

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled application: database pool, router, and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and bootstraps the initial admin user
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Like [`Application::new`], but reuse an existing pool (for tests)
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting registrar with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        create_initial_admin_user(&config, &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
        };
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .save_cookies()
            .build(self.router.into_make_service())
            .expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Registrar listening on http://{}, docs at http://localhost:{}/docs",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
