//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, session, logout
//! - **Home** (`/`): Role-based redirect to the caller's dashboard
//! - **Student** (`/student*`): Dashboard, enroll, unenroll
//! - **Teacher** (`/teacher*`): Dashboard, rosters, grade entry
//! - **Admin** (`/admin/*`): CRUD for users, courses, and enrollments
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
