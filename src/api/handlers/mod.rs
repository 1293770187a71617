//! Axum route handlers.
//!
//! Handlers are grouped by audience:
//!
//! - [`auth`]: login, session introspection, logout
//! - [`home`]: root role dispatch and liveness
//! - [`student`]: student dashboard and the enroll/unenroll flow
//! - [`teacher`]: teacher dashboard, rosters, and grade entry
//! - [`users`], [`courses`], [`enrollments`]: admin CRUD

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod home;
pub mod student;
pub mod teacher;
pub mod users;
