//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request
//! deserialization and response serialization. These models define the public
//! API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Validation**: Models use serde for deserialization and validation
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Model Categories
//!
//! - [`auth`]: Login/logout payloads and the cookie-setting responses
//! - [`users`]: User accounts, roles, and the authenticated caller
//! - [`courses`]: Course catalog entries with teacher and headcount
//! - [`enrollments`]: Enrollment rows, enroll/unenroll outcomes, dashboards,
//!   and the grade sheet
//! - [`pagination`]: Shared offset pagination for admin list endpoints

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod pagination;
pub mod users;
