//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//! - Uses the connection's transaction for ACID guarantees
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts and authentication lookups
//! - [`Courses`]: Course catalog with teacher and headcount joins
//! - [`Enrollments`]: Enrollment rows, the capacity-gated enroll flow, and
//!   grade updates

pub mod courses;
pub mod enrollments;
pub mod repository;
pub mod users;

pub use courses::Courses;
pub use enrollments::Enrollments;
pub use repository::Repository;
pub use users::Users;
