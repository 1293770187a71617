//! Database-layer request/response models, distinct from the API models.

pub mod courses;
pub mod enrollments;
pub mod users;
