//! Authentication and authorization system.
//!
//! # Authentication
//!
//! Browser-style session authentication using secure HTTP-only cookies:
//! - Users log in via `/authentication/login` with username/password
//! - A signed JWT session token is stored in the cookie
//! - Tokens carry the user's id, username, and role, and expire after the
//!   configured session timeout
//!
//! # Authorization
//!
//! Role-based: every user has exactly one role (admin, teacher, or student).
//! [`permissions::role_permits`] is the only place role capabilities are
//! defined; typed extractors ([`permissions::AdminUser`],
//! [`permissions::TeacherUser`], [`permissions::StudentUser`]) enforce it at
//! the routing layer. Ownership checks (a teacher grading their own course)
//! stay in handlers.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`permissions`]: The role capability table and typed role extractors
//! - [`session`]: JWT session token creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use registrar::api::models::users::CurrentUser;
//!
//! async fn protected_handler(user: CurrentUser) -> String {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
