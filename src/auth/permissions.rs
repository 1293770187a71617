//! Role-based access control.
//!
//! [`role_permits`] is the single place that knows what each role may do.
//! Typed extractors wrap it so handlers declare their requirement in the
//! signature:
//!
//! - [`AdminUser`]: rejection is a plain 404, so admin routes look identical
//!   to missing routes for everyone else.
//! - [`TeacherUser`] / [`StudentUser`]: anonymous callers are redirected to
//!   the login page; authenticated callers with the wrong role are redirected
//!   to their own dashboard instead of receiving an error.

use crate::{
    api::models::users::{CurrentUser, Role},
    types::{Operation, Resource},
    AppState,
};
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

use super::current_user::MaybeUser;

/// Whether `role` may perform `operation` on `resource`.
pub fn role_permits(role: Role, resource: Resource, operation: Operation) -> bool {
    use Operation::*;
    use Resource::*;

    match role {
        // Admins can do anything to anything
        Role::Admin => true,
        Role::Teacher => matches!(
            (resource, operation),
            (Courses, ReadOwn) | (Enrollments, ReadOwn) | (Grades, UpdateOwn)
        ),
        Role::Student => matches!(
            (resource, operation),
            // The catalog is visible to every student
            (Courses, ReadAll) | (Enrollments, ReadOwn) | (Enrollments, CreateOwn) | (Enrollments, DeleteOwn)
        ),
    }
}

/// An authenticated caller allowed to manage every resource.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state)
            .await
            .unwrap_or(MaybeUser(None));

        match user {
            Some(user) if role_permits(user.role, Resource::Users, Operation::UpdateAll) => Ok(AdminUser(user)),
            // Anonymous and non-admin callers both see a missing route
            _ => Err((StatusCode::NOT_FOUND, "Not found").into_response()),
        }
    }
}

/// An authenticated caller allowed on the teacher dashboard.
#[derive(Debug, Clone)]
pub struct TeacherUser(pub CurrentUser);

impl FromRequestParts<AppState> for TeacherUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Resource::Grades, Operation::UpdateOwn)
            .await
            .map(TeacherUser)
    }
}

/// An authenticated caller allowed on the student dashboard.
#[derive(Debug, Clone)]
pub struct StudentUser(pub CurrentUser);

impl FromRequestParts<AppState> for StudentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Resource::Enrollments, Operation::CreateOwn)
            .await
            .map(StudentUser)
    }
}

/// Shared check for the redirecting extractors: anonymous callers go to the
/// login page, wrong-role callers go back to their own dashboard.
async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    resource: Resource,
    operation: Operation,
) -> Result<CurrentUser, Response> {
    let MaybeUser(user) = MaybeUser::from_request_parts(parts, state)
        .await
        .unwrap_or(MaybeUser(None));

    match user {
        None => Err(Redirect::to("/authentication/login").into_response()),
        Some(user) if role_permits(user.role, resource, operation) => Ok(user),
        Some(user) => Err(Redirect::to(user.role.home_path()).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_do_everything() {
        for resource in [Resource::Users, Resource::Courses, Resource::Enrollments, Resource::Grades] {
            for operation in [
                Operation::CreateAll,
                Operation::ReadAll,
                Operation::UpdateAll,
                Operation::DeleteAll,
            ] {
                assert!(role_permits(Role::Admin, resource, operation));
            }
        }
    }

    #[test]
    fn teacher_can_grade_but_not_manage_users() {
        assert!(role_permits(Role::Teacher, Resource::Grades, Operation::UpdateOwn));
        assert!(role_permits(Role::Teacher, Resource::Courses, Operation::ReadOwn));
        assert!(!role_permits(Role::Teacher, Resource::Users, Operation::CreateAll));
        assert!(!role_permits(Role::Teacher, Resource::Enrollments, Operation::CreateOwn));
    }

    #[test]
    fn student_can_enroll_but_not_grade() {
        assert!(role_permits(Role::Student, Resource::Enrollments, Operation::CreateOwn));
        assert!(role_permits(Role::Student, Resource::Enrollments, Operation::DeleteOwn));
        assert!(role_permits(Role::Student, Resource::Courses, Operation::ReadAll));
        assert!(!role_permits(Role::Student, Resource::Grades, Operation::UpdateOwn));
        assert!(!role_permits(Role::Student, Resource::Users, Operation::ReadAll));
    }
}
