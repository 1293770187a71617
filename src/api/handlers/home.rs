//! Root role dispatch and liveness.

use axum::response::Redirect;

use crate::auth::current_user::MaybeUser;

/// Redirect callers to wherever they belong
///
/// Anonymous callers go to the login page; authenticated callers go to their
/// role's dashboard.
#[utoipa::path(
    get,
    path = "/",
    tag = "home",
    responses(
        (status = 303, description = "Redirect to login or the caller's dashboard"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn dispatch(MaybeUser(user): MaybeUser) -> Redirect {
    match user {
        None => Redirect::to("/authentication/login"),
        Some(user) => Redirect::to(user.role.home_path()),
    }
}

/// Liveness endpoint
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "home",
    responses(
        (status = 200, description = "Service is up"),
    )
)]
pub async fn healthz() -> &'static str {
    "ok"
}
