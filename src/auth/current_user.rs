use crate::{
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
    AppState,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Session cookie present but malformed header
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }))
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                // Try to verify the JWT session token
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    Err(_) => {
                        // Invalid/expired token; expected for stale cookies, so
                        // don't propagate the verification error
                        continue;
                    }
                }
            }
        }
    }
    None
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found session authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("Session authentication failed: {:?}", e);
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No session credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

/// Like [`CurrentUser`] but never rejects; anonymous callers extract as None.
///
/// Used by routes whose behavior branches on whether anyone is logged in, like
/// the role dispatch on `/`.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let user = match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => Some(user),
            _ => None,
        };
        Ok(MaybeUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::create_test_config;
    use uuid::Uuid;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(axum::http::header::COOKIE, cookie)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    #[test]
    fn test_valid_session_cookie_extracts_user() {
        let config = create_test_config();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            role: Role::Student,
        };
        let token = session::create_session_token(&user, &config).unwrap();
        let cookie_name = &config.auth.session.cookie_name;

        let parts = parts_with_cookie(&format!("{cookie_name}={token}"));
        let result = try_jwt_session_auth(&parts, &config).unwrap().unwrap();

        assert_eq!(result.id, user.id);
        assert_eq!(result.username, "alice");
        assert_eq!(result.role, Role::Student);
    }

    #[test]
    fn test_missing_cookie_is_none() {
        let config = create_test_config();
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (parts, _body) = request.into_parts();

        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }

    #[test]
    fn test_garbage_token_is_none() {
        let config = create_test_config();
        let cookie_name = &config.auth.session.cookie_name;
        let parts = parts_with_cookie(&format!("{cookie_name}=not-a-jwt"));

        // Invalid tokens are skipped rather than surfaced as errors
        assert!(try_jwt_session_auth(&parts, &config).is_none());
    }
}
