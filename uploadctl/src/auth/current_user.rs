use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    db::AccessStore,
    errors::{Error, Result},
};
use axum::{extract::OptionalFromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present, or only invalid/expired ones
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but unreadable
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    config.secret_key.as_ref()?;
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=')
            && name == cookie_name
        {
            // Expired tokens are expected, so verification failures fall through to anonymous
            match session::verify_session_token(value, config) {
                Ok(user) => return Some(Ok(user)),
                Err(_) => continue,
            }
        }
    }
    None
}

/// Extract user from API token in Authorization header if present and valid
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user)): Valid API token found and user authenticated
/// - Some(Err(error)): Bearer token present but unknown, or the lookup failed
#[instrument(skip(parts, store))]
async fn try_api_token_auth(parts: &Parts, store: &dyn AccessStore) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    // Not a Bearer token, try other auth methods
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    match store.user_for_api_token(token).await {
        Ok(Some(user)) => Some(Ok(user)),
        Ok(None) => Some(Err(Error::Unauthenticated {
            message: Some("Invalid API token".to_string()),
        })),
        Err(e) => Some(Err(e.into())),
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>> {
        // Each method returns Option<Result<CurrentUser>>:
        // - None means the method is not applicable (no credentials present)
        // - Some(Ok(user)) means successful authentication
        // - Some(Err(error)) means credentials were present but invalid
        //
        // The first success wins. Credentials that were presented and all failed reject the
        // request instead of silently downgrading it to anonymous.
        let mut auth_errors = Vec::new();

        if state.config.auth.api_tokens.enabled {
            match try_api_token_auth(parts, state.store.as_ref()).await {
                Some(Ok(user)) => {
                    debug!("Found API token authenticated user: {}", user.id);
                    return Ok(Some(user));
                }
                Some(Err(e)) => {
                    trace!("API token authentication failed: {:?}", e);
                    auth_errors.push(("API token", e));
                }
                None => trace!("No API token authentication attempted"),
            }
        }

        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found JWT session authenticated user: {}", user.id);
                return Ok(Some(user));
            }
            Some(Err(e)) => {
                trace!("JWT session authentication failed: {:?}", e);
                auth_errors.push(("JWT session", e));
            }
            None => trace!("No JWT session authentication attempted"),
        }

        if auth_errors.is_empty() {
            trace!("No authentication credentials found in request");
            return Ok(None);
        }

        trace!("All authentication attempts failed ({}): {:?}", auth_errors.len(), auth_errors);
        // Surface store failures as such, everything else is a plain 401
        match auth_errors.into_iter().find(|(_, e)| matches!(e, Error::Database(_))) {
            Some((_, e)) => Err(e),
            None => Err(Error::Unauthenticated { message: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::in_memory::InMemoryAccessStore;
    use crate::test_utils::{create_test_config, create_test_state};
    use axum::http::StatusCode;

    fn parts_with_header(header_name: &str, header_value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(header_name, header_value)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    fn user(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
        }
    }

    async fn extract(parts: &mut Parts, state: &AppState) -> Result<Option<CurrentUser>> {
        <CurrentUser as OptionalFromRequestParts<AppState>>::from_request_parts(parts, state).await
    }

    #[tokio::test]
    async fn test_no_credentials_is_anonymous() {
        let state = create_test_state(InMemoryAccessStore::new());
        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        assert_eq!(extract(&mut parts, &state).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_valid_api_token() {
        let state = create_test_state(InMemoryAccessStore::new().with_api_token("tok-1", user("u1")));
        let mut parts = parts_with_header("authorization", "Bearer tok-1");

        assert_eq!(extract(&mut parts, &state).await.unwrap(), Some(user("u1")));
    }

    #[tokio::test]
    async fn test_unknown_api_token_is_rejected() {
        let state = create_test_state(InMemoryAccessStore::new());
        let mut parts = parts_with_header("authorization", "Bearer nope");

        let err = extract(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_api_tokens_disabled_ignores_bearer() {
        let mut state = create_test_state(InMemoryAccessStore::new().with_api_token("tok-1", user("u1")));
        state.config.auth.api_tokens.enabled = false;
        let mut parts = parts_with_header("authorization", "Bearer tok-1");

        assert_eq!(extract(&mut parts, &state).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_bearer_authorization_is_ignored() {
        let state = create_test_state(InMemoryAccessStore::new());
        let mut parts = parts_with_header("authorization", "Basic dXNlcjpwYXNz");

        assert_eq!(extract(&mut parts, &state).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_valid_session_cookie() {
        let state = create_test_state(InMemoryAccessStore::new());
        let token = session::create_session_token(&user("u2"), &create_test_config()).unwrap();
        let cookie = format!("other=1; {}={token}", state.config.auth.session.cookie_name);
        let mut parts = parts_with_header("cookie", &cookie);

        assert_eq!(extract(&mut parts, &state).await.unwrap(), Some(user("u2")));
    }

    #[tokio::test]
    async fn test_invalid_session_cookie_is_anonymous() {
        let state = create_test_state(InMemoryAccessStore::new());
        let cookie = format!("{}=garbage", state.config.auth.session.cookie_name);
        let mut parts = parts_with_header("cookie", &cookie);

        assert_eq!(extract(&mut parts, &state).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_valid_cookie_wins_over_bad_token() {
        let state = create_test_state(InMemoryAccessStore::new());
        let token = session::create_session_token(&user("u3"), &create_test_config()).unwrap();
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header("authorization", "Bearer nope")
            .header("cookie", format!("{}={token}", state.config.auth.session.cookie_name))
            .body(())
            .unwrap();
        let (mut parts, _body) = request.into_parts();

        assert_eq!(extract(&mut parts, &state).await.unwrap(), Some(user("u3")));
    }
}
