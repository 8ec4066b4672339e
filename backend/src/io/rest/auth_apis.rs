use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use crate::domain::AuthError;
use crate::AppState;

fn auth_error_response(e: AuthError) -> Response {
    error!("Auth operation failed: {}", e);
    match e {
        AuthError::Disposed => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error").into_response(),
    }
}

/// POST /api/auth/demo-login
pub async fn login_demo(State(state): State<AppState>) -> Response {
    info!("POST /api/auth/demo-login");
    match state.auth_store.login_demo() {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => auth_error_response(e),
    }
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    info!("POST /api/auth/logout");
    match state.auth_store.logout() {
        Ok(()) => (StatusCode::OK, Json(state.auth_store.session())).into_response(),
        Err(e) => auth_error_response(e),
    }
}

/// GET /api/auth/session
pub async fn get_session(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.auth_store.session())).into_response()
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send, test_app};
    use axum::http::StatusCode;
    use shared::AuthSession;

    #[tokio::test]
    async fn test_login_session_logout_flow() {
        let (_env, _state, router) = test_app();

        let (status, body) = send(&router, "GET", "/api/auth/session", None).await;
        assert_eq!(status, StatusCode::OK);
        let session: AuthSession = serde_json::from_str(&body).unwrap();
        assert!(!session.is_authenticated);

        let (status, body) = send(&router, "POST", "/api/auth/demo-login", None).await;
        assert_eq!(status, StatusCode::OK);
        let session: AuthSession = serde_json::from_str(&body).unwrap();
        assert!(session.is_authenticated);
        assert!(session.access_token.is_some());

        let (_, body) = send(&router, "GET", "/api/auth/session", None).await;
        let current: AuthSession = serde_json::from_str(&body).unwrap();
        assert_eq!(current, session);

        let (status, body) = send(&router, "POST", "/api/auth/logout", None).await;
        assert_eq!(status, StatusCode::OK);
        let session: AuthSession = serde_json::from_str(&body).unwrap();
        assert_eq!(session, AuthSession::default());
    }

    #[tokio::test]
    async fn test_login_after_dispose_is_unavailable() {
        let (_env, state, router) = test_app();
        state.auth_store.dispose().unwrap();

        let (status, _) = send(&router, "POST", "/api/auth/demo-login", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
