//! REST handlers, one file per area of the dashboard.

pub mod auth_apis;
pub mod dashboard_apis;
pub mod export_apis;
pub mod tmi_apis;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// Routes mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/pendencies", get(dashboard_apis::get_pendency_summary))
        .route("/dashboard/contracts/alerts", get(dashboard_apis::get_contract_alerts))
        .route("/dashboard/payments/delays", get(dashboard_apis::get_payment_delays))
        .route("/dashboard/profitability", get(dashboard_apis::get_profitability))
        .route("/dashboard/metrics", get(dashboard_apis::get_operational_metrics))
        .route("/tmi/summary", post(tmi_apis::summarize_tmi))
        .route("/tmi/classify/:days", get(tmi_apis::classify))
        .route("/export/tiss", post(export_apis::export_tiss))
        .route("/export/tiss/preview", post(export_apis::preview_tiss))
        .route("/auth/demo-login", post(auth_apis::login_demo))
        .route("/auth/logout", post(auth_apis::logout))
        .route("/auth/session", get(auth_apis::get_session))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::domain::{AuthStore, DashboardService, DecodeFailurePolicy, TissExportService, TmiService, TokenService};
    use crate::storage::json::test_utils::TestEnvironment;
    use crate::{create_router, AppState};

    /// Router over temp-dir backed services; keep the environment alive for the test
    pub fn test_app() -> (TestEnvironment, AppState, Router) {
        let env = TestEnvironment::new().expect("Failed to create test environment");
        let state = AppState {
            dashboard_service: DashboardService::new(),
            tmi_service: TmiService::new(),
            export_service: TissExportService::new(env.base_path.join("exports")),
            auth_store: Arc::new(AuthStore::create(
                env.session_repository(),
                TokenService::new("test-secret"),
                DecodeFailurePolicy::Logout,
            )),
        };
        let router = create_router(state.clone(), "http://localhost:8080");
        (env, state, router)
    }

    pub async fn send(router: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .expect("Failed to build request");

        let response = router.clone().oneshot(request).await.expect("Request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body");
        (status, String::from_utf8_lossy(&bytes).to_string())
    }
}
