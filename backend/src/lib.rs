//! # Audit Dashboard Backend
//!
//! Non-UI logic of the healthcare audit dashboard.
//!
//! ## Architecture
//!
//! ```text
//! UI (dashboard panels)
//!     ↓
//! IO Layer (REST handlers)
//!     ↓
//! Domain Layer (TMI, TISS export, auth store, dashboard cards)
//!     ↓
//! Storage Layer (persisted session)
//! ```
//!
//! Services are created once in [`initialize_backend`] and shared through
//! [`AppState`]; nothing here relies on global mutable state.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{AuthStore, DashboardService, TissExportService, TmiService, TokenService};
use crate::storage::{JsonConnection, SessionRepository};

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub tmi_service: TmiService,
    pub export_service: TissExportService,
    pub auth_store: Arc<AuthStore>,
}

/// Wire storage and services together and restore the persisted session
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage in {}", config.data_dir.display());
    let connection = JsonConnection::new(&config.data_dir)?;
    let session_repository = Arc::new(SessionRepository::new(connection, &config.storage_name));

    info!("Setting up domain services");
    let auth_store = Arc::new(AuthStore::create(
        session_repository,
        TokenService::new(&config.token_secret),
        config.decode_failure_policy,
    ));
    info!("Token decode failures: {:?}", auth_store.decode_failure_policy());
    auth_store.restore()?;

    Ok(AppState {
        dashboard_service: DashboardService::new(),
        tmi_service: TmiService::new(),
        export_service: TissExportService::new(&config.export_dir),
        auth_store,
    })
}

/// Router with all API routes under `/api`
pub fn create_router(app_state: AppState, allowed_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let cors = match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!("Invalid allowed origin '{}': {}. Allowing any origin", allowed_origin, e);
            cors.allow_origin(Any)
        }
    };

    Router::new()
        .nest("/api", io::rest::api_routes())
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DecodeFailurePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_backend_wires_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            data_dir: temp_dir.path().join("data"),
            export_dir: temp_dir.path().join("exports"),
            decode_failure_policy: DecodeFailurePolicy::Ignore,
            ..AppConfig::default()
        };

        let state = initialize_backend(&config).unwrap();
        assert_eq!(state.auth_store.decode_failure_policy(), DecodeFailurePolicy::Ignore);
        assert!(!state.auth_store.is_authenticated());
        assert!(config.data_dir.exists());
    }
}
