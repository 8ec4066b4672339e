use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::ExportOptions;
use tracing::{error, info, warn};

use crate::domain::{generate_tiss_xml, TissExportError};
use crate::AppState;

fn export_error_response(e: TissExportError) -> Response {
    match e {
        TissExportError::NoApprovedProcedures => {
            warn!("TISS export rejected: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
        }
        TissExportError::Io { .. } => {
            error!("TISS export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to write export file").into_response()
        }
    }
}

/// POST /api/export/tiss
pub async fn export_tiss(State(state): State<AppState>, Json(options): Json<ExportOptions>) -> Response {
    info!("POST /api/export/tiss - guide: {}", options.guide_number);

    match state.export_service.export_guide_xml(&options) {
        Ok(result) => (StatusCode::CREATED, Json(result)).into_response(),
        Err(e) => export_error_response(e),
    }
}

/// POST /api/export/tiss/preview
pub async fn preview_tiss(Json(options): Json<ExportOptions>) -> Response {
    info!("POST /api/export/tiss/preview - guide: {}", options.guide_number);

    match generate_tiss_xml(&options) {
        Ok(xml) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response(),
        Err(e) => export_error_response(e),
    }
}
