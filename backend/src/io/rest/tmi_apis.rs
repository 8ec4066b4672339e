use axum::extract::{Path, State};
use axum::Json;
use shared::{TmiClassification, TmiRecord, TmiSummary};
use tracing::info;

use crate::domain::classify_tmi;
use crate::AppState;

/// POST /api/tmi/summary
pub async fn summarize_tmi(State(state): State<AppState>, Json(records): Json<Vec<TmiRecord>>) -> Json<TmiSummary> {
    info!("POST /api/tmi/summary - {} records", records.len());
    Json(state.tmi_service.summarize(&records))
}

/// GET /api/tmi/classify/:days
pub async fn classify(Path(days): Path<i64>) -> Json<TmiClassification> {
    Json(classify_tmi(Some(days)))
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{send, test_app};
    use axum::http::StatusCode;
    use shared::{TmiCategory, TmiClassification, TmiSummary};

    #[tokio::test]
    async fn test_summary_endpoint() {
        let (_env, _state, router) = test_app();
        let body = r#"[
            {"startDate": "2024-01-01", "endDate": "2024-01-04", "label": "Pneumonia"},
            {"startDate": "2024-01-01", "endDate": "2024-01-02"},
            {"startDate": "garbage"}
        ]"#;

        let (status, response) = send(&router, "POST", "/api/tmi/summary", Some(body.to_string())).await;
        assert_eq!(status, StatusCode::OK);

        let summary: TmiSummary = serde_json::from_str(&response).unwrap();
        assert_eq!(summary.average_tmi, Some(2));
        assert_eq!(summary.valid_records, 2);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.by_procedure[0].procedure, "Pneumonia");
    }

    #[tokio::test]
    async fn test_classify_endpoint() {
        let (_env, _state, router) = test_app();
        let (status, response) = send(&router, "GET", "/api/tmi/classify/10", None).await;
        assert_eq!(status, StatusCode::OK);

        let classification: TmiClassification = serde_json::from_str(&response).unwrap();
        assert_eq!(classification.category, TmiCategory::Long);
    }
}
