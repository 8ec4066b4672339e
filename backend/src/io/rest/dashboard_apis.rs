use axum::extract::{Query, State};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use shared::{ContractExpirationAlert, OperationalMetrics, PaymentDelayRow, PendencySummary, ProfitabilityEntry};
use tracing::info;

use crate::AppState;

/// Optional reference day; defaults to today
#[derive(Deserialize, Debug, Default)]
pub struct DashboardQuery {
    pub date: Option<NaiveDate>,
}

impl DashboardQuery {
    fn reference_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// GET /api/dashboard/pendencies
pub async fn get_pendency_summary(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<PendencySummary> {
    info!("GET /api/dashboard/pendencies - query: {:?}", query);
    Json(state.dashboard_service.pendency_summary(query.reference_date()))
}

/// GET /api/dashboard/contracts/alerts
pub async fn get_contract_alerts(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<Vec<ContractExpirationAlert>> {
    info!("GET /api/dashboard/contracts/alerts - query: {:?}", query);
    Json(state.dashboard_service.contract_alerts(query.reference_date()))
}

/// GET /api/dashboard/payments/delays
pub async fn get_payment_delays(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<Vec<PaymentDelayRow>> {
    info!("GET /api/dashboard/payments/delays - query: {:?}", query);
    Json(state.dashboard_service.payment_delays(query.reference_date()))
}

/// GET /api/dashboard/profitability
pub async fn get_profitability(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<Vec<ProfitabilityEntry>> {
    info!("GET /api/dashboard/profitability");
    Json(state.dashboard_service.profitability(query.reference_date()))
}

/// GET /api/dashboard/metrics
pub async fn get_operational_metrics(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<OperationalMetrics> {
    info!("GET /api/dashboard/metrics - query: {:?}", query);
    Json(state.dashboard_service.metrics(query.reference_date()))
}
