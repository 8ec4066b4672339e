//! Dashboard card computations.
//!
//! Each card is a pure function over [`DashboardData`] and the reference day;
//! [`DashboardService`] feeds them the demo data set. The UI only renders
//! what comes out of here.

use chrono::NaiveDate;
use shared::{
    AlertSeverity, ContractExpirationAlert, OperationalMetrics, PaymentDelayRow, PendencySummary,
    PendencyTypeSummary, ProfitabilityEntry,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::info;

use super::mock_data;
use super::models::{AuditedGuide, Contract, DashboardData, Invoice, Pendency, ProviderFinancials};
use super::tmi::calculate_average_tmi;

/// Contracts expiring within this many days raise an alert
pub const CONTRACT_ALERT_WINDOW_DAYS: i64 = 90;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round2(part / whole * 100.0)
    } else {
        0.0
    }
}

/// Open pendencies with their disputed value, grouped by type (largest value first)
pub fn summarize_pendencies(pendencies: &[Pendency]) -> PendencySummary {
    let mut order: Vec<String> = Vec::new();
    let mut by_type: HashMap<String, PendencyTypeSummary> = HashMap::new();
    let mut total_count = 0;
    let mut total_value = 0.0;

    for pendency in pendencies.iter().filter(|p| p.is_open()) {
        total_count += 1;
        total_value += pendency.disputed_value();

        let entry = by_type.entry(pendency.pendency_type.clone()).or_insert_with(|| {
            order.push(pendency.pendency_type.clone());
            PendencyTypeSummary {
                pendency_type: pendency.pendency_type.clone(),
                count: 0,
                value: 0.0,
            }
        });
        entry.count += 1;
        entry.value += pendency.disputed_value();
    }

    let mut by_type: Vec<PendencyTypeSummary> = order
        .iter()
        .filter_map(|t| by_type.remove(t))
        .map(|mut summary| {
            summary.value = round2(summary.value);
            summary
        })
        .collect();
    by_type.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    PendencySummary {
        total_count,
        total_value: round2(total_value),
        by_type,
    }
}

fn alert_severity(days_remaining: i64) -> AlertSeverity {
    match days_remaining {
        d if d < 0 => AlertSeverity::Expired,
        d if d <= 30 => AlertSeverity::Critical,
        d if d <= 60 => AlertSeverity::Warning,
        _ => AlertSeverity::Notice,
    }
}

/// Contracts expired or expiring within the alert window, soonest first
pub fn contract_expiration_alerts(contracts: &[Contract], today: NaiveDate) -> Vec<ContractExpirationAlert> {
    let mut alerts: Vec<ContractExpirationAlert> = contracts
        .iter()
        .filter_map(|contract| {
            let days_remaining = (contract.expires_on - today).num_days();
            if days_remaining > CONTRACT_ALERT_WINDOW_DAYS {
                return None;
            }
            Some(ContractExpirationAlert {
                contract_id: contract.id.clone(),
                provider: contract.provider.clone(),
                expires_on: contract.expires_on,
                days_remaining,
                severity: alert_severity(days_remaining),
            })
        })
        .collect();

    alerts.sort_by_key(|alert| alert.days_remaining);
    alerts
}

/// Invoices paid after their due date, or still unpaid past it; latest first
pub fn payment_delays(invoices: &[Invoice], today: NaiveDate) -> Vec<PaymentDelayRow> {
    let mut rows: Vec<PaymentDelayRow> = invoices
        .iter()
        .filter_map(|invoice| {
            let settled_on = invoice.paid_date.unwrap_or(today);
            let days_late = (settled_on - invoice.due_date).num_days();
            if days_late <= 0 {
                return None;
            }
            Some(PaymentDelayRow {
                invoice_number: invoice.number.clone(),
                provider: invoice.provider.clone(),
                due_date: invoice.due_date,
                paid_date: invoice.paid_date,
                days_late,
                amount: invoice.amount,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.days_late.cmp(&a.days_late));
    rows
}

/// Providers ranked by margin percentage, best first
pub fn profitability_ranking(financials: &[ProviderFinancials]) -> Vec<ProfitabilityEntry> {
    let mut entries: Vec<ProfitabilityEntry> = financials
        .iter()
        .map(|f| {
            let margin = f.revenue - f.cost;
            ProfitabilityEntry {
                rank: 0,
                provider: f.provider.clone(),
                revenue: round2(f.revenue),
                cost: round2(f.cost),
                margin: round2(margin),
                margin_percentage: percentage(margin, f.revenue),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.margin_percentage
            .partial_cmp(&a.margin_percentage)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.margin.partial_cmp(&a.margin).unwrap_or(Ordering::Equal))
    });
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

pub fn operational_metrics(
    guides: &[AuditedGuide],
    pendencies: &[Pendency],
    admissions: &[shared::TmiRecord],
) -> OperationalMetrics {
    let guides_approved = guides.iter().filter(|g| g.approved).count();
    let open: Vec<&Pendency> = pendencies.iter().filter(|p| p.is_open()).collect();

    OperationalMetrics {
        guides_audited: guides.len(),
        guides_approved,
        approval_rate: percentage(guides_approved as f64, guides.len() as f64),
        average_tmi: calculate_average_tmi(admissions),
        open_pendencies: open.len(),
        disputed_value: round2(open.iter().map(|p| p.disputed_value()).sum()),
    }
}

/// Serves dashboard cards computed over the demo data set
#[derive(Clone, Default)]
pub struct DashboardService;

impl DashboardService {
    pub fn new() -> Self {
        Self
    }

    fn data(&self, today: NaiveDate) -> DashboardData {
        mock_data::dashboard_data(today)
    }

    pub fn pendency_summary(&self, today: NaiveDate) -> PendencySummary {
        let summary = summarize_pendencies(&self.data(today).pendencies);
        info!("Pendency summary: {} open, {:.2} disputed", summary.total_count, summary.total_value);
        summary
    }

    pub fn contract_alerts(&self, today: NaiveDate) -> Vec<ContractExpirationAlert> {
        let alerts = contract_expiration_alerts(&self.data(today).contracts, today);
        info!("Contract alerts for {}: {}", today, alerts.len());
        alerts
    }

    pub fn payment_delays(&self, today: NaiveDate) -> Vec<PaymentDelayRow> {
        let rows = payment_delays(&self.data(today).invoices, today);
        info!("Payment delays for {}: {}", today, rows.len());
        rows
    }

    pub fn profitability(&self, today: NaiveDate) -> Vec<ProfitabilityEntry> {
        profitability_ranking(&self.data(today).financials)
    }

    pub fn metrics(&self, today: NaiveDate) -> OperationalMetrics {
        let data = self.data(today);
        operational_metrics(&data.guides, &data.pendencies, &data.admissions)
    }
}
