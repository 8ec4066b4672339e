use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::TmiRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendencyStatus {
    Open,
    Resolved,
}

/// A discrepancy between what was billed and what the contract or the
/// authorization allows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pendency {
    pub id: String,
    pub guide_number: String,
    pub provider: String,
    /// e.g. "Valor acima do contratado", "Procedimento não autorizado"
    pub pendency_type: String,
    pub billed_value: f64,
    pub contracted_value: f64,
    pub status: PendencyStatus,
}

impl Pendency {
    /// Amount in dispute; never negative
    pub fn disputed_value(&self) -> f64 {
        (self.billed_value - self.contracted_value).max(0.0)
    }

    pub fn is_open(&self) -> bool {
        self.status == PendencyStatus::Open
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub provider: String,
    pub expires_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub provider: String,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFinancials {
    pub provider: String,
    pub revenue: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditedGuide {
    pub guide_number: String,
    pub approved: bool,
}

/// Everything the dashboard cards are computed from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub pendencies: Vec<Pendency>,
    pub contracts: Vec<Contract>,
    pub invoices: Vec<Invoice>,
    pub financials: Vec<ProviderFinancials>,
    pub guides: Vec<AuditedGuide>,
    pub admissions: Vec<TmiRecord>,
}
