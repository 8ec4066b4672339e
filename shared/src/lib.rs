use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry id of the operator used when the export request omits one
pub const DEFAULT_REGISTRY_ID: &str = "309222";

/// Batch number used when the export request omits one
pub const DEFAULT_BATCH_NUMBER: &str = "999999";

/// A procedure line of a billing guide, as audited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    /// Procedure code in the billing table (TUSS)
    pub code: String,
    pub description: String,
    pub quantity: u32,
    pub unit_value: f64,
    pub total_value: f64,
    /// Position of the item inside the guide (1-based)
    pub sequence_index: u32,
    /// Free-form audit status, e.g. "APPROVED", "REJECTED", "PENDING"
    pub status: String,
}

impl Procedure {
    /// Whether the audit status is "APPROVED", ignoring case and surrounding whitespace
    pub fn is_approved(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("APPROVED")
    }
}

/// Request for exporting a guide as a TISS XML document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub guide_number: String,
    pub procedures: Vec<Procedure>,
    #[serde(default)]
    pub registry_id: Option<String>,
    #[serde(default)]
    pub batch_number: Option<String>,
}

impl ExportOptions {
    pub fn registry_id(&self) -> &str {
        self.registry_id.as_deref().unwrap_or(DEFAULT_REGISTRY_ID)
    }

    pub fn batch_number(&self) -> &str {
        self.batch_number.as_deref().unwrap_or(DEFAULT_BATCH_NUMBER)
    }
}

/// Result of writing a TISS document to the export directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportGuideResult {
    pub filename: String,
    pub file_path: String,
    /// Number of approved procedures written to the document
    pub procedure_count: usize,
    pub total_value: f64,
}

/// A hospital stay used for length-of-stay (TMI) calculations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TmiRecord {
    /// Admission date (ISO 8601)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Discharge date (ISO 8601)
    #[serde(default)]
    pub end_date: Option<String>,
    /// Diagnosis or procedure label used for grouping
    #[serde(default)]
    pub label: Option<String>,
}

/// Average length of stay for one diagnosis/procedure label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureTmi {
    pub procedure: String,
    /// Rounded mean TMI in days, None when no stay in the group has valid dates
    pub average_tmi: Option<i64>,
    /// Number of stays in the group
    pub count: usize,
}

/// Length-of-stay band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TmiCategory {
    Short,
    Medium,
    Long,
    VeryLong,
    Undefined,
}

impl fmt::Display for TmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TmiCategory::Short => write!(f, "short"),
            TmiCategory::Medium => write!(f, "medium"),
            TmiCategory::Long => write!(f, "long"),
            TmiCategory::VeryLong => write!(f, "very long"),
            TmiCategory::Undefined => write!(f, "undefined"),
        }
    }
}

/// Band of a TMI value with display hints for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TmiClassification {
    pub category: TmiCategory,
    pub label: String,
    /// Color name the card uses for the badge
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TmiSummary {
    pub average_tmi: Option<i64>,
    pub classification: TmiClassification,
    pub by_procedure: Vec<ProcedureTmi>,
    /// Records with both dates valid
    pub valid_records: usize,
    pub total_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Persisted part of the authentication state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub is_authenticated: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Open pendencies of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendencyTypeSummary {
    pub pendency_type: String,
    pub count: usize,
    /// Disputed value (billed minus contracted/authorized)
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendencySummary {
    pub total_count: usize,
    pub total_value: f64,
    pub by_type: Vec<PendencyTypeSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSeverity {
    Expired,
    Critical,
    Warning,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractExpirationAlert {
    pub contract_id: String,
    pub provider: String,
    pub expires_on: NaiveDate,
    /// Negative when the contract is already expired
    pub days_remaining: i64,
    pub severity: AlertSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDelayRow {
    pub invoice_number: String,
    pub provider: String,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub days_late: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityEntry {
    pub rank: usize,
    pub provider: String,
    pub revenue: f64,
    pub cost: f64,
    pub margin: f64,
    /// Margin over revenue, in percent
    pub margin_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalMetrics {
    pub guides_audited: usize,
    pub guides_approved: usize,
    /// Approved over audited, in percent
    pub approval_rate: f64,
    pub average_tmi: Option<i64>,
    pub open_pendencies: usize,
    pub disputed_value: f64,
}
