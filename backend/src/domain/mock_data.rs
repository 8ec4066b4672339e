//! Fixed demo data behind the dashboard.
//!
//! Dates are expressed relative to the reference day so the cards always show
//! a realistic mix of upcoming expirations, late payments and recent stays.

use chrono::{Duration, NaiveDate};
use shared::TmiRecord;

use super::models::{
    AuditedGuide, Contract, DashboardData, Invoice, Pendency, PendencyStatus, ProviderFinancials,
};

const HOSPITAL_SANTA_CLARA: &str = "Hospital Santa Clara";
const CLINICA_VIDA: &str = "Clínica Vida";
const LAB_DIAGNOSE: &str = "Laboratório Diagnose";
const HOSPITAL_SAO_LUCAS: &str = "Hospital São Lucas";

fn offset(today: NaiveDate, days: i64) -> NaiveDate {
    today + Duration::days(days)
}

fn pendency(
    id: &str,
    guide_number: &str,
    provider: &str,
    pendency_type: &str,
    billed_value: f64,
    contracted_value: f64,
    status: PendencyStatus,
) -> Pendency {
    Pendency {
        id: id.to_string(),
        guide_number: guide_number.to_string(),
        provider: provider.to_string(),
        pendency_type: pendency_type.to_string(),
        billed_value,
        contracted_value,
        status,
    }
}

fn admission(today: NaiveDate, admitted_days_ago: i64, stay_days: Option<i64>, label: &str) -> TmiRecord {
    let start = offset(today, -admitted_days_ago);
    TmiRecord {
        start_date: Some(start.format("%Y-%m-%d").to_string()),
        end_date: stay_days.map(|days| offset(start, days).format("%Y-%m-%d").to_string()),
        label: Some(label.to_string()),
    }
}

pub fn dashboard_data(today: NaiveDate) -> DashboardData {
    use PendencyStatus::{Open, Resolved};

    let pendencies = vec![
        pendency("P-001", "G-10021", HOSPITAL_SANTA_CLARA, "Valor acima do contratado", 4_850.00, 3_900.00, Open),
        pendency("P-002", "G-10022", HOSPITAL_SANTA_CLARA, "Procedimento não autorizado", 1_200.00, 0.00, Open),
        pendency("P-003", "G-10035", CLINICA_VIDA, "Valor acima do contratado", 680.50, 540.00, Open),
        pendency("P-004", "G-10040", LAB_DIAGNOSE, "Quantidade acima da autorizada", 320.00, 160.00, Open),
        pendency("P-005", "G-10041", LAB_DIAGNOSE, "Valor acima do contratado", 95.00, 80.00, Resolved),
        pendency("P-006", "G-10052", HOSPITAL_SAO_LUCAS, "Material sem cobertura", 2_310.00, 0.00, Open),
        pendency("P-007", "G-10053", HOSPITAL_SAO_LUCAS, "Procedimento não autorizado", 780.00, 0.00, Open),
    ];

    let contracts = vec![
        Contract { id: "CT-2021-014".to_string(), provider: HOSPITAL_SANTA_CLARA.to_string(), expires_on: offset(today, 12) },
        Contract { id: "CT-2022-003".to_string(), provider: CLINICA_VIDA.to_string(), expires_on: offset(today, 45) },
        Contract { id: "CT-2020-031".to_string(), provider: LAB_DIAGNOSE.to_string(), expires_on: offset(today, -5) },
        Contract { id: "CT-2023-008".to_string(), provider: HOSPITAL_SAO_LUCAS.to_string(), expires_on: offset(today, 80) },
        Contract { id: "CT-2024-002".to_string(), provider: "Clínica Bem Estar".to_string(), expires_on: offset(today, 240) },
    ];

    let invoices = vec![
        Invoice { number: "NF-88012".to_string(), provider: HOSPITAL_SANTA_CLARA.to_string(), due_date: offset(today, -40), paid_date: Some(offset(today, -22)), amount: 58_300.00 },
        Invoice { number: "NF-88019".to_string(), provider: CLINICA_VIDA.to_string(), due_date: offset(today, -15), paid_date: None, amount: 7_450.90 },
        Invoice { number: "NF-88023".to_string(), provider: LAB_DIAGNOSE.to_string(), due_date: offset(today, -30), paid_date: Some(offset(today, -31)), amount: 3_120.00 },
        Invoice { number: "NF-88031".to_string(), provider: HOSPITAL_SAO_LUCAS.to_string(), due_date: offset(today, -3), paid_date: None, amount: 41_980.35 },
        Invoice { number: "NF-88040".to_string(), provider: HOSPITAL_SAO_LUCAS.to_string(), due_date: offset(today, 10), paid_date: None, amount: 12_000.00 },
    ];

    let financials = vec![
        ProviderFinancials { provider: HOSPITAL_SANTA_CLARA.to_string(), revenue: 412_000.00, cost: 351_500.00 },
        ProviderFinancials { provider: CLINICA_VIDA.to_string(), revenue: 96_400.00, cost: 71_200.00 },
        ProviderFinancials { provider: LAB_DIAGNOSE.to_string(), revenue: 48_900.00, cost: 29_800.00 },
        ProviderFinancials { provider: HOSPITAL_SAO_LUCAS.to_string(), revenue: 288_300.00, cost: 301_150.00 },
    ];

    let guides = (0..20)
        .map(|i| AuditedGuide {
            guide_number: format!("G-{}", 10_020 + i),
            // every fifth guide is held back by a pendency
            approved: i % 5 != 2,
        })
        .collect();

    let admissions = vec![
        admission(today, 30, Some(3), "Pneumonia"),
        admission(today, 25, Some(6), "Pneumonia"),
        admission(today, 20, Some(1), "Apendicectomia"),
        admission(today, 18, Some(12), "Insuficiência cardíaca"),
        admission(today, 10, Some(2), "Apendicectomia"),
        admission(today, 4, None, "Fratura de fêmur"),
    ];

    DashboardData {
        pendencies,
        contracts,
        invoices,
        financials,
        guides,
        admissions,
    }
}
