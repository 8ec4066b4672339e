//! Length-of-stay (TMI) calculations.
//!
//! TMI is the number of days between admission and discharge, rounded up and
//! never less than one day. None of these functions fail: a missing or
//! unparseable date makes the stay count as undefined and it is left out of
//! averages.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use shared::{ProcedureTmi, TmiCategory, TmiClassification, TmiRecord, TmiSummary};
use std::collections::HashMap;
use tracing::info;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Label used for stays without a diagnosis
pub const NO_DIAGNOSIS_LABEL: &str = "Sem diagnóstico";

/// Naive date-time layouts accepted besides RFC 3339; interpreted as UTC
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 date or date-time into an instant
pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Days between `start` and `end`, rounded up with a minimum of one day.
///
/// Returns `None` when either date is missing or does not parse.
pub fn calculate_tmi(start: Option<&str>, end: Option<&str>) -> Option<i64> {
    let start = parse_instant(start?)?;
    let end = parse_instant(end?)?;

    let elapsed_ms = (end - start).num_milliseconds() as f64;
    let days = (elapsed_ms / MILLIS_PER_DAY).ceil() as i64;
    Some(days.max(1))
}

fn record_tmi(record: &TmiRecord) -> Option<i64> {
    calculate_tmi(record.start_date.as_deref(), record.end_date.as_deref())
}

fn rounded_mean(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().sum();
    Some((sum as f64 / values.len() as f64).round() as i64)
}

/// Rounded mean TMI over the records with valid dates
pub fn calculate_average_tmi(records: &[TmiRecord]) -> Option<i64> {
    let values: Vec<i64> = records.iter().filter_map(record_tmi).collect();
    rounded_mean(&values)
}

/// Mean TMI per diagnosis label, longest stays first.
///
/// Groups with no valid stay have no mean and sort last; ties keep the order
/// in which the labels first appeared.
pub fn calculate_tmi_by_procedure(records: &[TmiRecord]) -> Vec<ProcedureTmi> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (usize, Vec<i64>)> = HashMap::new();

    for record in records {
        let label = record
            .label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .unwrap_or(NO_DIAGNOSIS_LABEL)
            .to_string();

        let entry = groups.entry(label.clone()).or_insert_with(|| {
            order.push(label);
            (0, Vec::new())
        });
        entry.0 += 1;
        if let Some(tmi) = record_tmi(record) {
            entry.1.push(tmi);
        }
    }

    let mut result: Vec<ProcedureTmi> = order
        .into_iter()
        .filter_map(|label| {
            groups.remove(&label).map(|(count, values)| ProcedureTmi {
                procedure: label,
                average_tmi: rounded_mean(&values),
                count,
            })
        })
        .collect();

    // None < Some, so a descending sort puts undefined groups last
    result.sort_by(|a, b| b.average_tmi.cmp(&a.average_tmi));
    result
}

/// Band a TMI value: up to 3 days short, 7 medium, 15 long, above that very long
pub fn classify_tmi(days: Option<i64>) -> TmiClassification {
    let (category, label, color) = match days {
        None => (TmiCategory::Undefined, "Indefinido", "gray"),
        Some(d) if d <= 3 => (TmiCategory::Short, "Curto", "green"),
        Some(d) if d <= 7 => (TmiCategory::Medium, "Médio", "yellow"),
        Some(d) if d <= 15 => (TmiCategory::Long, "Longo", "orange"),
        Some(_) => (TmiCategory::VeryLong, "Muito longo", "red"),
    };

    TmiClassification {
        category,
        label: label.to_string(),
        color: color.to_string(),
    }
}

/// Service wrapper used by the REST layer and the dashboard
#[derive(Clone, Default)]
pub struct TmiService;

impl TmiService {
    pub fn new() -> Self {
        Self
    }

    /// Average, band and per-label breakdown for a list of stays
    pub fn summarize(&self, records: &[TmiRecord]) -> TmiSummary {
        let valid_records = records.iter().filter(|r| record_tmi(r).is_some()).count();
        let average_tmi = calculate_average_tmi(records);

        info!(
            "TMI summary over {} records ({} valid): average {:?}",
            records.len(),
            valid_records,
            average_tmi
        );

        TmiSummary {
            average_tmi,
            classification: classify_tmi(average_tmi),
            by_procedure: calculate_tmi_by_procedure(records),
            valid_records,
            total_records: records.len(),
        }
    }
}
