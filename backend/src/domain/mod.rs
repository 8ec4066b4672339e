//! # Domain Module
//!
//! Business logic of the audit dashboard, independent of the REST layer and
//! of how data is stored.
//!
//! ## Module Organization
//!
//! - **tmi**: length-of-stay (TMI) day counts, averages, grouping and bands
//! - **tiss_export**: TISS XML document generation and saving
//! - **auth**: demo login, JWT lifecycle, persisted session, renewal timer
//! - **dashboard**: card computations (pendencies, contracts, payments,
//!   profitability, operational metrics)
//! - **mock_data**: the demo data set the dashboard runs on
//! - **models**: source records the cards are computed from

pub mod auth;
pub mod dashboard;
pub mod mock_data;
pub mod models;
pub mod tiss_export;
pub mod tmi;

pub use auth::{AuthError, AuthStore, DecodeFailurePolicy, TokenCheckOutcome, TokenRenewalTask, TokenService};
pub use dashboard::DashboardService;
pub use tiss_export::{escape_xml, generate_tiss_xml, TissExportError, TissExportService};
pub use tmi::{calculate_average_tmi, calculate_tmi, calculate_tmi_by_procedure, classify_tmi, TmiService};
