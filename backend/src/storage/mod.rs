//! # Storage Module
//!
//! Durable persistence for the dashboard backend. The domain layer only sees
//! the traits in [`traits`]; the JSON file implementation lives in [`json`]
//! and can be swapped without touching domain code.
//!
//! The one durable entry today is the auth session, stored under a fixed
//! storage name inside the configured data directory.

pub mod json;
pub mod traits;

pub use json::{JsonConnection, SessionRepository};
pub use traits::SessionStorage;
