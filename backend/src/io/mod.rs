//! # IO Module
//!
//! Interface layer exposing the domain to the dashboard UI. Handlers only
//! translate between HTTP and domain calls; no business rules live here.

pub mod rest;
