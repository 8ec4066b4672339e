//! Demo authentication: token issuance, the session store and its renewal timer.

pub mod renewal;
pub mod store;
pub mod token;

pub use renewal::{TokenRenewalTask, DEFAULT_RENEWAL_INTERVAL};
pub use store::{demo_user, AuthError, AuthStore, DecodeFailurePolicy, TokenCheckOutcome};
pub use token::{DemoClaims, TokenError, TokenService};
