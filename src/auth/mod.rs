//! Caller-identity plumbing.
//!
//! Identity issuance lives in the external identity provider; this module
//! only validates its access tokens and exposes the caller as an Axum
//! extractor.

pub mod jwt;
pub mod middleware;

pub use middleware::{AuthUser, Identity};
