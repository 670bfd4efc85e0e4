//! Azure REST API integration
//!
//! Token acquisition, the rate-limit-aware request executor, and the
//! Resource Graph query modules built on top of it.

pub mod auth;
pub mod changes;
pub mod client;
pub mod resources;
