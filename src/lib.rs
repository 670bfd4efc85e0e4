//! Export Azure resource configuration change history via Resource Graph.
//!
//! The library surface exists so integration tests can drive a full run
//! against mocked endpoints; the `argexport` binary is the intended consumer.

pub mod azure;
pub mod config;
pub mod export;
pub mod run;
