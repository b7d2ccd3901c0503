//! Service plumbing shared by DMRT binaries: config loading, health handlers,
//! HTTP middleware and tracing setup.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
