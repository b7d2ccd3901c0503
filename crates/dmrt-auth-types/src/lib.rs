//! Auth types shared across DMRT crates.
//!
//! Provides the signed session credential, the session cookie builders, the
//! `MaybeSession` extractor and the access-control guards.

pub mod cookie;
pub mod guard;
pub mod session;
