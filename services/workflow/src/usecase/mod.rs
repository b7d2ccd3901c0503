pub mod authcode;
pub mod rate_limit;
pub mod session;
pub mod submission;
