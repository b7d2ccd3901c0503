pub mod auth_codes;
pub mod leader_approvals;
pub mod submissions;
