pub mod link;
pub mod repository;
pub mod types;
