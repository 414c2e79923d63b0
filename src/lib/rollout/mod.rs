pub mod readiness;
pub mod types;
