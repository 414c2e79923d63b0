pub mod definition;
pub mod sanitize;
pub mod types;
