pub mod deployer;
pub mod state;
pub mod types;
