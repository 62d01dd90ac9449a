//! MyVault Core - Shared functionality for the myvault tool
//!
//! Standard locations, user configuration and logging setup. Nothing in
//! here knows about records or encryption.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
