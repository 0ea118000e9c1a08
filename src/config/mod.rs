pub mod config_error;
pub use config_error::*;

pub mod engine_config;
pub use engine_config::*;
