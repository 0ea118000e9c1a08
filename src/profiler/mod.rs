pub mod data_profile;
pub use data_profile::*;

pub mod data_profiler;
pub use data_profiler::*;
