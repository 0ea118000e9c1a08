pub mod engine_error;
pub use engine_error::*;

pub mod batch_tracker;
pub use batch_tracker::*;

pub mod analysis;
pub use analysis::*;

pub mod analysis_engine;
pub use analysis_engine::*;
