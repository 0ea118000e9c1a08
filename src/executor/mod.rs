pub mod aggregation_row;
pub use aggregation_row::*;

pub mod backend;
pub use backend::*;

pub mod executor_error;
pub use executor_error::*;

pub mod payload;
pub use payload::*;

pub mod result_cache;
pub use result_cache::*;

pub mod aggregation_executor;
pub use aggregation_executor::*;

pub mod batch_runner;
pub use batch_runner::*;
