pub mod aggregation_fn;
pub use aggregation_fn::*;

pub mod cell_accumulator;
pub use cell_accumulator::*;

pub mod functions;
pub use functions::*;

pub mod accumulator_registry;
pub use accumulator_registry::*;

pub mod merger;
pub use merger::*;
