pub mod parse_context;
pub use parse_context::*;

pub mod rule_chain;
pub use rule_chain::*;

pub mod multi_dimension;
pub use multi_dimension::*;

pub mod time_range;
pub use time_range::*;

pub mod filters;
pub use filters::*;
