pub mod alias_table;
pub use alias_table::*;

pub mod column_resolver;
pub use column_resolver::*;
