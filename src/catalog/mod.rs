pub mod column_data_type;
pub use column_data_type::*;

pub mod column;
pub use column::*;

pub mod column_catalog;
pub use column_catalog::*;
