pub mod aggregation_request;
pub use aggregation_request::*;

pub mod table_router;
pub use table_router::*;

pub mod build_error;
pub use build_error::*;

pub mod request_builder;
pub use request_builder::*;
