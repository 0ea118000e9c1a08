pub mod sum_cell;
pub use sum_cell::*;

pub mod avg_cell;
pub use avg_cell::*;

pub mod count_cell;
pub use count_cell::*;

pub mod fallback_cell;
pub use fallback_cell::*;
