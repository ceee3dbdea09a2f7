pub mod cache;
pub mod reporting;

pub use cache::*;
pub use reporting::*;
