pub mod reader;
pub mod schema;
pub mod section;

pub use reader::*;
pub use section::*;
