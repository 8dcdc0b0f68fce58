pub mod handle;
pub mod registry;

pub use handle::*;
pub use registry::*;
