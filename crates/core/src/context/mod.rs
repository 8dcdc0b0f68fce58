pub mod context;
pub mod instantiator;
pub mod loader;
pub mod registry;

pub use context::*;
pub use instantiator::*;
pub use loader::*;
pub use registry::*;
