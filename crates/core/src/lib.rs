//! Bootstraps hierarchies of application contexts from declarative
//! configuration: parses context declarations into a tree, resolves each
//! context's concrete type and constructor shape, instantiates it with the
//! argument set for its role, and publishes it to a process-wide named
//! registry.

pub mod config;
pub mod context;
pub mod errors;
pub mod resolution;

// Re-export key types for convenience (specific exports to avoid ambiguity)
pub use config::{ConfigNode, ContextSpec, SectionReader};
pub use context::{
    get_object_of, ConfigurableContext, ConstructionPlan, Context, ContextLoader,
    ContextLoaderBuilder, ContextMetadata, ContextRegistry, GenericContext, HostSettings, Role,
    GENERIC_CONTEXT_TYPE,
};
pub use errors::BuildError;
pub use resolution::{resolve_context_type, ContextFactory, TypeHandle, TypeLoader, TypeRegistry};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Framework information
pub const FRAMEWORK_NAME: &str = "arbor";

/// Get framework version
pub fn version() -> &'static str {
    VERSION
}

/// Get framework name
pub fn name() -> &'static str {
    FRAMEWORK_NAME
}
