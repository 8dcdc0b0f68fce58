use crate::errors::BuildError;
use crate::resolution::handle::{ContextFactory, TypeHandle};
use std::collections::HashMap;
use std::sync::RwLock;

/// Resolves type names to handles.
///
/// This is the seam to the host's type-loading facility: the bootstrapper
/// only ever asks for a handle by name and never inspects types itself.
pub trait TypeLoader: Send + Sync {
    /// Resolve a type name, failing with a configuration error when the
    /// name is unknown.
    fn resolve_type_by_name(&self, name: &str) -> Result<TypeHandle, BuildError>;
}

/// In-process [`TypeLoader`] backed by a name-keyed table.
///
/// Context implementations register a [`ContextFactory`] under their type
/// name; anything else can be registered opaque so that resolution
/// succeeds but the capability check fails downstream.
pub struct TypeRegistry {
    entries: RwLock<HashMap<String, TypeHandle>>,
}

impl TypeRegistry {
    /// Create an empty type registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the default context type pre-registered.
    pub fn with_defaults() -> Self {
        let handle = crate::context::GenericContext::type_handle();
        let mut entries = HashMap::new();
        entries.insert(handle.name().to_string(), handle);
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Register a context implementation under its type name.
    pub fn register(
        &self,
        name: impl Into<String>,
        factory: ContextFactory,
    ) -> Result<(), BuildError> {
        let name = name.into();
        self.register_handle(TypeHandle::context(name, factory))
    }

    /// Register a resolvable type that is not a context implementation.
    pub fn register_opaque(&self, name: impl Into<String>) -> Result<(), BuildError> {
        self.register_handle(TypeHandle::opaque(name))
    }

    /// Register a pre-built handle.
    pub fn register_handle(&self, handle: TypeHandle) -> Result<(), BuildError> {
        let mut entries = self.entries.write().map_err(|_| BuildError::Lock {
            resource: "type_registry".to_string(),
        })?;
        entries.insert(handle.name().to_string(), handle);
        Ok(())
    }

    /// Check whether a type name is resolvable.
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(name))
            .unwrap_or(false)
    }

    /// Get the number of registered types.
    pub fn type_count(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}

impl TypeLoader for TypeRegistry {
    fn resolve_type_by_name(&self, name: &str) -> Result<TypeHandle, BuildError> {
        let entries = self.entries.read().map_err(|_| BuildError::Lock {
            resource: "type_registry".to_string(),
        })?;
        entries.get(name).cloned().ok_or_else(|| {
            BuildError::configuration(format!("type '{}' could not be resolved", name))
        })
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("type_count", &self.type_count())
            .finish()
    }
}

/// Resolve the concrete context type for one declaration.
///
/// No declared name means the default applies: the parent's resolved type
/// when building a descendant, the loader's configured default type for
/// the outermost root. A declared name is resolved through the loader and
/// must satisfy the context capability.
pub fn resolve_context_type(
    type_name: Option<&str>,
    default: &TypeHandle,
    loader: &dyn TypeLoader,
) -> Result<TypeHandle, BuildError> {
    match type_name {
        None => Ok(default.clone()),
        Some(name) => {
            let handle = loader.resolve_type_by_name(name)?;
            if !handle.is_context() {
                return Err(BuildError::type_mismatch(handle.name()));
            }
            Ok(handle)
        }
    }
}
