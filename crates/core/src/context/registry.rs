use crate::context::context::{Context, ContextMetadata};
use crate::errors::BuildError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

static GLOBAL_REGISTRY: Lazy<Arc<ContextRegistry>> =
    Lazy::new(|| Arc::new(ContextRegistry::new()));

/// Process-wide name-to-context lookup table.
///
/// Names are unique: registering an existing name is a hard error, never
/// an overwrite. Entries are only removed by explicit unregistration or
/// shutdown. All operations serialize internally, so the registry may be
/// shared between concurrent tree builds; readers never observe a
/// partially inserted entry.
pub struct ContextRegistry {
    entries: RwLock<HashMap<String, Arc<dyn Context>>>,
}

impl ContextRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide registry instance.
    ///
    /// Loaders take an injected registry and only default to this one, so
    /// tests and embedded hosts can work against isolated instances.
    pub fn global() -> Arc<ContextRegistry> {
        GLOBAL_REGISTRY.clone()
    }

    /// Register a context under its name.
    ///
    /// Fails with a duplicate name error when an entry with that name is
    /// already present.
    pub fn register(&self, context: Arc<dyn Context>) -> Result<(), BuildError> {
        let name = context.name().to_string();
        let mut entries = self.entries.write().map_err(|_| BuildError::Lock {
            resource: "context_registry".to_string(),
        })?;
        if entries.contains_key(&name) {
            return Err(BuildError::duplicate_name(name));
        }
        entries.insert(name.clone(), context);
        tracing::debug!("context '{}' registered", name);
        Ok(())
    }

    /// Check whether a name is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(name))
            .unwrap_or(false)
    }

    /// Look up a context by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Context>, BuildError> {
        let entries = self.entries.read().map_err(|_| BuildError::Lock {
            resource: "context_registry".to_string(),
        })?;
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| BuildError::not_found(name))
    }

    /// Remove an entry if present; no-op otherwise.
    pub fn unregister(&self, name: &str) -> Result<(), BuildError> {
        let mut entries = self.entries.write().map_err(|_| BuildError::Lock {
            resource: "context_registry".to_string(),
        })?;
        if entries.remove(name).is_some() {
            tracing::debug!("context '{}' unregistered", name);
        }
        Ok(())
    }

    /// Get the number of registered contexts.
    pub fn context_count(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// All registered names, sorted.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Metadata of every registered context, ordered by name.
    pub fn metadata_snapshot(&self) -> Vec<ContextMetadata> {
        let mut snapshot: Vec<ContextMetadata> = self
            .entries
            .read()
            .map(|entries| entries.values().map(|c| c.metadata()).collect())
            .unwrap_or_default();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));
        snapshot
    }

    /// Drop every entry. Explicit shutdown hook for process teardown and
    /// test isolation.
    pub fn shutdown(&self) {
        if let Ok(mut entries) = self.entries.write() {
            tracing::debug!("context registry shut down, {} entries dropped", entries.len());
            entries.clear();
        }
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRegistry")
            .field("context_count", &self.context_count())
            .finish()
    }
}
