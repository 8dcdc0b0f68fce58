use crate::errors::BuildError;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Type name of the default context implementation.
pub const GENERIC_CONTEXT_TYPE: &str = "arbor.GenericContext";

/// A named, hierarchical object-composition container.
///
/// This is the consumer-facing surface of a built context. The parent link
/// is weak; the child list is owning. A context stays alive as long as it
/// is reachable as a child or still registered.
pub trait Context: Send + Sync {
    /// Context name, unique within the registry.
    fn name(&self) -> &str;

    /// Whether object names inside this context are case sensitive.
    fn is_case_sensitive(&self) -> bool;

    /// Ordered resource URIs this context was declared with.
    fn resources(&self) -> Vec<String>;

    /// The parent context, if it is still alive.
    fn parent(&self) -> Option<Arc<dyn Context>>;

    /// Child contexts in build order.
    fn children(&self) -> Vec<Arc<dyn Context>>;

    /// Attach a freshly built child to this context's child list.
    fn attach_child(&self, child: Arc<dyn Context>) -> Result<(), BuildError>;

    /// Whether this context directly contains an object of the given name.
    fn contains_object(&self, name: &str) -> bool;

    /// Retrieve an object by name.
    fn get_object(&self, name: &str) -> Result<Arc<dyn Any + Send + Sync>, BuildError>;

    /// Introspection metadata for this context.
    fn metadata(&self) -> ContextMetadata;
}

/// A context whose configuration can still be amended before it is
/// committed.
///
/// Externally configured roots are built through this surface: the host
/// settings singleton is registered first, then [`refresh`] commits the
/// configuration and makes the context ready for object resolution.
///
/// [`refresh`]: ConfigurableContext::refresh
pub trait ConfigurableContext: Context {
    /// Register a singleton object under the given name.
    fn register_singleton(
        &self,
        name: &str,
        value: Arc<dyn Any + Send + Sync>,
    ) -> Result<(), BuildError>;

    /// Commit the configuration and make the context ready for lookups.
    fn refresh(&self) -> Result<(), BuildError>;

    /// How many times this context has been refreshed.
    fn refresh_count(&self) -> usize;

    /// Whether the context has been refreshed at least once.
    fn is_active(&self) -> bool {
        self.refresh_count() > 0
    }

    /// Upcast to the plain consumer interface.
    fn as_context(self: Arc<Self>) -> Arc<dyn Context>;
}

impl std::fmt::Debug for dyn Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Introspection metadata for a built context.
#[derive(Debug, Clone, Serialize)]
pub struct ContextMetadata {
    pub name: String,
    pub type_name: String,
    pub case_sensitive: bool,
    pub resources: Vec<String>,
    pub children: Vec<String>,
    pub active: bool,
}

/// Retrieve a typed object from a context.
///
/// Fails with a type mismatch when the stored object is not of the
/// requested type.
pub fn get_object_of<T: Send + Sync + 'static>(
    context: &dyn Context,
    name: &str,
) -> Result<Arc<T>, BuildError> {
    context
        .get_object(name)?
        .downcast::<T>()
        .map_err(|_| BuildError::type_mismatch(std::any::type_name::<T>()))
}

/// Default context implementation.
///
/// Supports all three construction roles. Objects live in a singleton map
/// keyed by name; lookups fold case when the context is case insensitive.
pub struct GenericContext {
    name: String,
    case_sensitive: bool,
    resources: Vec<String>,
    parent: Option<Weak<dyn Context>>,
    children: RwLock<Vec<Arc<dyn Context>>>,
    singletons: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
    refreshes: AtomicUsize,
}

impl GenericContext {
    /// Build a root context: `(name, case_sensitive, resources)`.
    pub fn root(
        name: &str,
        case_sensitive: bool,
        resources: &[String],
    ) -> Result<Arc<dyn Context>, BuildError> {
        let context = Arc::new(Self::raw(name, case_sensitive, None, resources));
        context.refresh()?;
        Ok(context)
    }

    /// Build a descendant context: `(name, case_sensitive, parent, resources)`.
    pub fn descendant(
        name: &str,
        case_sensitive: bool,
        parent: Arc<dyn Context>,
        resources: &[String],
    ) -> Result<Arc<dyn Context>, BuildError> {
        let context = Arc::new(Self::raw(
            name,
            case_sensitive,
            Some(Arc::downgrade(&parent)),
            resources,
        ));
        context.refresh()?;
        Ok(context)
    }

    /// Build an externally configured context:
    /// `(is_root, name, case_sensitive, parent, resources)`.
    ///
    /// The root of a hosted tree defers its refresh so the instantiator can
    /// pre-register the host settings singleton first.
    pub fn hosted(
        is_root: bool,
        name: &str,
        case_sensitive: bool,
        parent: Option<Arc<dyn Context>>,
        resources: &[String],
    ) -> Result<Arc<dyn ConfigurableContext>, BuildError> {
        let context = Arc::new(Self::raw(
            name,
            case_sensitive,
            parent.as_ref().map(Arc::downgrade),
            resources,
        ));
        if !is_root {
            context.refresh()?;
        }
        Ok(context)
    }

    fn raw(
        name: &str,
        case_sensitive: bool,
        parent: Option<Weak<dyn Context>>,
        resources: &[String],
    ) -> Self {
        Self {
            name: name.to_string(),
            case_sensitive,
            resources: resources.to_vec(),
            parent,
            children: RwLock::new(Vec::new()),
            singletons: RwLock::new(HashMap::new()),
            refreshes: AtomicUsize::new(0),
        }
    }

    /// Factory exposing all three constructor shapes of this type.
    pub fn factory() -> crate::resolution::ContextFactory {
        crate::resolution::ContextFactory::new()
            .with_root(Self::root)
            .with_descendant(Self::descendant)
            .with_hosted(Self::hosted)
    }

    /// Type handle under which this type resolves.
    pub fn type_handle() -> crate::resolution::TypeHandle {
        crate::resolution::TypeHandle::context(GENERIC_CONTEXT_TYPE, Self::factory())
    }

    fn object_key(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }
}

impl Context for GenericContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn resources(&self) -> Vec<String> {
        self.resources.clone()
    }

    fn parent(&self) -> Option<Arc<dyn Context>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    fn children(&self) -> Vec<Arc<dyn Context>> {
        self.children
            .read()
            .map(|children| children.clone())
            .unwrap_or_default()
    }

    fn attach_child(&self, child: Arc<dyn Context>) -> Result<(), BuildError> {
        let mut children = self.children.write().map_err(|_| BuildError::Lock {
            resource: "context_children".to_string(),
        })?;
        children.push(child);
        Ok(())
    }

    fn contains_object(&self, name: &str) -> bool {
        let key = self.object_key(name);
        self.singletons
            .read()
            .map(|objects| objects.contains_key(&key))
            .unwrap_or(false)
    }

    fn get_object(&self, name: &str) -> Result<Arc<dyn Any + Send + Sync>, BuildError> {
        let key = self.object_key(name);
        let objects = self.singletons.read().map_err(|_| BuildError::Lock {
            resource: "context_objects".to_string(),
        })?;
        objects
            .get(&key)
            .cloned()
            .ok_or_else(|| BuildError::not_found(name))
    }

    fn metadata(&self) -> ContextMetadata {
        ContextMetadata {
            name: self.name.clone(),
            type_name: GENERIC_CONTEXT_TYPE.to_string(),
            case_sensitive: self.case_sensitive,
            resources: self.resources.clone(),
            children: self.children().iter().map(|c| c.name().to_string()).collect(),
            active: self.is_active(),
        }
    }
}

impl ConfigurableContext for GenericContext {
    fn register_singleton(
        &self,
        name: &str,
        value: Arc<dyn Any + Send + Sync>,
    ) -> Result<(), BuildError> {
        let key = self.object_key(name);
        let mut objects = self.singletons.write().map_err(|_| BuildError::Lock {
            resource: "context_objects".to_string(),
        })?;
        objects.insert(key, value);
        Ok(())
    }

    fn refresh(&self) -> Result<(), BuildError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("context '{}' refreshed", self.name);
        Ok(())
    }

    fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn as_context(self: Arc<Self>) -> Arc<dyn Context> {
        self
    }
}

impl std::fmt::Debug for GenericContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericContext")
            .field("name", &self.name)
            .field("case_sensitive", &self.case_sensitive)
            .field("resource_count", &self.resources.len())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources(uris: &[&str]) -> Vec<String> {
        uris.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_root_context_basics() {
        let root = GenericContext::root("root", true, &resources(&["a.xml", "b.xml"])).unwrap();
        assert_eq!(root.name(), "root");
        assert_eq!(root.resources(), vec!["a.xml", "b.xml"]);
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_descendant_holds_weak_parent() {
        let root = GenericContext::root("root", true, &[]).unwrap();
        let child = GenericContext::descendant("child", true, root.clone(), &[]).unwrap();

        let parent = child.parent().expect("parent should be alive");
        assert_eq!(parent.name(), "root");

        drop(parent);
        drop(root);
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_attach_child_preserves_order() {
        let root = GenericContext::root("root", true, &[]).unwrap();
        let a = GenericContext::descendant("a", true, root.clone(), &[]).unwrap();
        let b = GenericContext::descendant("b", true, root.clone(), &[]).unwrap();
        root.attach_child(a).unwrap();
        root.attach_child(b).unwrap();

        let names: Vec<String> = root.children().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_case_insensitive_object_lookup() {
        let context = Arc::new(GenericContext::raw("ci", false, None, &[]));
        context
            .register_singleton("DataSource", Arc::new(42usize))
            .unwrap();

        assert!(context.contains_object("datasource"));
        assert!(context.contains_object("DATASOURCE"));
        let value = get_object_of::<usize>(context.as_ref(), "dataSOURCE").unwrap();
        assert_eq!(*value, 42);
    }

    #[test]
    fn test_case_sensitive_object_lookup() {
        let context = Arc::new(GenericContext::raw("cs", true, None, &[]));
        context
            .register_singleton("DataSource", Arc::new(42usize))
            .unwrap();

        assert!(context.contains_object("DataSource"));
        assert!(!context.contains_object("datasource"));
        assert!(context.get_object("datasource").unwrap_err().is_not_found());
    }

    #[test]
    fn test_typed_lookup_mismatch() {
        let context = Arc::new(GenericContext::raw("ctx", true, None, &[]));
        context
            .register_singleton("value", Arc::new("a string".to_string()))
            .unwrap();

        let err = get_object_of::<usize>(context.as_ref(), "value").unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_hosted_root_defers_refresh() {
        let root = GenericContext::hosted(true, "root", true, None, &[]).unwrap();
        assert!(!root.is_active());
        root.refresh().unwrap();
        assert_eq!(root.refresh_count(), 1);
    }

    #[test]
    fn test_hosted_non_root_self_refreshes() {
        let parent = GenericContext::root("root", true, &[]).unwrap();
        let child = GenericContext::hosted(false, "child", true, Some(parent), &[]).unwrap();
        assert!(child.is_active());
        assert_eq!(child.refresh_count(), 1);
    }

    #[test]
    fn test_metadata() {
        let root = GenericContext::root("root", true, &resources(&["a.xml"])).unwrap();
        let child = GenericContext::descendant("child", true, root.clone(), &[]).unwrap();
        root.attach_child(child).unwrap();

        let metadata = root.metadata();
        assert_eq!(metadata.name, "root");
        assert_eq!(metadata.type_name, GENERIC_CONTEXT_TYPE);
        assert_eq!(metadata.resources, vec!["a.xml"]);
        assert_eq!(metadata.children, vec!["child"]);
        assert!(metadata.active);
    }
}
