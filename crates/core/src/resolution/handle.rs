use crate::context::{ConfigurableContext, Context};
use crate::errors::BuildError;
use std::sync::Arc;

/// Constructor shape for a root context: `(name, case_sensitive, resources)`.
pub type RootConstructor =
    Arc<dyn Fn(&str, bool, &[String]) -> Result<Arc<dyn Context>, BuildError> + Send + Sync>;

/// Constructor shape for a descendant context:
/// `(name, case_sensitive, parent, resources)`.
pub type DescendantConstructor = Arc<
    dyn Fn(&str, bool, Arc<dyn Context>, &[String]) -> Result<Arc<dyn Context>, BuildError>
        + Send
        + Sync,
>;

/// Constructor shape for an externally configured context:
/// `(is_root, name, case_sensitive, parent, resources)`.
///
/// The leading flag tells the type whether it is the true root of a hosted
/// tree. A root defers its refresh so the instantiator can pre-register the
/// host settings singleton first; a non-root refreshes itself during
/// construction.
pub type HostedConstructor = Arc<
    dyn Fn(
            bool,
            &str,
            bool,
            Option<Arc<dyn Context>>,
            &[String],
        ) -> Result<Arc<dyn ConfigurableContext>, BuildError>
        + Send
        + Sync,
>;

/// The construction surface a context implementation exposes.
///
/// Each role has one constructor slot, and a type registers exactly the
/// shapes it supports. Selecting a missing shape is a configuration error
/// at build time.
#[derive(Clone, Default)]
pub struct ContextFactory {
    root: Option<RootConstructor>,
    descendant: Option<DescendantConstructor>,
    hosted: Option<HostedConstructor>,
}

impl ContextFactory {
    /// Create an empty factory with no constructor shapes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provide the root constructor shape.
    pub fn with_root<F>(mut self, ctor: F) -> Self
    where
        F: Fn(&str, bool, &[String]) -> Result<Arc<dyn Context>, BuildError>
            + Send
            + Sync
            + 'static,
    {
        self.root = Some(Arc::new(ctor));
        self
    }

    /// Provide the descendant constructor shape.
    pub fn with_descendant<F>(mut self, ctor: F) -> Self
    where
        F: Fn(&str, bool, Arc<dyn Context>, &[String]) -> Result<Arc<dyn Context>, BuildError>
            + Send
            + Sync
            + 'static,
    {
        self.descendant = Some(Arc::new(ctor));
        self
    }

    /// Provide the externally-configured constructor shape.
    pub fn with_hosted<F>(mut self, ctor: F) -> Self
    where
        F: Fn(
                bool,
                &str,
                bool,
                Option<Arc<dyn Context>>,
                &[String],
            ) -> Result<Arc<dyn ConfigurableContext>, BuildError>
            + Send
            + Sync
            + 'static,
    {
        self.hosted = Some(Arc::new(ctor));
        self
    }

    /// The root constructor, if this type supports the root role.
    pub fn root(&self) -> Option<&RootConstructor> {
        self.root.as_ref()
    }

    /// The descendant constructor, if supported.
    pub fn descendant(&self) -> Option<&DescendantConstructor> {
        self.descendant.as_ref()
    }

    /// The externally-configured constructor, if supported.
    pub fn hosted(&self) -> Option<&HostedConstructor> {
        self.hosted.as_ref()
    }
}

impl std::fmt::Debug for ContextFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextFactory")
            .field("root", &self.root.is_some())
            .field("descendant", &self.descendant.is_some())
            .field("hosted", &self.hosted.is_some())
            .finish()
    }
}

/// Handle to a type resolved by name.
///
/// A handle either carries a [`ContextFactory`] (the type is a context
/// implementation) or is opaque (the name resolved, but the type does not
/// satisfy the context capability). The capability check happens when the
/// handle is registered, not by probing at build time.
#[derive(Clone)]
pub struct TypeHandle {
    name: Arc<str>,
    factory: Option<Arc<ContextFactory>>,
}

impl TypeHandle {
    /// Create a handle for a context implementation.
    pub fn context(name: impl Into<String>, factory: ContextFactory) -> Self {
        Self {
            name: name.into().into(),
            factory: Some(Arc::new(factory)),
        }
    }

    /// Create a handle for a resolvable type that is not a context.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into().into(),
            factory: None,
        }
    }

    /// The resolved type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this type satisfies the context capability.
    pub fn is_context(&self) -> bool {
        self.factory.is_some()
    }

    /// The construction surface, or a type mismatch error naming the
    /// offending type.
    pub fn expect_context(&self) -> Result<&ContextFactory, BuildError> {
        self.factory
            .as_deref()
            .ok_or_else(|| BuildError::type_mismatch(self.name()))
    }
}

impl std::fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeHandle")
            .field("name", &self.name)
            .field("is_context", &self.is_context())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GenericContext;

    #[test]
    fn test_opaque_handle_fails_capability_check() {
        let handle = TypeHandle::opaque("legacy.Widget");
        assert!(!handle.is_context());

        let err = handle.expect_context().unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(err.to_string().contains("legacy.Widget"));
    }

    #[test]
    fn test_context_handle_exposes_registered_shapes() {
        let handle = TypeHandle::context(
            "partial.Context",
            ContextFactory::new().with_root(GenericContext::root),
        );

        let factory = handle.expect_context().unwrap();
        assert!(factory.root().is_some());
        assert!(factory.descendant().is_none());
        assert!(factory.hosted().is_none());
    }
}
