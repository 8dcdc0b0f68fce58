use crate::config::schema;
use crate::context::context::{ConfigurableContext, Context};
use crate::errors::BuildError;
use crate::resolution::TypeHandle;
use std::any::Any;
use std::sync::Arc;

/// Which constructor shape a context is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Outermost context of a plain tree: `(name, case_sensitive, resources)`.
    Root,
    /// Context with a parent: `(name, case_sensitive, parent, resources)`.
    Descendant,
    /// Context driven by an external host configuration object:
    /// `(is_root, name, case_sensitive, parent, resources)`.
    ExternallyConfigured,
}

/// Host settings object handed to externally configured trees.
///
/// The value is registered as a singleton inside the tree's root context
/// before that root is refreshed.
#[derive(Clone)]
pub struct HostSettings {
    object_name: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl HostSettings {
    /// Wrap a host settings object under the default object name.
    pub fn new(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self::named(schema::DEFAULT_HOST_SETTINGS_NAME, value)
    }

    /// Wrap a host settings object under an explicit object name.
    pub fn named(object_name: impl Into<String>, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            object_name: object_name.into(),
            value,
        }
    }

    /// Object name the settings are registered under.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// The wrapped settings object.
    pub fn value(&self) -> Arc<dyn Any + Send + Sync> {
        self.value.clone()
    }
}

impl std::fmt::Debug for HostSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostSettings")
            .field("object_name", &self.object_name)
            .finish()
    }
}

/// A resolved concrete type plus the role it will be constructed under.
#[derive(Debug, Clone)]
pub struct ConstructionPlan {
    handle: TypeHandle,
    role: Role,
}

impl ConstructionPlan {
    /// Select the plan for one node.
    ///
    /// Hosted trees use the externally-configured shape at every depth;
    /// otherwise the role follows from whether the node has a parent.
    /// Verifies the context capability up front.
    pub fn select(handle: TypeHandle, has_parent: bool, hosted: bool) -> Result<Self, BuildError> {
        handle.expect_context()?;
        let role = if hosted {
            Role::ExternallyConfigured
        } else if has_parent {
            Role::Descendant
        } else {
            Role::Root
        };
        Ok(Self { handle, role })
    }

    /// The selected role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The resolved type name.
    pub fn type_name(&self) -> &str {
        self.handle.name()
    }

    /// Invoke the role's constructor with its argument tuple.
    ///
    /// For the externally-configured root, the host settings singleton is
    /// registered first and the context is refreshed exactly once before it
    /// is handed back. Any construction failure is wrapped with the node's
    /// name and type, unless it is already a configuration error.
    pub fn instantiate(
        &self,
        name: &str,
        case_sensitive: bool,
        parent: Option<Arc<dyn Context>>,
        resources: &[String],
        host: Option<&HostSettings>,
    ) -> Result<Arc<dyn Context>, BuildError> {
        let factory = self.handle.expect_context()?;

        let built = match self.role {
            Role::Root => {
                let ctor = factory
                    .root()
                    .ok_or_else(|| self.missing_signature("(name, case_sensitive, resources)"))?;
                ctor(name, case_sensitive, resources)
            }
            Role::Descendant => {
                let ctor = factory.descendant().ok_or_else(|| {
                    self.missing_signature("(name, case_sensitive, parent, resources)")
                })?;
                let parent = parent.clone().ok_or_else(|| {
                    BuildError::configuration(format!(
                        "descendant context '{}' built without a parent",
                        name
                    ))
                })?;
                ctor(name, case_sensitive, parent, resources)
            }
            Role::ExternallyConfigured => {
                let ctor = factory.hosted().ok_or_else(|| {
                    self.missing_signature("(is_root, name, case_sensitive, parent, resources)")
                })?;
                let is_root = parent.is_none();
                ctor(is_root, name, case_sensitive, parent.clone(), resources).and_then(
                    |context| {
                        if is_root {
                            if let Some(host) = host {
                                context.register_singleton(host.object_name(), host.value())?;
                            }
                            context.refresh()?;
                        }
                        Ok(context.as_context())
                    },
                )
            }
        };

        built.map_err(|err| self.wrap_failure(name, err))
    }

    fn missing_signature(&self, shape: &str) -> BuildError {
        BuildError::configuration(format!(
            "no constructor {} found for context type '{}'",
            shape,
            self.handle.name()
        ))
    }

    fn wrap_failure(&self, name: &str, err: BuildError) -> BuildError {
        match err {
            err @ BuildError::Configuration { .. } => err,
            other => BuildError::configuration(format!(
                "error creating context '{}' [{}]: {}",
                name,
                self.handle.name(),
                other
            )),
        }
    }
}
