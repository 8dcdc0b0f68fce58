use crate::config::reader::SectionReader;
use crate::config::section::ConfigNode;
use crate::context::context::{Context, GenericContext};
use crate::context::instantiator::{ConstructionPlan, HostSettings};
use crate::context::registry::ContextRegistry;
use crate::errors::BuildError;
use crate::resolution::{resolve_context_type, TypeHandle, TypeLoader, TypeRegistry};
use std::sync::Arc;

/// Builds a context tree out of declarative configuration and publishes
/// each node to the registry.
///
/// A build runs synchronously and recursively on the calling thread:
/// read the section, resolve the type, select the role, instantiate,
/// register, then recurse into the declared children in order, passing the
/// just-built context as parent. A failure aborts the remaining siblings
/// and descendants of the failing node; contexts registered before the
/// failure stay registered.
pub struct ContextLoader {
    type_loader: Arc<dyn TypeLoader>,
    registry: Arc<ContextRegistry>,
    reader: SectionReader,
    default_type: TypeHandle,
    auto_register: bool,
    host_settings: Option<HostSettings>,
}

impl ContextLoader {
    /// Create a loader with default collaborators: the built-in type
    /// registry, the process-wide context registry, and the generic
    /// context type as default.
    pub fn new() -> Self {
        ContextLoaderBuilder::new().build()
    }

    /// Start configuring a loader.
    pub fn builder() -> ContextLoaderBuilder {
        ContextLoaderBuilder::new()
    }

    /// The registry this loader publishes to.
    pub fn registry(&self) -> &Arc<ContextRegistry> {
        &self.registry
    }

    /// Build the tree declared under `section_name` inside `config` and
    /// return the outermost context.
    pub fn load<C: ConfigNode>(
        &self,
        config: &C,
        section_name: &str,
    ) -> Result<Arc<dyn Context>, BuildError> {
        self.load_with_parent(None, config, Some(section_name))
    }

    /// Build a tree under an explicit parent.
    ///
    /// A `section_name` of `None` signals that `node` is already the target
    /// section rather than a tree to look the section up in.
    pub fn load_with_parent<C: ConfigNode>(
        &self,
        parent: Option<Arc<dyn Context>>,
        node: &C,
        section_name: Option<&str>,
    ) -> Result<Arc<dyn Context>, BuildError> {
        self.build_branch(parent, None, node, section_name)
    }

    fn build_branch<C: ConfigNode>(
        &self,
        parent: Option<Arc<dyn Context>>,
        parent_type: Option<&TypeHandle>,
        node: &C,
        section_name: Option<&str>,
    ) -> Result<Arc<dyn Context>, BuildError> {
        let section = SectionReader::locate(node, section_name)?;
        let spec = self.reader.read(&section)?;

        tracing::debug!("creating context '{}'", spec.name);

        let default_type = parent_type.unwrap_or(&self.default_type);
        let handle = resolve_context_type(
            spec.type_name.as_deref(),
            default_type,
            self.type_loader.as_ref(),
        )?;
        let plan = ConstructionPlan::select(
            handle.clone(),
            parent.is_some(),
            self.host_settings.is_some(),
        )?;

        let context = plan.instantiate(
            &spec.name,
            spec.case_sensitive,
            parent.clone(),
            &spec.resources,
            self.host_settings.as_ref(),
        )?;

        if self.auto_register {
            match self.registry.register(context.clone()) {
                Ok(()) => {}
                Err(BuildError::DuplicateName { .. }) => {
                    // an earlier or concurrent build already published this
                    // name; reuse the existing entry, never overwrite
                    tracing::debug!("context '{}' already registered, reusing", spec.name);
                }
                Err(err) => return Err(err),
            }
        }

        if let Some(parent) = &parent {
            parent.attach_child(context.clone())?;
        }

        for child in &spec.children {
            self.build_branch(Some(context.clone()), Some(&handle), child, None)?;
        }

        tracing::debug!("context '{}' created", spec.name);
        Ok(context)
    }
}

impl Default for ContextLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextLoader")
            .field("default_type", &self.default_type.name())
            .field("auto_register", &self.auto_register)
            .field("hosted", &self.host_settings.is_some())
            .finish()
    }
}

/// Builder for [`ContextLoader`].
pub struct ContextLoaderBuilder {
    type_loader: Option<Arc<dyn TypeLoader>>,
    registry: Option<Arc<ContextRegistry>>,
    default_type: Option<TypeHandle>,
    default_case_sensitive: bool,
    auto_register: bool,
    host_settings: Option<HostSettings>,
}

impl ContextLoaderBuilder {
    /// Create a new loader builder.
    pub fn new() -> Self {
        Self {
            type_loader: None,
            registry: None,
            default_type: None,
            default_case_sensitive: true,
            auto_register: true,
            host_settings: None,
        }
    }

    /// Use a specific type loader.
    pub fn type_loader(mut self, type_loader: Arc<dyn TypeLoader>) -> Self {
        self.type_loader = Some(type_loader);
        self
    }

    /// Publish built contexts to a specific registry instead of the
    /// process-wide one.
    pub fn registry(mut self, registry: Arc<ContextRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Type to build when a declaration carries no `type` attribute.
    pub fn default_type(mut self, handle: TypeHandle) -> Self {
        self.default_type = Some(handle);
        self
    }

    /// Case-sensitivity applied when a declaration carries no
    /// `caseSensitive` attribute.
    pub fn default_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.default_case_sensitive = case_sensitive;
        self
    }

    /// Whether built contexts are automatically registered.
    pub fn auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = auto_register;
        self
    }

    /// Drive the build from an external host configuration object. Every
    /// node is then built with the externally-configured constructor shape
    /// and the settings are registered inside the tree's root context.
    pub fn host_settings(mut self, host_settings: HostSettings) -> Self {
        self.host_settings = Some(host_settings);
        self
    }

    /// Build the loader.
    pub fn build(self) -> ContextLoader {
        ContextLoader {
            type_loader: self
                .type_loader
                .unwrap_or_else(|| Arc::new(TypeRegistry::with_defaults())),
            registry: self.registry.unwrap_or_else(ContextRegistry::global),
            reader: SectionReader::new(self.default_case_sensitive),
            default_type: self.default_type.unwrap_or_else(GenericContext::type_handle),
            auto_register: self.auto_register,
            host_settings: self.host_settings,
        }
    }
}

impl Default for ContextLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
