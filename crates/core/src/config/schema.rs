//! Constants defining the layout of context declarations inside a
//! structured configuration tree.

/// Element holding the child context declarations of a context.
pub const CONTEXT_ELEMENT: &str = "context";

/// Attribute naming a context.
pub const NAME_ATTRIBUTE: &str = "name";

/// Attribute selecting the context implementation type. When absent, a
/// descendant inherits its parent's type and the outermost root falls back
/// to the loader's default type.
pub const TYPE_ATTRIBUTE: &str = "type";

/// Attribute controlling object-name case folding inside a context.
/// Defaults to `true`.
pub const CASE_SENSITIVE_ATTRIBUTE: &str = "caseSensitive";

/// Element listing resource declarations for a context.
pub const RESOURCE_ELEMENT: &str = "resource";

/// Attribute holding the URI of a single resource declaration.
pub const URI_ATTRIBUTE: &str = "uri";

/// Name given to a root context declared without a `name` attribute.
pub const DEFAULT_ROOT_CONTEXT_NAME: &str = "root";

/// Default object name under which host settings are registered in an
/// externally configured root context.
pub const DEFAULT_HOST_SETTINGS_NAME: &str = "HostSettings";
