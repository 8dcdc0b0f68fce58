use thiserror::Error;

/// Core error type for context bootstrapping.
///
/// Every failure during a build maps onto one of these kinds; none of them
/// is silently swallowed. `Configuration` and `TypeMismatch` are fatal for
/// the branch being built, `NotFound` is recoverable by the caller, and
/// `DuplicateName` is fatal only when registration is explicitly required.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Type mismatch: '{type_name}' is not a context implementation")]
    TypeMismatch { type_name: String },

    #[error("Context '{name}' is already registered")]
    DuplicateName { name: String },

    #[error("Nothing registered under name '{name}'")]
    NotFound { name: String },

    #[error("Lock error on resource: {resource}")]
    Lock { resource: String },
}

impl BuildError {
    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new type mismatch error
    pub fn type_mismatch(type_name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            type_name: type_name.into(),
        }
    }

    /// Create a new duplicate name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create a new not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a new lock error
    pub fn lock(resource: impl Into<String>) -> Self {
        Self::Lock {
            resource: resource.into(),
        }
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if the error is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Check if the error is a duplicate name error
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, Self::DuplicateName { .. })
    }

    /// Check if the error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
