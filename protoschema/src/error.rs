//! Error types for schema generation.
//!
//! Every failure raised while describing, resolving or assembling a schema
//! document is a [`ProtoError`]. Failures inside a generation pass are
//! surfaced wrapped in [`ProtoError::Generation`] so the caller always learns
//! which root type the pass was working on.

use thiserror::Error;

/// Result type alias for schema generation.
pub type ProtoResult<T> = Result<T, ProtoError>;

/// Main error type for schema generation.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// The type cannot be inspected for properties.
    #[error("Cannot introspect type '{type_name}': {reason}")]
    Introspection { type_name: String, reason: String },

    /// A field type maps to no schema entity and is not introspectable.
    #[error("Cannot resolve field '{field}' of type '{type_name}': {reason}")]
    TypeResolution {
        type_name: String,
        field: String,
        reason: String,
    },

    /// A container field carries no element type information.
    #[error("Field '{field}' of type '{type_name}' uses collection without type information")]
    MissingGenericInfo { type_name: String, field: String },

    /// The resolved document does not have the expected shape.
    #[error("Invalid model structure: {0}")]
    ModelStructure(String),

    /// A descriptor set could not be decoded.
    #[error("Invalid type descriptor: {0}")]
    InvalidDescriptor(#[from] serde_json::Error),

    /// A failure raised while generating the schema for one type.
    #[error("Error while generating proto for '{type_name}': {source}")]
    Generation {
        type_name: String,
        #[source]
        source: Box<ProtoError>,
    },
}

impl ProtoError {
    /// Create an introspection error.
    pub fn introspection(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Introspection {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a type resolution error for one field.
    pub fn type_resolution(
        type_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeResolution {
            type_name: type_name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing generic information error.
    pub fn missing_generic_info(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingGenericInfo {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Create a model structure error.
    pub fn model_structure(message: impl Into<String>) -> Self {
        Self::ModelStructure(message.into())
    }

    /// Wrap this error with the name of the type being generated.
    pub fn in_type(self, type_name: impl Into<String>) -> Self {
        Self::Generation {
            type_name: type_name.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping [`ProtoError::Generation`] wrappers.
    pub fn root_cause(&self) -> &ProtoError {
        match self {
            Self::Generation { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether the root cause is a field type that could not be resolved.
    ///
    /// Missing element type information counts as a resolution failure.
    pub fn is_type_resolution(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::TypeResolution { .. } | Self::MissingGenericInfo { .. }
        )
    }
}
