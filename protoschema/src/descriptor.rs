//! Type descriptors: the source-agnostic shape of a model type.
//!
//! A [`TypeDescriptor`] is what a [`SchemaSource`](crate::SchemaSource) hands
//! to the schema builder. It lists the properties (or enum values) of one
//! type together with the declarative markers that steer generation. The
//! derive macro produces descriptors at compile time; the descriptor-based
//! source reads them from JSON or builds them from parsed Rust sources.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::naming::RenameRule;

/// Stable identity of a described type, usually its full module path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    /// Create a key from a path such as `app::model::Order`.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The full key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }

    /// Dotted package derived from the module part of the path.
    pub fn package(&self) -> String {
        match self.0.rsplit_once("::") {
            Some((module, _)) => module.replace("::", "."),
            None => String::new(),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TypeKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Declared Types
// =============================================================================

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Char,
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Uuid,
}

/// Well-known temporal types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalKind {
    /// A point on the time line (`DateTime<Tz>`, `SystemTime`).
    Instant,
    /// A date and time without zone.
    DateTime,
    /// A calendar date.
    Date,
    /// A time of day.
    Time,
}

/// Container families with a single element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    List,
    Set,
    Deque,
}

/// The declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclaredType {
    /// A built-in scalar.
    Scalar { scalar: ScalarKind },

    /// A well-known temporal type.
    Temporal { temporal: TemporalKind },

    /// A container. `element` is `None` when the element type was erased.
    Container {
        container: ContainerKind,
        #[serde(default)]
        element: Option<Box<DeclaredType>>,
    },

    /// An optional value.
    Optional { inner: Box<DeclaredType> },

    /// A trait object or other interface type.
    Interface { name: String },

    /// Another described type.
    Named { key: TypeKey },

    /// A type carrying no reflection metadata.
    Opaque { name: String },
}

impl DeclaredType {
    pub fn scalar(scalar: ScalarKind) -> Self {
        Self::Scalar { scalar }
    }

    pub fn temporal(temporal: TemporalKind) -> Self {
        Self::Temporal { temporal }
    }

    /// A container whose element type is known.
    pub fn container(container: ContainerKind, element: DeclaredType) -> Self {
        Self::Container {
            container,
            element: Some(Box::new(element)),
        }
    }

    /// A container whose element type was erased.
    pub fn erased(container: ContainerKind) -> Self {
        Self::Container {
            container,
            element: None,
        }
    }

    pub fn optional(inner: DeclaredType) -> Self {
        Self::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::Interface { name: name.into() }
    }

    pub fn named(key: impl Into<TypeKey>) -> Self {
        Self::Named { key: key.into() }
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Self::Opaque { name: name.into() }
    }

    /// Check if this is a container type.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container { .. })
    }

    /// Human readable rendering used in diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            Self::Scalar { scalar } => format!("{scalar:?}").to_lowercase(),
            Self::Temporal { temporal } => format!("{temporal:?}"),
            Self::Container { container, element } => match element {
                Some(element) => format!("{container:?}<{}>", element.display_name()),
                None => format!("{container:?}"),
            },
            Self::Optional { inner } => format!("Option<{}>", inner.display_name()),
            Self::Interface { name } => format!("dyn {name}"),
            Self::Named { key } => key.to_string(),
            Self::Opaque { name } => name.clone(),
        }
    }
}

// =============================================================================
// Markers
// =============================================================================

/// Declarative markers attached to a type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeMarkers {
    /// Output name replacing the declared name.
    pub rename: Option<String>,

    /// Suppress the type from the generated document.
    pub hidden: bool,

    /// The type is a generated model root.
    pub model_root: bool,

    /// Generated-root reference value (the process id).
    pub reference: Option<String>,

    /// Case rule for property and enum value names.
    pub rename_all: Option<RenameRule>,
}

/// Declarative markers attached to a property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMarkers {
    /// Output name replacing the declared name.
    pub rename: Option<String>,

    /// The property is the identity field of its type.
    pub identity: bool,

    /// Semantic tags attached to the field comment.
    pub tags: Option<String>,
}

/// Member modifiers that exclude a property from generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    #[serde(rename = "static")]
    pub is_static: bool,

    #[serde(rename = "transient")]
    pub is_transient: bool,

    pub synthetic: bool,
}

impl Modifiers {
    /// Check if any excluding modifier is set.
    pub fn excludes(&self) -> bool {
        self.is_static || self.is_transient || self.synthetic
    }
}

// =============================================================================
// Descriptors
// =============================================================================

/// One property of a message-shaped type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: DeclaredType,

    #[serde(default)]
    pub modifiers: Modifiers,

    #[serde(default)]
    pub markers: FieldMarkers,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, ty: DeclaredType) -> Self {
        Self {
            name: name.into(),
            ty,
            modifiers: Modifiers::default(),
            markers: FieldMarkers::default(),
        }
    }

    pub fn with_markers(mut self, markers: FieldMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Mark the property transient.
    pub fn transient(mut self) -> Self {
        self.modifiers.is_transient = true;
        self
    }
}

/// One value of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    pub name: String,

    /// Explicit ordinal override.
    #[serde(default)]
    pub number: Option<i32>,

    #[serde(default)]
    pub synthetic: bool,
}

impl EnumValueDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: None,
            synthetic: false,
        }
    }

    pub fn with_number(mut self, number: i32) -> Self {
        self.number = Some(number);
        self
    }
}

/// Shape of a described type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TypeShape {
    Message {
        #[serde(default)]
        properties: Vec<PropertyDescriptor>,
    },
    Enum {
        #[serde(default)]
        values: Vec<EnumValueDescriptor>,
    },
}

/// Complete description of one model type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub key: TypeKey,

    /// Declared (unrenamed) name.
    pub name: String,

    /// Dotted package the type lives in.
    #[serde(default)]
    pub package: String,

    #[serde(default)]
    pub markers: TypeMarkers,

    #[serde(flatten)]
    pub shape: TypeShape,
}

impl TypeDescriptor {
    /// Describe a message-shaped type. Name and package come from the key.
    pub fn message(key: impl Into<TypeKey>) -> Self {
        Self::with_shape(
            key.into(),
            TypeShape::Message {
                properties: Vec::new(),
            },
        )
    }

    /// Describe an enumeration. Name and package come from the key.
    pub fn enumeration(key: impl Into<TypeKey>) -> Self {
        Self::with_shape(key.into(), TypeShape::Enum { values: Vec::new() })
    }

    fn with_shape(key: TypeKey, shape: TypeShape) -> Self {
        Self {
            name: key.simple_name().to_string(),
            package: key.package(),
            key,
            markers: TypeMarkers::default(),
            shape,
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_markers(mut self, markers: TypeMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Append a property. Ignored on enumerations.
    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        if let TypeShape::Message { properties } = &mut self.shape {
            properties.push(property);
        }
        self
    }

    /// Append an enum value. Ignored on messages.
    pub fn with_value(mut self, value: EnumValueDescriptor) -> Self {
        if let TypeShape::Enum { values } = &mut self.shape {
            values.push(value);
        }
        self
    }

    /// Check if this describes an enumeration.
    pub fn is_enum(&self) -> bool {
        matches!(self.shape, TypeShape::Enum { .. })
    }

    /// Output name: the rename marker if present, else the declared name.
    pub fn output_name(&self) -> &str {
        self.markers.rename.as_deref().unwrap_or(&self.name)
    }
}
