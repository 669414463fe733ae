//! Class descriptor extraction.
//!
//! Turns the raw [`TypeDescriptor`] returned by a source into the filtered,
//! renamed view the builder works on. Static, transient and synthetic
//! members are dropped here, as is the type-identity pseudo-property.

use crate::descriptor::{DeclaredType, TypeDescriptor, TypeKey, TypeMarkers, TypeShape};
use crate::error::ProtoResult;
use crate::source::SchemaSource;

/// Name of the implicit type-identity property.
pub const TYPE_IDENTITY_PROPERTY: &str = "class";

/// Declared name of the identity field when no marker is present.
pub const IDENTITY_FIELD: &str = "id";

/// A property eligible for generation.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    /// Output name.
    pub name: String,
    /// Name as declared on the type.
    pub declared_name: String,
    pub ty: DeclaredType,
    /// Whether this is the identity field of its type.
    pub identity: bool,
    pub tags: Option<String>,
}

/// An enum value eligible for generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueInfo {
    /// Output name.
    pub name: String,
    /// Explicit ordinal override.
    pub number: Option<i32>,
}

/// Filtered members of a class.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMembers {
    Message(Vec<PropertyInfo>),
    Enum(Vec<EnumValueInfo>),
}

/// Transient view of a type prepared for generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub key: TypeKey,
    /// Output name, after the rename marker.
    pub name: String,
    pub package: String,
    pub markers: TypeMarkers,
    pub members: ClassMembers,
}

impl ClassDescriptor {
    /// Describe `key` through `source` and filter its members.
    pub fn extract<S: SchemaSource + ?Sized>(source: &S, key: &TypeKey) -> ProtoResult<Self> {
        let descriptor = source.describe(key)?;
        Ok(Self::from_descriptor(descriptor))
    }

    /// Filter the members of an already fetched descriptor.
    pub fn from_descriptor(descriptor: TypeDescriptor) -> Self {
        let name = descriptor.output_name().to_string();
        let rename_all = descriptor.markers.rename_all;

        let members = match descriptor.shape {
            TypeShape::Message { properties } => ClassMembers::Message(
                properties
                    .into_iter()
                    .filter(|p| p.name != TYPE_IDENTITY_PROPERTY && !p.modifiers.excludes())
                    .map(|p| {
                        let output = match (&p.markers.rename, rename_all) {
                            (Some(rename), _) => rename.clone(),
                            (None, Some(rule)) => rule.apply(&p.name),
                            (None, None) => p.name.clone(),
                        };
                        PropertyInfo {
                            identity: p.markers.identity || p.name == IDENTITY_FIELD,
                            name: output,
                            declared_name: p.name,
                            ty: p.ty,
                            tags: p.markers.tags,
                        }
                    })
                    .collect(),
            ),
            TypeShape::Enum { values } => ClassMembers::Enum(
                values
                    .into_iter()
                    .filter(|v| !v.synthetic && !v.name.starts_with('$'))
                    .map(|v| EnumValueInfo {
                        name: rename_all.map_or_else(|| v.name.clone(), |rule| rule.apply(&v.name)),
                        number: v.number,
                    })
                    .collect(),
            ),
        };

        Self {
            key: descriptor.key,
            name,
            package: descriptor.package,
            markers: descriptor.markers,
            members,
        }
    }

    /// Check if this class is an enumeration.
    pub fn is_enum(&self) -> bool {
        matches!(self.members, ClassMembers::Enum(_))
    }

    /// Properties of a message-shaped class, empty for enums.
    pub fn properties(&self) -> &[PropertyInfo] {
        match &self.members {
            ClassMembers::Message(properties) => properties,
            ClassMembers::Enum(_) => &[],
        }
    }
}
