//! Schema sources: where type descriptors come from.
//!
//! The builder never inspects types itself; it asks a [`SchemaSource`] for
//! the descriptor behind a [`TypeKey`]. Two implementations ship with the
//! crate:
//!
//! - [`ReflectiveSource`] collects descriptors from types implementing
//!   [`Reflect`](crate::Reflect), normally through `#[derive(ProtoSchema)]`.
//! - [`DescriptorSource`] holds descriptors supplied ahead of time, either
//!   decoded from JSON or assembled by a code generator.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::descriptor::{TypeDescriptor, TypeKey};
use crate::error::{ProtoError, ProtoResult};
use crate::reflect::Reflect;

/// Capability to describe types by key.
pub trait SchemaSource {
    /// Describe the type identified by `key`.
    ///
    /// Fails with [`ProtoError::Introspection`] when the type is unknown.
    fn describe(&self, key: &TypeKey) -> ProtoResult<TypeDescriptor>;
}

impl<S: SchemaSource + ?Sized> SchemaSource for &S {
    fn describe(&self, key: &TypeKey) -> ProtoResult<TypeDescriptor> {
        (**self).describe(key)
    }
}

// =============================================================================
// Reflective Source
// =============================================================================

/// Descriptor factory registered by a reflected type.
pub type DescriptorFn = fn() -> TypeDescriptor;

/// Source backed by compile-time reflection metadata.
///
/// ```rust,ignore
/// let mut source = ReflectiveSource::new();
/// source.register::<Order>();
/// let descriptor = source.describe(&Order::type_key())?;
/// ```
#[derive(Debug, Default, Clone)]
pub struct ReflectiveSource {
    factories: HashMap<TypeKey, DescriptorFn>,
}

impl ReflectiveSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` and every type reachable from its properties.
    pub fn register<T: Reflect + ?Sized>(&mut self) -> &mut Self {
        T::register(self);
        self
    }

    /// Insert a descriptor factory.
    ///
    /// Returns `false` when the key was already present, in which case the
    /// caller must not recurse into the type's properties again.
    pub fn insert(&mut self, key: TypeKey, factory: DescriptorFn) -> bool {
        if self.factories.contains_key(&key) {
            return false;
        }
        self.factories.insert(key, factory);
        true
    }

    /// Check if a type is registered.
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.factories.contains_key(key)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<&TypeKey> {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        keys
    }
}

impl SchemaSource for ReflectiveSource {
    fn describe(&self, key: &TypeKey) -> ProtoResult<TypeDescriptor> {
        self.factories
            .get(key)
            .map(|factory| factory())
            .ok_or_else(|| {
                ProtoError::introspection(key.as_str(), "type carries no reflection metadata")
            })
    }
}

// =============================================================================
// Descriptor Source
// =============================================================================

/// Serialized form of a descriptor set.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DescriptorSet {
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

/// Source backed by descriptors supplied ahead of time.
#[derive(Debug, Default, Clone)]
pub struct DescriptorSource {
    types: BTreeMap<TypeKey, TypeDescriptor>,
}

impl DescriptorSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON descriptor set (`{"types": [...]}`).
    pub fn from_json(json: &str) -> ProtoResult<Self> {
        let set: DescriptorSet = serde_json::from_str(json)?;
        Ok(Self::from_descriptors(set.types))
    }

    /// Build a source from descriptors. Later duplicates replace earlier ones.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut source = Self::new();
        source.extend(descriptors);
        source
    }

    /// Insert a descriptor, returning the one it replaced.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.types.insert(descriptor.key.clone(), descriptor)
    }

    /// Insert many descriptors.
    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = TypeDescriptor>) {
        for descriptor in descriptors {
            self.insert(descriptor);
        }
    }

    /// Look up a descriptor without cloning.
    pub fn get(&self, key: &TypeKey) -> Option<&TypeDescriptor> {
        self.types.get(key)
    }

    /// All descriptors in key order.
    pub fn descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Encode the descriptors as a JSON descriptor set.
    pub fn to_json(&self) -> ProtoResult<String> {
        let set = DescriptorSet {
            types: self.types.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&set)?)
    }
}

impl SchemaSource for DescriptorSource {
    fn describe(&self, key: &TypeKey) -> ProtoResult<TypeDescriptor> {
        self.types
            .get(key)
            .cloned()
            .ok_or_else(|| ProtoError::introspection(key.as_str(), "no descriptor supplied"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DeclaredType, PropertyDescriptor, ScalarKind};

    fn customer() -> TypeDescriptor {
        TypeDescriptor::message("shop::Customer").with_property(PropertyDescriptor::new(
            "name",
            DeclaredType::scalar(ScalarKind::String),
        ))
    }

    #[test]
    fn test_reflective_insert_once() {
        let mut source = ReflectiveSource::new();
        assert!(source.insert(TypeKey::new("shop::Customer"), customer));
        assert!(!source.insert(TypeKey::new("shop::Customer"), customer));
        assert_eq!(source.len(), 1);
        assert!(source.contains(&TypeKey::new("shop::Customer")));
    }

    #[test]
    fn test_reflective_unknown_type_is_introspection_error() {
        let source = ReflectiveSource::new();
        let err = source.describe(&TypeKey::new("shop::Missing")).unwrap_err();
        assert!(matches!(err, ProtoError::Introspection { .. }));
    }

    #[test]
    fn test_descriptor_source_json_round_trip() {
        let source = DescriptorSource::from_descriptors([customer()]);
        let json = source.to_json().unwrap();
        let decoded = DescriptorSource::from_json(&json).unwrap();
        assert_eq!(
            decoded.describe(&TypeKey::new("shop::Customer")).unwrap(),
            customer()
        );
    }

    #[test]
    fn test_descriptor_source_invalid_json() {
        let err = DescriptorSource::from_json("{\"types\": 3}").unwrap_err();
        assert!(matches!(err, ProtoError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_descriptor_source_missing_type() {
        let source = DescriptorSource::new();
        let err = source.describe(&TypeKey::new("shop::Missing")).unwrap_err();
        assert!(err.to_string().contains("shop::Missing"));
    }
}
