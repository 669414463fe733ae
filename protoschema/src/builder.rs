//! Recursive schema resolution.
//!
//! [`SchemaBuilder`] walks a type graph through a [`SchemaSource`] and fills
//! a [`SchemaDocument`]. Every type is resolved at most once per builder:
//! the memo records a message before its fields are visited, so a field
//! that refers back to a type still under construction binds to the
//! reserved message instead of recursing again.
//!
//! One builder serves one generation pass. Use a fresh builder (and a fresh
//! document) for every independent pass.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::annotate::field_comment;
use crate::collection::unwrap_element;
use crate::descriptor::{DeclaredType, TypeKey};
use crate::enums::assign_ordinals;
use crate::error::{ProtoError, ProtoResult};
use crate::extract::{ClassDescriptor, ClassMembers, EnumValueInfo, PropertyInfo};
use crate::proto::{EnumId, Field, FieldType, MessageId, ProtoEnum, SchemaDocument};
use crate::source::SchemaSource;
use crate::type_map::TypeMapper;

/// Schema entity a type resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    Message(MessageId),
    Enum(EnumId),
}

impl Resolved {
    /// Field type referring to this entity.
    pub fn field_type(self) -> FieldType {
        match self {
            Resolved::Message(id) => FieldType::Message(id),
            Resolved::Enum(id) => FieldType::Enum(id),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MemoEntry {
    Resolved(Resolved),
    Hidden,
}

/// Comment templates applied while resolving.
#[derive(Debug, Clone, Copy, Default)]
pub struct Comments<'c> {
    pub message: Option<&'c str>,
    pub field: Option<&'c str>,
}

/// Resolves types into messages and enums of one document.
pub struct SchemaBuilder<'a, S: ?Sized> {
    source: &'a S,
    mapper: &'a TypeMapper,
    memo: HashMap<TypeKey, MemoEntry>,
}

impl<'a, S: SchemaSource + ?Sized> SchemaBuilder<'a, S> {
    /// Create a builder with an empty memo.
    pub fn new(source: &'a S, mapper: &'a TypeMapper) -> Self {
        Self {
            source,
            mapper,
            memo: HashMap::new(),
        }
    }

    /// Resolve `key` into `doc`.
    ///
    /// `package` overrides the package of every message and enum created by
    /// this call, nested ones included; `None` keeps each type's own package.
    /// Returns `None` when the type is hidden.
    pub fn resolve(
        &mut self,
        doc: &mut SchemaDocument,
        key: &TypeKey,
        package: Option<&str>,
        comments: Comments<'_>,
    ) -> ProtoResult<Option<Resolved>> {
        if let Some(entry) = self.memo.get(key) {
            trace!(type_key = %key, "memo hit");
            return Ok(match entry {
                MemoEntry::Resolved(resolved) => Some(*resolved),
                MemoEntry::Hidden => None,
            });
        }

        let class = ClassDescriptor::extract(self.source, key)?;
        if class.markers.hidden {
            debug!(type_key = %key, "type is hidden, skipping");
            self.memo.insert(key.clone(), MemoEntry::Hidden);
            return Ok(None);
        }

        let override_package = package;
        let package = override_package.unwrap_or(&class.package).to_string();
        match &class.members {
            ClassMembers::Enum(values) => self
                .resolve_enum_values(doc, &class, values, &package)
                .map(|id| Some(Resolved::Enum(id))),
            ClassMembers::Message(properties) => {
                let id = doc.reserve_message(&class.name, &package);
                self.memo
                    .insert(key.clone(), MemoEntry::Resolved(Resolved::Message(id)));
                debug!(type_key = %key, message = %class.name, package = %package, "resolving message");

                for property in properties {
                    self.resolve_property(doc, &class, property, id, override_package, comments)?;
                }

                doc.message_mut(id).comment = comments.message.map(str::to_string);
                doc.commit_message(id).map_err(ProtoError::model_structure)?;
                Ok(Some(Resolved::Message(id)))
            }
        }
    }

    /// Resolve an enumeration type into `doc`.
    ///
    /// Returns `None` when the type is hidden. Fails with
    /// [`ProtoError::TypeResolution`] when `key` is not an enumeration.
    pub fn resolve_enum(
        &mut self,
        doc: &mut SchemaDocument,
        key: &TypeKey,
        package: Option<&str>,
    ) -> ProtoResult<Option<EnumId>> {
        match self.resolve(doc, key, package, Comments::default())? {
            Some(Resolved::Enum(id)) => Ok(Some(id)),
            Some(Resolved::Message(_)) => Err(ProtoError::type_resolution(
                key.as_str(),
                "",
                "type is not an enumeration",
            )),
            None => Ok(None),
        }
    }

    fn resolve_enum_values(
        &mut self,
        doc: &mut SchemaDocument,
        class: &ClassDescriptor,
        values: &[EnumValueInfo],
        package: &str,
    ) -> ProtoResult<EnumId> {
        let mut proto_enum = ProtoEnum::new(&class.name, package);
        proto_enum.values = assign_ordinals(values);

        let id = doc.add_enum(proto_enum).map_err(ProtoError::model_structure)?;
        self.memo
            .insert(class.key.clone(), MemoEntry::Resolved(Resolved::Enum(id)));
        debug!(type_key = %class.key, values = values.len(), "resolved enum");
        Ok(id)
    }

    fn resolve_property(
        &mut self,
        doc: &mut SchemaDocument,
        owner: &ClassDescriptor,
        property: &PropertyInfo,
        message: MessageId,
        package: Option<&str>,
        comments: Comments<'_>,
    ) -> ProtoResult<()> {
        let owner_name = owner.key.as_str();
        let unwrapped = unwrap_element(owner_name, &property.declared_name, &property.ty)?;

        let ty = match self.mapper.map(unwrapped.element) {
            Some(name) => FieldType::Named(name),
            None => match unwrapped.element {
                DeclaredType::Named { key } => {
                    match self.resolve(doc, key, package, comments)? {
                        Some(resolved) => resolved.field_type(),
                        None => {
                            debug!(
                                type_key = %owner.key,
                                field = %property.name,
                                target = %key,
                                "field refers to a hidden type, omitted"
                            );
                            return Ok(());
                        }
                    }
                }
                other => {
                    return Err(ProtoError::type_resolution(
                        owner_name,
                        &property.declared_name,
                        format!("type '{}' cannot be mapped to a proto type", other.display_name()),
                    ));
                }
            },
        };

        let comment = field_comment(property, &owner.markers, comments.field);
        doc.message_mut(message)
            .add_field(Field::new(&property.name, ty, unwrapped.cardinality).with_comment(comment))
            .map_err(ProtoError::model_structure)
    }
}
