//! Intermediate representation between parsing and code generation.

use syn::{Ident, Type};

use crate::parser::attributes::RenameRule;

/// A parsed model type.
#[derive(Debug, Clone)]
pub struct SchemaIR {
    pub ident: Ident,
    /// Output name override.
    pub rename: Option<String>,
    /// Package override.
    pub package: Option<String>,
    pub hidden: bool,
    pub model_root: bool,
    pub reference: Option<String>,
    pub rename_all: Option<RenameRule>,
    pub kind: SchemaKind,
}

#[derive(Debug, Clone)]
pub enum SchemaKind {
    Message(Vec<FieldIR>),
    Enum(Vec<VariantIR>),
}

/// A struct field.
#[derive(Debug, Clone)]
pub struct FieldIR {
    /// Declared field name.
    pub name: String,
    pub ty: Type,
    pub rename: Option<String>,
    pub identity: bool,
    pub tags: Option<String>,
    /// Excluded from generation; its type needs no reflection metadata.
    pub transient: bool,
    /// How the field type reaches the engine.
    pub reflection: FieldReflection,
}

/// Source of a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldReflection {
    /// Through the type's `Reflect` implementation.
    Reflect,
    /// A trait object, optionally wrapped in `Option`.
    Interface { name: String, optional: bool },
    /// Not reflected at all.
    Opaque(String),
}

/// An enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantIR {
    pub name: String,
    /// Explicit ordinal.
    pub number: Option<i32>,
}

impl SchemaIR {
    /// Check if this describes an enumeration.
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, SchemaKind::Enum(_))
    }
}
