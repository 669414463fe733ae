//! Attribute parsing using darling.
//!
//! Defines the `#[proto(...)]` attributes accepted on containers, fields
//! and variants.

use darling::{FromDeriveInput, FromField, FromMeta, FromVariant};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Expr, Generics, Ident, Type};

/// Container-level attributes parsed from `#[proto(...)]`.
#[derive(Debug, Clone, FromDeriveInput)]
#[darling(attributes(proto), supports(struct_named, enum_unit))]
pub struct ContainerAttrs {
    pub ident: Ident,

    pub generics: Generics,

    /// Output name of the message or enum
    #[darling(default)]
    pub name: Option<String>,

    /// Package overriding the module path
    #[darling(default)]
    pub package: Option<String>,

    /// Leave the type out of generated documents
    #[darling(default)]
    pub hidden: bool,

    /// The type is a generated model root
    #[darling(default)]
    pub model: bool,

    /// Process id of a generated model root
    #[darling(default)]
    pub reference: Option<String>,

    /// Case rule for field or variant names
    #[darling(default)]
    pub rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
    /// A reference implies a model root.
    pub fn is_model_root(&self) -> bool {
        self.model || self.reference.is_some()
    }
}

/// Field-level attributes parsed from `#[proto(...)]`.
#[derive(Debug, Clone, FromField)]
#[darling(attributes(proto))]
pub struct FieldAttrs {
    pub ident: Option<Ident>,

    pub ty: Type,

    /// Output name of the field
    #[darling(default)]
    pub rename: Option<String>,

    /// Identity field of the type
    #[darling(default)]
    pub id: bool,

    /// Semantic tags carried in the field comment
    #[darling(default)]
    pub tags: Option<String>,

    /// Exclude the field
    #[darling(default)]
    pub transient: bool,
}

/// Variant-level attributes parsed from `#[proto(...)]`.
#[derive(Debug, Clone, FromVariant)]
#[darling(attributes(proto))]
pub struct VariantAttrs {
    pub ident: Ident,

    pub discriminant: Option<Expr>,

    /// Explicit ordinal
    #[darling(default)]
    pub number: Option<i32>,

    /// Exclude the variant
    #[darling(default)]
    pub skip: bool,
}

/// Rename rule, mirrored into `protoschema::RenameRule` by the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromMeta)]
pub enum RenameRule {
    #[darling(rename = "camelCase")]
    CamelCase,

    #[darling(rename = "snake_case")]
    SnakeCase,

    #[darling(rename = "PascalCase")]
    PascalCase,

    #[darling(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnakeCase,
}

impl RenameRule {
    /// Parse the attribute spelling of a rule.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "camelCase" => Some(RenameRule::CamelCase),
            "snake_case" => Some(RenameRule::SnakeCase),
            "PascalCase" => Some(RenameRule::PascalCase),
            "SCREAMING_SNAKE_CASE" => Some(RenameRule::ScreamingSnakeCase),
            _ => None,
        }
    }

    /// Path of the runtime rule.
    pub fn to_tokens(self) -> TokenStream {
        match self {
            RenameRule::CamelCase => quote!(::protoschema::RenameRule::CamelCase),
            RenameRule::SnakeCase => quote!(::protoschema::RenameRule::SnakeCase),
            RenameRule::PascalCase => quote!(::protoschema::RenameRule::PascalCase),
            RenameRule::ScreamingSnakeCase => quote!(::protoschema::RenameRule::ScreamingSnakeCase),
        }
    }
}
