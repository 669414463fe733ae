//! Serde attribute compatibility.
//!
//! Reads the subset of `#[serde(...)]` that changes the shape of persisted
//! data: renames and skips. `#[proto(...)]` attributes take precedence when
//! both are present.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr};

use super::attributes::RenameRule;

/// Serde container attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeContainerAttrs {
    pub rename: Option<String>,
    pub rename_all: Option<RenameRule>,
}

impl SerdeContainerAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut result = Self::default();
        for attr in serde_attrs(attrs) {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    result.rename = string_value(&meta)?;
                } else if meta.path.is_ident("rename_all") {
                    result.rename_all = string_value(&meta)?.and_then(|v| RenameRule::parse(&v));
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
        }
        result
    }
}

/// Serde field attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeFieldAttrs {
    pub rename: Option<String>,
    /// `skip`, `skip_serializing` or `skip_deserializing`.
    pub skip: bool,
}

impl SerdeFieldAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut result = Self::default();
        for attr in serde_attrs(attrs) {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    result.rename = string_value(&meta)?;
                } else if meta.path.is_ident("skip")
                    || meta.path.is_ident("skip_serializing")
                    || meta.path.is_ident("skip_deserializing")
                {
                    result.skip = true;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
        }
        result
    }
}

/// Serde variant attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerdeVariantAttrs {
    pub skip: bool,
}

impl SerdeVariantAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut result = Self::default();
        for attr in serde_attrs(attrs) {
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip")
                    || meta.path.is_ident("skip_serializing")
                    || meta.path.is_ident("skip_deserializing")
                {
                    result.skip = true;
                } else {
                    skip_value(&meta)?;
                }
                Ok(())
            });
        }
        result
    }
}

fn serde_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("serde"))
}

/// Read `key = "value"`. Only the plain form of `rename` is honored.
fn string_value(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        let lit: LitStr = meta.value()?.parse()?;
        Ok(Some(lit.value()))
    } else {
        skip_value(meta)?;
        Ok(None)
    }
}

/// Consume the value or nested list of an attribute we do not read.
fn skip_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_value(&nested))?;
    }
    Ok(())
}
