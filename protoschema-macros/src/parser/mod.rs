//! Parsers turning derive input into [`SchemaIR`](crate::ir::SchemaIR).
//!
//! - [`attributes`]: `#[proto(...)]` attributes via darling
//! - [`struct_parser`]: structs with named fields
//! - [`enum_parser`]: unit-only enums
//! - [`type_parser`]: field type classification
//! - [`serde_compat`]: `#[serde(...)]` fallbacks

pub mod attributes;
pub mod enum_parser;
pub mod struct_parser;
pub mod type_parser;

#[cfg(feature = "serde-compat")]
pub mod serde_compat;

use darling::FromDeriveInput;
use syn::spanned::Spanned;
use syn::DeriveInput;

use crate::error::DeriveError;
use crate::ir::{SchemaIR, SchemaKind};
use attributes::ContainerAttrs;

/// Parse container attributes, then the members through `build_kind`.
pub(crate) fn parse_container<F>(input: &DeriveInput, build_kind: F) -> Result<SchemaIR, DeriveError>
where
    F: FnOnce() -> Result<SchemaKind, DeriveError>,
{
    let attrs = ContainerAttrs::from_derive_input(input)?;

    if !attrs.generics.params.is_empty() {
        return Err(DeriveError::unsupported(
            attrs.generics.span(),
            "ProtoSchema cannot be derived for generic types",
        )
        .with_suggestion("derive on a concrete type that wraps the generic one"));
    }

    #[cfg(feature = "serde-compat")]
    let (rename, rename_all) = {
        let serde = serde_compat::SerdeContainerAttrs::from_attrs(&input.attrs);
        (
            attrs.name.clone().or(serde.rename),
            attrs.rename_all.or(serde.rename_all),
        )
    };

    #[cfg(not(feature = "serde-compat"))]
    let (rename, rename_all) = (attrs.name.clone(), attrs.rename_all);

    let kind = build_kind()?;

    Ok(SchemaIR {
        model_root: attrs.is_model_root(),
        ident: attrs.ident,
        rename,
        package: attrs.package,
        hidden: attrs.hidden,
        reference: attrs.reference,
        rename_all,
        kind,
    })
}
