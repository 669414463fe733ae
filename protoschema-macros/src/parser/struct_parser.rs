//! Struct parsing.
//!
//! Only structs with named fields describe a message; darling rejects tuple
//! and unit structs while reading the container attributes.

use darling::FromField;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields};

use crate::error::DeriveError;
use crate::ir::{FieldIR, FieldReflection, SchemaIR, SchemaKind};
use crate::parser::attributes::FieldAttrs;
use crate::parser::type_parser;

#[cfg(feature = "serde-compat")]
use crate::parser::serde_compat::SerdeFieldAttrs;

/// Parses struct definitions into [`SchemaIR`].
pub struct StructParser;

impl StructParser {
    pub fn parse(input: &DeriveInput) -> Result<SchemaIR, DeriveError> {
        super::parse_container(input, || {
            let Data::Struct(data) = &input.data else {
                return Err(DeriveError::unsupported(
                    input.ident.span(),
                    "expected a struct",
                ));
            };
            let Fields::Named(fields) = &data.fields else {
                return Err(DeriveError::unsupported(
                    input.ident.span(),
                    "ProtoSchema requires named fields",
                ));
            };

            let fields = fields
                .named
                .iter()
                .map(Self::parse_field)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SchemaKind::Message(fields))
        })
    }

    fn parse_field(field: &syn::Field) -> Result<FieldIR, DeriveError> {
        let attrs = FieldAttrs::from_field(field)?;
        let ident = attrs.ident.as_ref().ok_or_else(|| {
            DeriveError::unsupported(field.span(), "field has no identifier")
        })?;
        let name = ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name).to_string();

        #[cfg(feature = "serde-compat")]
        let (rename, transient) = {
            let serde = SerdeFieldAttrs::from_attrs(&field.attrs);
            (attrs.rename.clone().or(serde.rename), attrs.transient || serde.skip)
        };

        #[cfg(not(feature = "serde-compat"))]
        let (rename, transient) = (attrs.rename.clone(), attrs.transient);

        let reflection = if transient {
            FieldReflection::Opaque(type_parser::type_name(&attrs.ty))
        } else {
            type_parser::classify(&attrs.ty)
        };

        Ok(FieldIR {
            name,
            ty: type_parser::reflect_type(&attrs.ty).clone(),
            rename,
            identity: attrs.id,
            tags: attrs.tags,
            transient,
            reflection,
        })
    }
}
