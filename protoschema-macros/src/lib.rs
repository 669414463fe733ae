//! # protoschema-macros
//!
//! Procedural macro deriving compile-time reflection metadata for
//! `protoschema`.
//!
//! `#[derive(ProtoSchema)]` implements `protoschema::Reflect` and
//! `protoschema::Introspect` so the type can be registered with a
//! `ReflectiveSource`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use protoschema::ProtoSchema;
//!
//! #[derive(ProtoSchema)]
//! #[proto(reference = "travels", rename_all = "camelCase")]
//! struct Travels {
//!     id: String,
//!     #[proto(tags = "input")]
//!     traveller: Traveller,
//!     #[proto(transient)]
//!     scratch: Vec<u8>,
//! }
//! ```
//!
//! ## Attributes
//!
//! ### Container Attributes
//!
//! - `#[proto(name = "Other")]` - Output name of the message or enum
//! - `#[proto(package = "org.acme")]` - Package instead of the module path
//! - `#[proto(hidden)]` - Leave the type out of generated documents
//! - `#[proto(model)]` - Mark a generated model root
//! - `#[proto(reference = "id")]` - Process id of a model root (implies `model`)
//! - `#[proto(rename_all = "camelCase")]` - Case rule for field or variant names
//!
//! ### Field Attributes
//!
//! - `#[proto(rename = "other")]` - Output name of the field
//! - `#[proto(id)]` - Identity field
//! - `#[proto(tags = "a,b")]` - Semantic tags for the field comment
//! - `#[proto(transient)]` - Exclude the field
//!
//! ### Variant Attributes
//!
//! - `#[proto(number = N)]` - Explicit ordinal (integer discriminants work too)
//! - `#[proto(skip)]` - Exclude the variant
//!
//! With the `serde-compat` feature, `#[serde(rename, rename_all, skip)]` apply
//! where no `#[proto(...)]` attribute says otherwise.

use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

mod codegen;
mod error;
mod ir;
mod parser;

use codegen::ImplBlockGenerator;
use error::DeriveError;
use parser::enum_parser::EnumParser;
use parser::struct_parser::StructParser;

/// Derive reflection metadata for a model type.
#[proc_macro_derive(ProtoSchema, attributes(proto, serde))]
pub fn derive_proto_schema(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match derive_proto_schema_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn derive_proto_schema_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, DeriveError> {
    let schema = match &input.data {
        Data::Struct(_) => StructParser::parse(input)?,
        Data::Enum(_) => EnumParser::parse(input)?,
        Data::Union(_) => {
            return Err(DeriveError::unsupported(
                input.ident.span(),
                "ProtoSchema cannot be derived for unions",
            ));
        }
    };

    Ok(ImplBlockGenerator::new().generate(&schema))
}
