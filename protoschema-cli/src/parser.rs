//! Rust source parser for extracting types with `#[derive(ProtoSchema)]`.
//!
//! Files are parsed with `syn`. Derived structs and enums are collected with
//! the module path they live under, including inline `mod` blocks, so each
//! one gets the same type key the derive macro would give it.

use std::path::{Path, PathBuf};

use syn::{Attribute, DeriveInput, Item};

use protoschema::TypeKey;

use crate::config::FALLBACK_CRATE_NAME;
use crate::error::{CliError, CliResult, ParseError};
use crate::scanner::SourceFile;

/// Name of the derive the parser looks for.
const DERIVE_NAME: &str = "ProtoSchema";

/// A derived type found in a source file.
#[derive(Debug, Clone)]
pub struct ParsedType {
    /// Type key, `<crate>::<module path>::<Name>`.
    pub key: TypeKey,

    /// Module path below the crate root.
    pub module_path: Vec<String>,

    /// The item as a derive input.
    pub derive_input: DeriveInput,

    /// File the item was found in.
    pub file: PathBuf,
}

impl ParsedType {
    /// Declared name of the type.
    pub fn name(&self) -> String {
        self.derive_input.ident.to_string()
    }
}

/// Parser for Rust source files.
#[derive(Debug)]
pub struct RustParser {
    crate_name: String,
}

impl Default for RustParser {
    fn default() -> Self {
        Self::new(FALLBACK_CRATE_NAME)
    }
}

impl RustParser {
    /// Create a parser rooting type keys at `crate_name`.
    pub fn new(crate_name: impl Into<String>) -> Self {
        Self {
            crate_name: crate_name.into(),
        }
    }

    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    /// Parse a scanned file. The module path follows the file's location.
    pub fn parse_file(&self, source: &SourceFile) -> CliResult<Vec<ParsedType>> {
        self.parse_source(&source.content, &source.path, &source.module_path())
    }

    /// Parse source code living at `module_path` below the crate root.
    pub fn parse_source(
        &self,
        content: &str,
        file_path: &Path,
        module_path: &[String],
    ) -> CliResult<Vec<ParsedType>> {
        let syntax = syn::parse_file(content)
            .map_err(|e| ParseError::syntax(file_path.to_path_buf(), e.to_string()))?;

        let mut types = Vec::new();
        self.collect_items(&syntax.items, file_path, module_path.to_vec(), &mut types);

        tracing::debug!(file = %file_path.display(), types = types.len(), "parsed source file");
        Ok(types)
    }

    /// Parse multiple source files, collecting errors.
    pub fn parse_files(&self, sources: &[SourceFile]) -> (Vec<ParsedType>, Vec<ParseError>) {
        let mut types = Vec::new();
        let mut errors = Vec::new();

        for source in sources {
            match self.parse_file(source) {
                Ok(parsed) => types.extend(parsed),
                Err(CliError::Parse(e)) => errors.push(e),
                Err(e) => tracing::warn!(file = %source.path.display(), error = %e, "skipping file"),
            }
        }

        (types, errors)
    }

    fn collect_items(
        &self,
        items: &[Item],
        file_path: &Path,
        module_path: Vec<String>,
        types: &mut Vec<ParsedType>,
    ) {
        for item in items {
            let derive_input = match item {
                Item::Struct(item_struct) if has_proto_derive(&item_struct.attrs) => {
                    DeriveInput::from(item_struct.clone())
                }
                Item::Enum(item_enum) if has_proto_derive(&item_enum.attrs) => {
                    DeriveInput::from(item_enum.clone())
                }
                Item::Union(item_union) if has_proto_derive(&item_union.attrs) => {
                    DeriveInput::from(item_union.clone())
                }
                Item::Mod(item_mod) => {
                    if let Some((_, nested)) = &item_mod.content {
                        let mut nested_path = module_path.clone();
                        nested_path.push(item_mod.ident.to_string());
                        self.collect_items(nested, file_path, nested_path, types);
                    }
                    continue;
                }
                _ => continue,
            };

            let key = self.type_key(&module_path, &derive_input.ident.to_string());
            tracing::trace!(key = %key, "found derived type");
            types.push(ParsedType {
                key,
                module_path: module_path.clone(),
                derive_input,
                file: file_path.to_path_buf(),
            });
        }
    }

    fn type_key(&self, module_path: &[String], name: &str) -> TypeKey {
        let mut segments = Vec::with_capacity(module_path.len() + 2);
        segments.push(self.crate_name.as_str());
        segments.extend(module_path.iter().map(String::as_str));
        segments.push(name);
        TypeKey::new(segments.join("::"))
    }
}

/// Check if attributes contain `#[derive(ProtoSchema)]`, qualified or not.
fn has_proto_derive(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(
                syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
            )
            .ok()
        })
        .flatten()
        .any(|path| {
            path.segments
                .last()
                .is_some_and(|segment| segment.ident == DERIVE_NAME)
        })
}
