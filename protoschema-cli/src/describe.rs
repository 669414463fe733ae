//! Turning parsed Rust items into type descriptors.
//!
//! Mirrors what `#[derive(ProtoSchema)]` produces at compile time, from the
//! source text alone: `#[proto(...)]` and `#[serde(...)]` attributes become
//! markers, field types become [`DeclaredType`]s. Paths naming other
//! derived types are resolved against a symbol table of every scanned type:
//! qualified paths by their module, bare names preferring the referring
//! type's own module.

use std::collections::HashMap;
use std::path::PathBuf;

use quote::ToTokens;
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, Expr, ExprLit, ExprUnary, Fields, GenericArgument, Lit, LitStr,
    PathArguments, Type, TypeParamBound, UnOp,
};

use protoschema::{
    ContainerKind, DeclaredType, EnumValueDescriptor, FieldMarkers, PropertyDescriptor,
    RenameRule, ScalarKind, TemporalKind, TypeDescriptor, TypeKey, TypeMarkers,
};

use crate::error::ParseError;
use crate::parser::ParsedType;

// =============================================================================
// Symbol Table
// =============================================================================

/// Every scanned type, by key and by simple name.
#[derive(Debug, Default)]
pub struct SymbolTable {
    files: HashMap<TypeKey, PathBuf>,
    by_name: HashMap<String, Vec<TypeKey>>,
}

impl SymbolTable {
    /// Build the table, failing on the first key defined twice.
    pub fn build(types: &[ParsedType]) -> Result<Self, ParseError> {
        let mut table = Self::default();
        for parsed in types {
            if let Some(first) = table.files.get(&parsed.key) {
                return Err(ParseError::DuplicateType {
                    key: parsed.key.to_string(),
                    first: first.clone(),
                    second: parsed.file.clone(),
                });
            }
            table.files.insert(parsed.key.clone(), parsed.file.clone());
            table
                .by_name
                .entry(parsed.key.simple_name().to_string())
                .or_default()
                .push(parsed.key.clone());
        }
        Ok(table)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.files.contains_key(key)
    }

    /// Resolve `name` as seen from `module`: a type of the same module
    /// first, then the only type carrying that simple name.
    pub fn lookup(&self, module: &str, name: &str) -> Option<TypeKey> {
        let local = TypeKey::new(format!("{module}::{name}"));
        if self.contains(&local) {
            return Some(local);
        }
        match self.by_name.get(name).map(Vec::as_slice) {
            Some([only]) => Some(only.clone()),
            _ => None,
        }
    }

    /// Resolve a type path as seen from `module`.
    ///
    /// `crate::`, `self::` and `super::` prefixes are followed as written.
    /// Other qualified paths are tried relative to `module`, then from the
    /// crate root, then as absolute keys. Only a bare name may fall back to
    /// [`lookup`](Self::lookup).
    pub fn resolve(&self, module: &str, segments: &[String]) -> Option<TypeKey> {
        match segments {
            [] => None,
            [name] => self.lookup(module, name),
            _ => qualified_candidates(module, segments)?
                .into_iter()
                .map(TypeKey::new)
                .find(|key| self.contains(key)),
        }
    }
}

fn qualified_candidates(module: &str, segments: &[String]) -> Option<Vec<String>> {
    let crate_root = module.split("::").next().unwrap_or(module);
    let join = |base: &str, rest: &[String]| format!("{base}::{}", rest.join("::"));

    let candidates = match segments[0].as_str() {
        "crate" => vec![join(crate_root, &segments[1..])],
        "self" => vec![join(module, &segments[1..])],
        "super" => {
            let mut base = module;
            let mut rest = segments;
            while let [first, tail @ ..] = rest {
                if first.as_str() != "super" {
                    break;
                }
                base = base.rsplit_once("::")?.0;
                rest = tail;
            }
            vec![join(base, rest)]
        }
        _ => vec![
            join(module, segments),
            join(crate_root, segments),
            segments.join("::"),
        ],
    };
    Some(candidates)
}

/// Describe every parsed type. Errors are collected across all types.
pub fn describe_types(types: &[ParsedType]) -> Result<Vec<TypeDescriptor>, ParseError> {
    let symbols = SymbolTable::build(types)?;
    let mut descriptors = Vec::with_capacity(types.len());
    let mut errors = Vec::new();

    for parsed in types {
        match describe(parsed, &symbols) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(e) => errors.push(e),
        }
    }

    match ParseError::collect(errors) {
        Some(error) => Err(error),
        None => Ok(descriptors),
    }
}

/// Describe one parsed type.
pub fn describe(parsed: &ParsedType, symbols: &SymbolTable) -> Result<TypeDescriptor, ParseError> {
    let input = &parsed.derive_input;
    let name = parsed.name();
    let unsupported = |message: &str| ParseError::unsupported(parsed.file.clone(), &name, message);

    if !input.generics.params.is_empty() {
        return Err(unsupported("generic types are not supported"));
    }

    let container = ContainerAttrs::parse(&input.attrs)
        .map_err(|e| ParseError::attribute(parsed.file.clone(), &name, e.to_string()))?;

    let mut descriptor = match &input.data {
        Data::Struct(_) => TypeDescriptor::message(parsed.key.clone()),
        Data::Enum(_) => TypeDescriptor::enumeration(parsed.key.clone()),
        Data::Union(_) => return Err(unsupported("unions are not supported")),
    };
    if let Some(package) = &container.package {
        descriptor = descriptor.with_package(package);
    }
    descriptor = descriptor.with_markers(container.markers());

    let module = module_of(&parsed.key);
    match &input.data {
        Data::Struct(data) => {
            let Fields::Named(fields) = &data.fields else {
                return Err(unsupported("only structs with named fields are supported"));
            };
            for field in &fields.named {
                let Some(ident) = &field.ident else { continue };
                let field_name = ident.to_string();
                let attrs = FieldAttrs::parse(&field.attrs).map_err(|e| {
                    ParseError::attribute(parsed.file.clone(), format!("{name}.{field_name}"), e.to_string())
                })?;

                let declared = if attrs.transient {
                    DeclaredType::opaque(type_name(&field.ty))
                } else {
                    classify(&field.ty, &module, symbols)
                };

                let property_name = field_name.strip_prefix("r#").unwrap_or(&field_name);
                let mut property =
                    PropertyDescriptor::new(property_name, declared).with_markers(FieldMarkers {
                        rename: attrs.rename,
                        identity: attrs.id,
                        tags: attrs.tags,
                    });
                if attrs.transient {
                    property = property.transient();
                }
                descriptor = descriptor.with_property(property);
            }
        }
        Data::Enum(data) => {
            for variant in &data.variants {
                if !matches!(variant.fields, Fields::Unit) {
                    return Err(unsupported("only unit variants are supported"));
                }
                let variant_name = variant.ident.to_string();
                let attrs = VariantAttrs::parse(&variant.attrs).map_err(|e| {
                    ParseError::attribute(parsed.file.clone(), format!("{name}::{variant_name}"), e.to_string())
                })?;
                if attrs.skip {
                    continue;
                }

                let number = match (attrs.number, &variant.discriminant) {
                    (Some(number), _) => Some(number),
                    (None, Some((_, expr))) => Some(
                        discriminant_value(expr)
                            .ok_or_else(|| unsupported("discriminant must be an integer literal"))?,
                    ),
                    (None, None) => None,
                };

                let mut value = EnumValueDescriptor::new(variant_name);
                if let Some(number) = number {
                    value = value.with_number(number);
                }
                descriptor = descriptor.with_value(value);
            }
        }
        Data::Union(_) => {}
    }

    tracing::debug!(key = %descriptor.key, "described type");
    Ok(descriptor)
}

fn module_of(key: &TypeKey) -> String {
    key.as_str()
        .rsplit_once("::")
        .map(|(module, _)| module.to_string())
        .unwrap_or_default()
}

fn discriminant_value(expr: &Expr) -> Option<i32> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse().ok(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => discriminant_value(expr).map(|value| -value),
        _ => None,
    }
}

// =============================================================================
// Attributes
// =============================================================================

#[derive(Debug, Default)]
struct ContainerAttrs {
    name: Option<String>,
    package: Option<String>,
    hidden: bool,
    model: bool,
    reference: Option<String>,
    rename_all: Option<RenameRule>,
}

impl ContainerAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        let mut serde_rename = None;
        let mut serde_rename_all = None;

        for attr in attrs {
            if attr.path().is_ident("proto") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        parsed.name = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("package") {
                        parsed.package = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("hidden") {
                        parsed.hidden = true;
                    } else if meta.path.is_ident("model") {
                        parsed.model = true;
                    } else if meta.path.is_ident("reference") {
                        parsed.reference = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("rename_all") {
                        parsed.rename_all = Some(rename_rule(&meta)?);
                    } else {
                        return Err(meta.error("unknown proto container attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                        serde_rename = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("rename_all") && meta.input.peek(syn::Token![=]) {
                        // serde rules without a proto counterpart are ignored
                        serde_rename_all = string_value(&meta)?.parse().ok();
                    } else {
                        skip_value(&meta)?;
                    }
                    Ok(())
                })?;
            }
        }

        parsed.name = parsed.name.or(serde_rename);
        parsed.rename_all = parsed.rename_all.or(serde_rename_all);
        Ok(parsed)
    }

    fn markers(&self) -> TypeMarkers {
        TypeMarkers {
            rename: self.name.clone(),
            hidden: self.hidden,
            model_root: self.model || self.reference.is_some(),
            reference: self.reference.clone(),
            rename_all: self.rename_all,
        }
    }
}

#[derive(Debug, Default)]
struct FieldAttrs {
    rename: Option<String>,
    id: bool,
    tags: Option<String>,
    transient: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        let mut serde_rename = None;
        let mut serde_skip = false;

        for attr in attrs {
            if attr.path().is_ident("proto") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        parsed.rename = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("id") {
                        parsed.id = true;
                    } else if meta.path.is_ident("tags") {
                        parsed.tags = Some(string_value(&meta)?);
                    } else if meta.path.is_ident("transient") {
                        parsed.transient = true;
                    } else {
                        return Err(meta.error("unknown proto field attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                        serde_rename = Some(string_value(&meta)?);
                    } else if is_serde_skip(&meta) {
                        serde_skip = true;
                    } else {
                        skip_value(&meta)?;
                    }
                    Ok(())
                })?;
            }
        }

        parsed.rename = parsed.rename.or(serde_rename);
        parsed.transient |= serde_skip;
        Ok(parsed)
    }
}

#[derive(Debug, Default)]
struct VariantAttrs {
    number: Option<i32>,
    skip: bool,
}

impl VariantAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs {
            if attr.path().is_ident("proto") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("number") {
                        let value: Expr = meta.value()?.parse()?;
                        let number = discriminant_value(&value)
                            .ok_or_else(|| meta.error("number must be an integer literal"))?;
                        parsed.number = Some(number);
                    } else if meta.path.is_ident("skip") {
                        parsed.skip = true;
                    } else {
                        return Err(meta.error("unknown proto variant attribute"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if is_serde_skip(&meta) {
                        parsed.skip = true;
                    } else {
                        skip_value(&meta)?;
                    }
                    Ok(())
                })?;
            }
        }

        Ok(parsed)
    }
}

fn is_serde_skip(meta: &ParseNestedMeta<'_>) -> bool {
    ["skip", "skip_serializing", "skip_deserializing"]
        .iter()
        .any(|ident| meta.path.is_ident(ident))
}

fn string_value(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

fn rename_rule(meta: &ParseNestedMeta<'_>) -> syn::Result<RenameRule> {
    let lit: LitStr = meta.value()?.parse()?;
    lit.value()
        .parse()
        .map_err(|message: String| syn::Error::new(lit.span(), message))
}

/// Consume an attribute value we do not interpret.
fn skip_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_value(&nested))?;
    }
    Ok(())
}

// =============================================================================
// Type Classification
// =============================================================================

/// Map a field type to a [`DeclaredType`].
pub fn classify(ty: &Type, module: &str, symbols: &SymbolTable) -> DeclaredType {
    match ty {
        Type::Reference(reference) => classify(&reference.elem, module, symbols),
        Type::Paren(paren) => classify(&paren.elem, module, symbols),
        Type::Group(group) => classify(&group.elem, module, symbols),
        Type::Slice(slice) => {
            DeclaredType::container(ContainerKind::List, classify(&slice.elem, module, symbols))
        }
        Type::Array(array) => {
            DeclaredType::container(ContainerKind::List, classify(&array.elem, module, symbols))
        }
        Type::TraitObject(object) => DeclaredType::interface(trait_name(object.bounds.iter())),
        Type::ImplTrait(imp) => DeclaredType::interface(trait_name(imp.bounds.iter())),
        Type::Path(path) if path.qself.is_none() => classify_path(&path.path, module, symbols),
        other => DeclaredType::opaque(type_name(other)),
    }
}

fn classify_path(path: &syn::Path, module: &str, symbols: &SymbolTable) -> DeclaredType {
    let Some(last) = path.segments.last() else {
        return DeclaredType::opaque(type_name_of_path(path));
    };
    let name = last.ident.to_string();
    let args = generic_types(&last.arguments);

    if let Some(scalar) = scalar_kind(&name) {
        return DeclaredType::scalar(scalar);
    }
    if let Some(temporal) = temporal_kind(&name) {
        return DeclaredType::temporal(temporal);
    }

    match name.as_str() {
        "Option" => match args.first() {
            Some(inner) => DeclaredType::optional(classify(inner, module, symbols)),
            None => DeclaredType::opaque(name),
        },
        "Box" | "Rc" | "Arc" => match args.first() {
            Some(inner) => classify(inner, module, symbols),
            None => DeclaredType::opaque(name),
        },
        "Cow" => match args.last() {
            Some(inner) => classify(inner, module, symbols),
            None => DeclaredType::opaque(name),
        },
        _ => match container_kind(&name) {
            Some(container) => match args.first() {
                Some(element) => {
                    DeclaredType::container(container, classify(element, module, symbols))
                }
                None => DeclaredType::erased(container),
            },
            None => match symbols.resolve(module, &path_segments(path)) {
                Some(key) => DeclaredType::named(key),
                None => DeclaredType::opaque(name),
            },
        },
    }
}

fn scalar_kind(name: &str) -> Option<ScalarKind> {
    let scalar = match name {
        "String" | "str" => ScalarKind::String,
        "char" => ScalarKind::Char,
        "bool" => ScalarKind::Bool,
        "i8" => ScalarKind::I8,
        "i16" => ScalarKind::I16,
        "i32" => ScalarKind::I32,
        "i64" => ScalarKind::I64,
        "i128" => ScalarKind::I128,
        "isize" => ScalarKind::Isize,
        "u8" => ScalarKind::U8,
        "u16" => ScalarKind::U16,
        "u32" => ScalarKind::U32,
        "u64" => ScalarKind::U64,
        "u128" => ScalarKind::U128,
        "usize" => ScalarKind::Usize,
        "f32" => ScalarKind::F32,
        "f64" => ScalarKind::F64,
        "Uuid" => ScalarKind::Uuid,
        _ => return None,
    };
    Some(scalar)
}

fn temporal_kind(name: &str) -> Option<TemporalKind> {
    let temporal = match name {
        "DateTime" | "SystemTime" => TemporalKind::Instant,
        "NaiveDateTime" => TemporalKind::DateTime,
        "NaiveDate" => TemporalKind::Date,
        "NaiveTime" => TemporalKind::Time,
        _ => return None,
    };
    Some(temporal)
}

fn container_kind(name: &str) -> Option<ContainerKind> {
    match name {
        "Vec" | "LinkedList" => Some(ContainerKind::List),
        "VecDeque" => Some(ContainerKind::Deque),
        "HashSet" | "BTreeSet" => Some(ContainerKind::Set),
        _ => None,
    }
}

/// Type arguments of a path segment, lifetimes and consts dropped.
fn generic_types(arguments: &PathArguments) -> Vec<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn trait_name<'a>(mut bounds: impl Iterator<Item = &'a TypeParamBound>) -> String {
    bounds
        .find_map(|bound| match bound {
            TypeParamBound::Trait(bound) => bound.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "dyn".to_string())
}

fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

fn type_name_of_path(path: &syn::Path) -> String {
    quote_tokens(path)
}

/// Compact source rendering of a type, used for opaque names.
fn type_name(ty: &Type) -> String {
    quote_tokens(ty)
}

fn quote_tokens(tokens: &impl ToTokens) -> String {
    tokens
        .to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
