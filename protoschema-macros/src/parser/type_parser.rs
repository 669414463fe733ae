//! Field type classification.
//!
//! Most field types reach the engine through their `Reflect` implementation.
//! Trait objects cannot implement it, so they are recognized here and
//! described as interfaces instead.

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type, TypeParamBound};

use crate::ir::FieldReflection;

/// Pointer types that are transparent around a trait object.
const POINTERS: &[&str] = &["Box", "Rc", "Arc"];

/// Decide how a field's declared type is produced.
pub fn classify(ty: &Type) -> FieldReflection {
    if let Some(inner) = generic_argument(ty, "Option") {
        if let Some(name) = trait_object(inner) {
            return FieldReflection::Interface {
                name,
                optional: true,
            };
        }
    }
    match trait_object(ty) {
        Some(name) => FieldReflection::Interface {
            name,
            optional: false,
        },
        None => FieldReflection::Reflect,
    }
}

/// Strip references and grouping so the type can name a `Reflect` impl.
pub fn reflect_type(ty: &Type) -> &Type {
    match ty {
        Type::Reference(reference) => reflect_type(&reference.elem),
        Type::Paren(paren) => reflect_type(&paren.elem),
        Type::Group(group) => reflect_type(&group.elem),
        other => other,
    }
}

/// Compact source spelling of a type.
pub fn type_name(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

/// Name of the trait behind `dyn Trait`, `&dyn Trait` or `Box<dyn Trait>`.
fn trait_object(ty: &Type) -> Option<String> {
    match reflect_type(ty) {
        Type::TraitObject(object) => object.bounds.iter().find_map(|bound| match bound {
            TypeParamBound::Trait(bound) => bound
                .path
                .segments
                .last()
                .map(|segment| segment.ident.to_string()),
            _ => None,
        }),
        other => POINTERS
            .iter()
            .find_map(|pointer| generic_argument(other, pointer))
            .and_then(trait_object),
    }
}

/// The single type argument of `Wrapper<T>` when the last segment is `wrapper`.
fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = reflect_type(ty) else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}
