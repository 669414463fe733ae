//! Container unwrapping.

use crate::descriptor::DeclaredType;
use crate::error::{ProtoError, ProtoResult};
use crate::proto::Cardinality;

/// Element type of a property and the cardinality it implies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unwrapped<'a> {
    pub element: &'a DeclaredType,
    pub cardinality: Cardinality,
}

/// Strip the container or optional layer of a property type.
///
/// A container yields its element with [`Cardinality::Repeated`]; optional
/// elements inside a container are unwrapped as well. `Option<T>` yields `T`
/// as [`Cardinality::Optional`]. Any other type is its own element.
///
/// Fails with [`ProtoError::MissingGenericInfo`] when the container carries
/// no element type, and with [`ProtoError::TypeResolution`] for nested
/// containers, which have no proto representation.
pub fn unwrap_element<'a>(owner: &str, property: &str, ty: &'a DeclaredType) -> ProtoResult<Unwrapped<'a>> {
    match ty {
        DeclaredType::Container { element, .. } => {
            let element = element
                .as_deref()
                .ok_or_else(|| ProtoError::missing_generic_info(owner, property))?;
            let element = strip_optional(element);
            if element.is_container() {
                return Err(ProtoError::type_resolution(
                    owner,
                    property,
                    format!("nested collection '{}' is not supported", ty.display_name()),
                ));
            }
            Ok(Unwrapped {
                element,
                cardinality: Cardinality::Repeated,
            })
        }
        DeclaredType::Optional { inner } => match inner.as_ref() {
            DeclaredType::Container { .. } => unwrap_element(owner, property, inner),
            other => Ok(Unwrapped {
                element: strip_optional(other),
                cardinality: Cardinality::Optional,
            }),
        },
        other => Ok(Unwrapped {
            element: other,
            cardinality: Cardinality::Singular,
        }),
    }
}

fn strip_optional(ty: &DeclaredType) -> &DeclaredType {
    match ty {
        DeclaredType::Optional { inner } => strip_optional(inner),
        other => other,
    }
}
