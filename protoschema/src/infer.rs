//! Data type inference.
//!
//! When no explicit set of auxiliary data types is configured, the types
//! referenced by the model roots' properties are used instead. Scalars,
//! temporals, interfaces and opaque types are never data types.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::descriptor::{DeclaredType, TypeKey};
use crate::error::ProtoResult;
use crate::extract::ClassDescriptor;
use crate::source::SchemaSource;

/// Collect the data types referenced by the properties of `roots`.
///
/// The roots themselves are only included when another root refers to
/// them. The result keeps first-seen order and holds each type once.
pub fn infer_data_types<S: SchemaSource + ?Sized>(source: &S, roots: &[TypeKey]) -> ProtoResult<Vec<TypeKey>> {
    let mut seen = HashSet::new();
    let mut data_types = Vec::new();

    for root in roots {
        let class = ClassDescriptor::extract(source, root)?;
        for property in class.properties() {
            if let Some(key) = data_type_of(&property.ty) {
                if seen.insert(key.clone()) {
                    debug!(root = %root, property = %property.name, data_type = %key, "inferred data type");
                    data_types.push(key.clone());
                }
            }
        }
    }

    info!(roots = roots.len(), data_types = data_types.len(), "inferred data types from model roots");
    Ok(data_types)
}

/// The described type a property refers to, looking through containers
/// and optionals.
fn data_type_of(ty: &DeclaredType) -> Option<&TypeKey> {
    match ty {
        DeclaredType::Named { key } => Some(key),
        DeclaredType::Optional { inner } => data_type_of(inner),
        DeclaredType::Container { element, .. } => element.as_deref().and_then(data_type_of),
        DeclaredType::Scalar { .. }
        | DeclaredType::Temporal { .. }
        | DeclaredType::Interface { .. }
        | DeclaredType::Opaque { .. } => None,
    }
}
