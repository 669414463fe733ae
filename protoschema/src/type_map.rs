//! Mapping of declared types to proto type names.

use std::collections::HashMap;

use crate::descriptor::{DeclaredType, ScalarKind, TemporalKind};

/// Maps scalar and temporal types to proto keywords.
///
/// Overrides are keyed by type key (`app::Money`) or simple name (`Money`)
/// and take precedence over every built-in mapping.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    overrides: HashMap<String, String>,
}

impl TypeMapper {
    /// Create a mapper with the built-in table only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override.
    pub fn with_override(mut self, rust_type: impl Into<String>, proto_type: impl Into<String>) -> Self {
        self.overrides.insert(rust_type.into(), proto_type.into());
        self
    }

    /// Add many overrides.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Proto keyword of a scalar.
    pub fn scalar(kind: ScalarKind) -> &'static str {
        match kind {
            ScalarKind::String | ScalarKind::Char | ScalarKind::Uuid => "string",
            ScalarKind::I128 | ScalarKind::U128 => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 => "int32",
            ScalarKind::I64 | ScalarKind::Isize => "int64",
            ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 => "uint32",
            ScalarKind::U64 | ScalarKind::Usize => "uint64",
            ScalarKind::F32 => "float",
            ScalarKind::F64 => "double",
        }
    }

    /// Well-known proto type of a temporal.
    pub fn temporal(kind: TemporalKind) -> &'static str {
        match kind {
            TemporalKind::Instant => "kogito.Instant",
            TemporalKind::DateTime => "kogito.LocalDateTime",
            TemporalKind::Date => "kogito.LocalDate",
            TemporalKind::Time => "kogito.LocalTime",
        }
    }

    /// Map a declared type directly, if possible.
    ///
    /// Returns `None` for types that need resolution (named types) or cannot
    /// be mapped at all (interfaces, opaque types, containers).
    pub fn map(&self, ty: &DeclaredType) -> Option<String> {
        match ty {
            DeclaredType::Scalar { scalar } => Some(Self::scalar(*scalar).to_string()),
            DeclaredType::Temporal { temporal } => Some(Self::temporal(*temporal).to_string()),
            DeclaredType::Named { key } => self
                .overrides
                .get(key.as_str())
                .or_else(|| self.overrides.get(key.simple_name()))
                .cloned(),
            DeclaredType::Interface { name } | DeclaredType::Opaque { name } => {
                self.overrides.get(name).cloned()
            }
            DeclaredType::Container { .. } | DeclaredType::Optional { .. } => None,
        }
    }
}
