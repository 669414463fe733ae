//! Compile-time reflection traits.
//!
//! [`Reflect`] tells the engine how a Rust type appears when it is used as a
//! property type. [`Introspect`] is implemented by model types themselves
//! (normally through `#[derive(ProtoSchema)]`) and produces their full
//! [`TypeDescriptor`].
//!
//! # Manual Implementation
//!
//! ```rust
//! use protoschema::{
//!     DeclaredType, Introspect, PropertyDescriptor, Reflect, ReflectiveSource, ScalarKind,
//!     TypeDescriptor, TypeKey,
//! };
//!
//! struct Customer {
//!     name: String,
//! }
//!
//! impl Reflect for Customer {
//!     fn declared_type() -> DeclaredType {
//!         DeclaredType::named(Self::type_key())
//!     }
//!
//!     fn register(source: &mut ReflectiveSource) {
//!         source.insert(Self::type_key(), Self::descriptor);
//!     }
//! }
//!
//! impl Introspect for Customer {
//!     fn type_key() -> TypeKey {
//!         TypeKey::new("shop::Customer")
//!     }
//!
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::message(Self::type_key()).with_property(PropertyDescriptor::new(
//!             "name",
//!             DeclaredType::scalar(ScalarKind::String),
//!         ))
//!     }
//! }
//! ```

use std::collections::{BTreeSet, HashSet, LinkedList, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use crate::descriptor::{ContainerKind, DeclaredType, ScalarKind, TemporalKind, TypeDescriptor, TypeKey};
use crate::source::ReflectiveSource;

/// How a type appears when used as a property type.
pub trait Reflect {
    /// Declared type of a property of this type.
    fn declared_type() -> DeclaredType;

    /// Register this type, and every type it reaches, with `source`.
    ///
    /// Scalars have nothing to register.
    fn register(source: &mut ReflectiveSource) {
        let _ = source;
    }
}

/// A model type that can describe its own shape.
pub trait Introspect: Reflect {
    /// Identity of the type.
    fn type_key() -> TypeKey;

    /// Full descriptor of the type.
    fn descriptor() -> TypeDescriptor;
}

// =============================================================================
// Scalars
// =============================================================================

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::scalar(ScalarKind::$kind)
                }
            }
        )*
    };
}

impl_scalar! {
    String => String,
    str => String,
    char => Char,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl Reflect for std::time::SystemTime {
    fn declared_type() -> DeclaredType {
        DeclaredType::temporal(TemporalKind::Instant)
    }
}

// =============================================================================
// Containers
// =============================================================================

macro_rules! impl_container {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl<T: Reflect> Reflect for $ty<T> {
                fn declared_type() -> DeclaredType {
                    DeclaredType::container(ContainerKind::$kind, T::declared_type())
                }

                fn register(source: &mut ReflectiveSource) {
                    T::register(source);
                }
            }
        )*
    };
}

impl_container! {
    Vec => List,
    VecDeque => Deque,
    LinkedList => List,
    HashSet => Set,
    BTreeSet => Set,
}

impl<T: Reflect> Reflect for [T] {
    fn declared_type() -> DeclaredType {
        DeclaredType::container(ContainerKind::List, T::declared_type())
    }

    fn register(source: &mut ReflectiveSource) {
        T::register(source);
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn declared_type() -> DeclaredType {
        DeclaredType::container(ContainerKind::List, T::declared_type())
    }

    fn register(source: &mut ReflectiveSource) {
        T::register(source);
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::optional(T::declared_type())
    }

    fn register(source: &mut ReflectiveSource) {
        T::register(source);
    }
}

// =============================================================================
// Smart Pointers
// =============================================================================

macro_rules! impl_transparent {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Reflect + ?Sized> Reflect for $ty<T> {
                fn declared_type() -> DeclaredType {
                    T::declared_type()
                }

                fn register(source: &mut ReflectiveSource) {
                    T::register(source);
                }
            }
        )*
    };
}

impl_transparent!(Box, Rc, Arc);

// =============================================================================
// Optional Type Support
// =============================================================================

#[cfg(feature = "chrono")]
mod chrono_impls {
    use super::*;

    impl<Tz: chrono::TimeZone> Reflect for chrono::DateTime<Tz> {
        fn declared_type() -> DeclaredType {
            DeclaredType::temporal(TemporalKind::Instant)
        }
    }

    impl Reflect for chrono::NaiveDateTime {
        fn declared_type() -> DeclaredType {
            DeclaredType::temporal(TemporalKind::DateTime)
        }
    }

    impl Reflect for chrono::NaiveDate {
        fn declared_type() -> DeclaredType {
            DeclaredType::temporal(TemporalKind::Date)
        }
    }

    impl Reflect for chrono::NaiveTime {
        fn declared_type() -> DeclaredType {
            DeclaredType::temporal(TemporalKind::Time)
        }
    }
}

#[cfg(feature = "uuid")]
impl Reflect for uuid::Uuid {
    fn declared_type() -> DeclaredType {
        DeclaredType::scalar(ScalarKind::Uuid)
    }
}
