//! # protoschema
//!
//! Derive protobuf schema documents from the shape of Rust model types.
//!
//! The engine walks a type graph (properties, nested types, collections and
//! enumerations) and produces a `.proto` document suitable for persistence
//! and indexing by a downstream storage layer. Types are described through a
//! [`SchemaSource`]: either compile-time reflection via
//! `#[derive(ProtoSchema)]` ([`ReflectiveSource`]) or descriptors supplied
//! ahead of time ([`DescriptorSource`]).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use protoschema::{Introspect, ProtoGenerator, ProtoSchema, ReflectiveSource};
//!
//! #[derive(ProtoSchema)]
//! #[proto(model, reference = "travels")]
//! struct Travels {
//!     id: String,
//!     traveller: Traveller,
//! }
//!
//! #[derive(ProtoSchema)]
//! struct Traveller {
//!     first_name: String,
//!     last_name: String,
//! }
//!
//! let mut source = ReflectiveSource::new();
//! source.register::<Travels>();
//!
//! let generator = ProtoGenerator::builder(source).build([Travels::type_key()])?;
//! let artifacts = generator.generate_model_protos()?;
//! ```
//!
//! ## Features
//!
//! - `derive` (default): re-exports `#[derive(ProtoSchema)]`
//! - `chrono`: temporal mappings for chrono types
//! - `uuid`: `Uuid` maps to `string`

pub mod annotate;
pub mod builder;
pub mod collection;
pub mod descriptor;
pub mod enums;
pub mod error;
pub mod extract;
pub mod generator;
pub mod infer;
pub mod naming;
pub mod proto;
pub mod reflect;
pub mod render;
pub mod source;
pub mod type_map;

pub use builder::{Comments, Resolved, SchemaBuilder};
pub use descriptor::{
    ContainerKind, DeclaredType, EnumValueDescriptor, FieldMarkers, Modifiers, PropertyDescriptor,
    ScalarKind, TemporalKind, TypeDescriptor, TypeKey, TypeMarkers, TypeShape,
};
pub use error::{ProtoError, ProtoResult};
pub use extract::ClassDescriptor;
pub use generator::{GenerationRequest, ModelProtoOptions, ProtoGenerator, ProtoGeneratorBuilder};
pub use naming::RenameRule;
pub use proto::{
    Cardinality, EnumId, EnumValue, Field, FieldType, Message, MessageId, ProtoEnum,
    SchemaDocument, Syntax,
};
pub use reflect::{Introspect, Reflect};
pub use render::{render, GeneratedArtifact};
pub use source::{DescriptorSet, DescriptorSource, ReflectiveSource, SchemaSource};
pub use type_map::TypeMapper;

#[cfg(feature = "derive")]
pub use protoschema_macros::ProtoSchema;
