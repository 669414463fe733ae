//! Rust code generation for the `Reflect` and `Introspect` impls.

pub mod impl_block;

pub use impl_block::ImplBlockGenerator;
