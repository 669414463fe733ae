//! # protoschema-cli
//!
//! Library behind the `protoschema` command: generates `.proto` files from
//! Rust sources without compiling them.
//!
//! ## Architecture
//!
//! - [`config`] - `protoschema.toml` loading and CLI overrides
//! - [`scanner`] - source file discovery and filtering
//! - [`parser`] - finding `#[derive(ProtoSchema)]` items with `syn`
//! - [`describe`] - turning parsed items into type descriptors
//! - [`generator`] - running the engine over the described types
//! - [`writer`] - writing and checking artifacts
//! - [`watcher`] - regeneration on source changes
//! - [`error`] - error types

pub mod config;
pub mod describe;
pub mod error;
pub mod generator;
pub mod parser;
pub mod scanner;
pub mod watcher;
pub mod writer;

pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use generator::{GeneratedOutput, SchemaGenerator};
pub use parser::{ParsedType, RustParser};
pub use scanner::{SourceFile, SourceScanner};
pub use watcher::FileWatcher;
pub use writer::FileWriter;
