//! Error types for the CLI.

use std::path::PathBuf;
use thiserror::Error;

use protoschema::ProtoError;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to scan directory: {0}")]
    Scan(#[from] ScanError),

    #[error("Failed to parse source file: {0}")]
    Parse(#[from] ParseError),

    /// Schema derivation failed.
    #[error("Failed to generate proto schemas: {0}")]
    Generate(#[from] ProtoError),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    /// Generated files are missing or out of date.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during source file scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("No Rust files found in: {path}")]
    NoRustFiles { path: PathBuf },

    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error while turning Rust sources into type descriptors.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file is not valid Rust.
    #[error("Syntax error in {file}: {message}")]
    Syntax { file: PathBuf, message: String },

    /// A `#[proto(...)]` attribute could not be read.
    #[error("Invalid attribute on '{type_name}' in {file}: {message}")]
    Attribute {
        file: PathBuf,
        type_name: String,
        message: String,
    },

    /// A derived item the engine cannot describe (generic, tuple struct, ...).
    #[error("Unsupported item '{type_name}' in {file}: {message}")]
    Unsupported {
        file: PathBuf,
        type_name: String,
        message: String,
    },

    /// Two scanned items share a type key.
    #[error("Type '{key}' is defined in both {first} and {second}")]
    DuplicateType {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A descriptor file could not be read or decoded.
    #[error("Invalid descriptor file {file}: {message}")]
    Descriptor { file: PathBuf, message: String },

    #[error("Multiple parse errors:\n{}", format_errors(.0))]
    Multiple(Vec<ParseError>),
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error during file watching.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to initialize file watcher: {0}")]
    Init(String),
}

fn format_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. {}", i + 1, e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ParseError {
    pub fn syntax(file: PathBuf, message: impl Into<String>) -> Self {
        Self::Syntax {
            file,
            message: message.into(),
        }
    }

    pub fn attribute(file: PathBuf, type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attribute {
            file,
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(file: PathBuf, type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unsupported {
            file,
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn descriptor(file: PathBuf, message: impl Into<String>) -> Self {
        Self::Descriptor {
            file,
            message: message.into(),
        }
    }

    /// Collapse a list of errors; `None` when the list is empty.
    pub fn collect(mut errors: Vec<ParseError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }
}

impl ScanError {
    pub fn not_found(path: PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }

    pub fn no_rust_files(path: PathBuf) -> Self {
        Self::NoRustFiles { path }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
