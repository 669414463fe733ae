//! Configuration management for the CLI.
//!
//! Settings come from `protoschema.toml`; command-line arguments are merged
//! on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use protoschema::{ModelProtoOptions, Syntax, TypeKey, TypeMapper};

use crate::error::{CliResult, ConfigError};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "protoschema.toml";

/// Type key root when neither the configuration nor a manifest names one.
pub const FALLBACK_CRATE_NAME: &str = "crate";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub proto: ProtoConfig,
    pub types: TypesConfig,
}

/// Where type descriptions come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Root of the module path of scanned types. Read from the input's
    /// `Cargo.toml` when unset.
    pub crate_name: Option<String>,

    /// JSON descriptor sets merged into the scanned types.
    pub descriptors: Vec<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the artifacts are written under.
    pub dir: PathBuf,

    /// Name of the data-types artifact; not written when unset.
    pub data_types_file: Option<String>,

    /// Package of the data-types artifact.
    pub data_types_package: String,
}

/// Proto document settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProtoConfig {
    /// `proto2` or `proto3`.
    pub syntax: String,

    /// Files imported by every model proto.
    pub index_imports: Vec<String>,

    /// Type of the metadata field appended to model messages.
    pub metadata_type: String,

    /// Name of the metadata field appended to model messages.
    pub metadata_field: String,
}

/// Type selection and mapping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    /// Rust type (key or simple name) to proto type.
    pub overrides: BTreeMap<String, String>,

    /// Explicit data types; inferred from the model types when unset.
    pub data_types: Option<Vec<String>>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            crate_name: None,
            descriptors: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./proto"),
            data_types_file: None,
            data_types_package: String::new(),
        }
    }
}

impl Default for ProtoConfig {
    fn default() -> Self {
        let options = ModelProtoOptions::default();
        Self {
            syntax: Syntax::default().as_str().to_string(),
            index_imports: options.index_imports,
            metadata_type: options.metadata_type,
            metadata_field: options.metadata_field,
        }
    }
}

impl Config {
    /// Parsed proto syntax.
    pub fn syntax(&self) -> Result<Syntax, ConfigError> {
        self.proto
            .syntax
            .parse()
            .map_err(|message: String| ConfigError::invalid_value("proto.syntax", message))
    }

    /// Model proto constants with the configured overrides applied.
    pub fn model_options(&self) -> ModelProtoOptions {
        ModelProtoOptions {
            index_imports: self.proto.index_imports.clone(),
            metadata_type: self.proto.metadata_type.clone(),
            metadata_field: self.proto.metadata_field.clone(),
            ..ModelProtoOptions::default()
        }
    }

    /// Crate name the type keys of sources below `input` start with.
    ///
    /// The configured name wins. Otherwise the `[package] name` of
    /// `input/Cargo.toml` is used as `module_path!()` spells it, with dashes
    /// turned into underscores.
    pub fn crate_name_for(&self, input: &Path) -> String {
        if let Some(name) = &self.input.crate_name {
            return name.clone();
        }
        match manifest_package_name(&input.join("Cargo.toml")) {
            Some(name) => name.replace('-', "_"),
            None => FALLBACK_CRATE_NAME.to_string(),
        }
    }

    pub fn type_mapper(&self) -> TypeMapper {
        TypeMapper::new().with_overrides(self.types.overrides.clone())
    }

    /// Explicit data types, if configured.
    pub fn data_types(&self) -> Option<Vec<TypeKey>> {
        self.types
            .data_types
            .as_ref()
            .map(|types| types.iter().map(|t| TypeKey::new(t.as_str())).collect())
    }
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<Package>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
}

fn manifest_package_name(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<Manifest>(&content) {
        Ok(manifest) => manifest.package.map(|package| package.name),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable manifest, ignoring");
            None
        }
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from `path`, or from [`CONFIG_FILENAME`] when `None`.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path.clone(), e.to_string()))?;
        config.syntax()?;

        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Merge CLI arguments into configuration. Arguments win.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(ref crate_name) = args.crate_name {
            config.input.crate_name = Some(crate_name.clone());
        }

        if let Some(ref syntax) = args.syntax {
            config.proto.syntax = syntax.clone();
        }

        config
    }

    /// Default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# protoschema configuration file

[input]
# Module path root of the scanned types (type keys look like <crate_name>::module::Type).
# Defaults to the package name in the input's Cargo.toml, or "crate" without one.
# crate_name = "travels"

# JSON descriptor sets merged into the scanned types
descriptors = []

[output]
# Directory the .proto files are written under
dir = "./proto"

# Write one extra document holding every data type
# data_types_file = "data-types"
data_types_package = ""

[proto]
# proto2 or proto3
syntax = "proto2"

# Files imported by every model proto
index_imports = ["kogito-index.proto", "kogito-types.proto"]

# Field appended to every model message
metadata_type = "org.kie.kogito.index.model.KogitoMetadata"
metadata_field = "metadata"

[types]
# Map Rust types (full key or simple name) to proto types
# overrides = { Money = "string" }

# Explicit data types instead of the ones inferred from the model types
# data_types = ["travels::model::Order"]
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    pub output: Option<PathBuf>,
    pub crate_name: Option<String>,
    pub syntax: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.input.crate_name.is_none());
        assert_eq!(config.output.dir, PathBuf::from("./proto"));
        assert!(config.output.data_types_file.is_none());
        assert_eq!(config.syntax().unwrap(), Syntax::Proto2);
        assert_eq!(
            config.proto.index_imports,
            vec!["kogito-index.proto".to_string(), "kogito-types.proto".to_string()]
        );
        assert!(config.data_types().is_none());
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: Config = toml::from_str(ConfigManager::default_config_content()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.input.crate_name, defaults.input.crate_name);
        assert_eq!(config.output.dir, defaults.output.dir);
        assert_eq!(config.proto.metadata_type, defaults.proto.metadata_type);
        assert_eq!(config.model_options(), ModelProtoOptions::default());
    }

    #[test]
    fn test_merge_cli_args() {
        let args = CliArgs {
            output: Some(PathBuf::from("./custom")),
            syntax: Some("proto3".to_string()),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(Config::default(), &args);
        assert_eq!(merged.output.dir, PathBuf::from("./custom"));
        assert_eq!(merged.syntax().unwrap(), Syntax::Proto3);
        assert!(merged.input.crate_name.is_none());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[input]
crate_name = "travels"
descriptors = ["descriptors/extra.json"]

[output]
dir = "./target/proto"
data_types_file = "travels-data"
data_types_package = "org.acme.travels"

[proto]
syntax = "proto3"
metadata_field = "meta"

[types]
overrides = { Money = "string" }
data_types = ["travels::model::Traveller"]
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.input.crate_name.as_deref(), Some("travels"));
        assert_eq!(config.input.descriptors, vec![PathBuf::from("descriptors/extra.json")]);
        assert_eq!(config.output.data_types_file.as_deref(), Some("travels-data"));
        assert_eq!(config.syntax().unwrap(), Syntax::Proto3);
        assert_eq!(config.model_options().metadata_field, "meta");
        assert_eq!(
            config.model_options().metadata_type,
            "org.kie.kogito.index.model.KogitoMetadata"
        );
        assert_eq!(
            config.data_types(),
            Some(vec![TypeKey::new("travels::model::Traveller")])
        );
    }

    #[test]
    fn test_crate_name_read_from_manifest() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"travel-agency\"\nversion = \"0.1.0\"\n\n[dependencies]\nserde = \"1\"\n",
        )
        .unwrap();

        let config = Config::default();
        assert_eq!(config.crate_name_for(dir.path()), "travel_agency");

        let args = CliArgs {
            crate_name: Some("travels".to_string()),
            ..Default::default()
        };
        let merged = ConfigManager::merge_cli_args(config, &args);
        assert_eq!(merged.crate_name_for(dir.path()), "travels");
    }

    #[test]
    fn test_crate_name_fallback_without_package() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::default();
        assert_eq!(config.crate_name_for(dir.path()), FALLBACK_CRATE_NAME);

        std::fs::write(dir.path().join("Cargo.toml"), "[workspace]\nmembers = [\"a\"]\n").unwrap();
        assert_eq!(config.crate_name_for(dir.path()), FALLBACK_CRATE_NAME);

        std::fs::write(dir.path().join("Cargo.toml"), "[package\nname = ").unwrap();
        assert_eq!(config.crate_name_for(dir.path()), FALLBACK_CRATE_NAME);
    }

    #[test]
    fn test_invalid_syntax_rejected() {
        let mut config = Config::default();
        config.proto.syntax = "proto4".to_string();
        assert!(matches!(
            config.syntax(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
