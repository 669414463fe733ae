//! Proto generation from parsed Rust types.
//!
//! Parsed types are described, merged with any configured descriptor files
//! into a [`DescriptorSource`] and handed to the engine's
//! [`ProtoGenerator`]. Types marked as model roots get a model proto each;
//! the data types optionally go to one extra document.

use std::collections::BTreeSet;
use std::path::Path;

use protoschema::{
    render, DescriptorSource, GeneratedArtifact, ProtoGenerator, SchemaDocument, TypeKey,
};

use crate::config::Config;
use crate::describe::describe_types;
use crate::error::{CliResult, ParseError};
use crate::parser::ParsedType;

/// Everything one generation run produced.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Model protos followed by the data-types document, if configured.
    pub artifacts: Vec<GeneratedArtifact>,

    /// Model root types, in key order.
    pub model_types: Vec<TypeKey>,

    /// Data types, explicit or inferred.
    pub data_types: Vec<TypeKey>,
}

impl GeneratedOutput {
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Drives the engine for a scanned project.
pub struct SchemaGenerator {
    config: Config,
}

impl SchemaGenerator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Describe `types` and merge in the configured descriptor files.
    ///
    /// Descriptor files are loaded first so scanned types replace them on
    /// a key clash.
    pub fn build_source(&self, types: &[ParsedType]) -> CliResult<DescriptorSource> {
        let mut source = DescriptorSource::new();
        for path in &self.config.input.descriptors {
            let loaded = load_descriptor_file(path)?;
            tracing::debug!(file = %path.display(), types = loaded.len(), "loaded descriptor file");
            source.extend(loaded.descriptors().cloned());
        }

        source.extend(describe_types(types)?);
        Ok(source)
    }

    /// Build the engine generator over `source`.
    pub fn generator(&self, source: DescriptorSource) -> CliResult<ProtoGenerator<DescriptorSource>> {
        let model_types: Vec<TypeKey> = source
            .descriptors()
            .filter(|descriptor| descriptor.markers.model_root)
            .map(|descriptor| descriptor.key.clone())
            .collect();

        let mut builder = ProtoGenerator::builder(source)
            .with_type_mapper(self.config.type_mapper())
            .with_options(self.config.model_options())
            .with_syntax(self.config.syntax()?);
        if let Some(data_types) = self.config.data_types() {
            builder = builder.with_data_types(data_types);
        }

        Ok(builder.build(model_types)?)
    }

    /// Generate every artifact for `types`.
    pub fn generate(&self, types: &[ParsedType]) -> CliResult<GeneratedOutput> {
        let generator = self.generator(self.build_source(types)?)?;

        let mut artifacts = generator.generate_model_protos()?;
        if let Some(file) = &self.config.output.data_types_file {
            let doc = self.data_types_document(&generator)?;
            if doc.is_empty() {
                tracing::debug!("no data types, skipping data types document");
            } else {
                artifacts.push(render(&doc.with_primary(file)));
            }
        }

        tracing::info!(
            models = generator.model_types().len(),
            artifacts = artifacts.len(),
            "generation finished"
        );
        Ok(GeneratedOutput {
            artifacts,
            model_types: generator.model_types().to_vec(),
            data_types: generator.data_types().to_vec(),
        })
    }

    /// Process ids referenced by the model types of `types`.
    pub fn process_ids(&self, types: &[ParsedType]) -> CliResult<BTreeSet<String>> {
        let generator = self.generator(self.build_source(types)?)?;
        Ok(generator.process_ids()?)
    }

    fn data_types_document(
        &self,
        generator: &ProtoGenerator<DescriptorSource>,
    ) -> CliResult<SchemaDocument> {
        let headers: Vec<String> = self
            .config
            .proto
            .index_imports
            .iter()
            .map(|import| format!("import \"{import}\";"))
            .collect();
        Ok(generator.proto_of_data_types(&self.config.output.data_types_package, &headers)?)
    }
}

fn load_descriptor_file(path: &Path) -> CliResult<DescriptorSource> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ParseError::descriptor(path.to_path_buf(), e.to_string()))?;
    let source = DescriptorSource::from_json(&content)
        .map_err(|e| ParseError::descriptor(path.to_path_buf(), e.to_string()))?;
    Ok(source)
}
