//! Generation facade.
//!
//! [`ProtoGenerator`] ties a [`SchemaSource`] to a set of model root types
//! and the auxiliary data types they use. Every generation call is an
//! independent pass with its own document and memo; a failed pass returns
//! an error and no document.
//!
//! # Example
//!
//! ```rust,ignore
//! use protoschema::{ProtoGenerator, ReflectiveSource, Introspect};
//!
//! let mut source = ReflectiveSource::new();
//! source.register::<Travels>();
//!
//! let generator = ProtoGenerator::builder(source).build([Travels::type_key()])?;
//! for artifact in generator.generate_model_protos()? {
//!     std::fs::write(&artifact.name, &artifact.content)?;
//! }
//! ```

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::annotate::{INDEXED_MESSAGE_COMMENT, INDEX_COMMENT};
use crate::builder::{Comments, SchemaBuilder};
use crate::descriptor::TypeKey;
use crate::error::{ProtoError, ProtoResult};
use crate::infer::infer_data_types;
use crate::proto::{Cardinality, Field, FieldType, SchemaDocument, Syntax};
use crate::render::{render, GeneratedArtifact};
use crate::source::SchemaSource;
use crate::type_map::TypeMapper;

// =============================================================================
// Options
// =============================================================================

/// Constants of model protos consumed by the indexing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProtoOptions {
    /// Files imported by every model proto.
    pub index_imports: Vec<String>,
    /// Option naming the model message.
    pub model_option: String,
    /// Option naming the process id.
    pub id_option: String,
    /// Type of the late-appended metadata field.
    pub metadata_type: String,
    /// Name of the late-appended metadata field.
    pub metadata_field: String,
    pub message_comment: String,
    pub field_comment: String,
}

impl Default for ModelProtoOptions {
    fn default() -> Self {
        Self {
            index_imports: vec!["kogito-index.proto".to_string(), "kogito-types.proto".to_string()],
            model_option: "kogito_model".to_string(),
            id_option: "kogito_id".to_string(),
            metadata_type: "org.kie.kogito.index.model.KogitoMetadata".to_string(),
            metadata_field: "metadata".to_string(),
            message_comment: INDEXED_MESSAGE_COMMENT.to_string(),
            field_comment: INDEX_COMMENT.to_string(),
        }
    }
}

impl ModelProtoOptions {
    /// Header directives of the model proto for `model` and `process_id`.
    pub fn headers(&self, model: &str, process_id: &str) -> Vec<String> {
        let mut headers: Vec<String> = self
            .index_imports
            .iter()
            .map(|import| format!("import \"{import}\";"))
            .collect();
        headers.push(format!("option {} = \"{model}\";", self.model_option));
        headers.push(format!("option {} = \"{process_id}\";", self.id_option));
        headers
    }
}

/// Parameters of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub package: String,
    pub headers: Vec<String>,
    pub message_comment: Option<String>,
    pub field_comment: Option<String>,
}

impl GenerationRequest {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    pub fn with_headers<I, H>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        self.headers.extend(headers.into_iter().map(Into::into));
        self
    }

    pub fn with_message_comment(mut self, comment: impl Into<String>) -> Self {
        self.message_comment = Some(comment.into());
        self
    }

    pub fn with_field_comment(mut self, comment: impl Into<String>) -> Self {
        self.field_comment = Some(comment.into());
        self
    }

    fn comments(&self) -> Comments<'_> {
        Comments {
            message: self.message_comment.as_deref(),
            field: self.field_comment.as_deref(),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ProtoGenerator`].
pub struct ProtoGeneratorBuilder<S> {
    source: S,
    data_types: Option<Vec<TypeKey>>,
    mapper: TypeMapper,
    options: ModelProtoOptions,
    syntax: Syntax,
}

impl<S: SchemaSource> ProtoGeneratorBuilder<S> {
    /// Use an explicit set of data types instead of inferring it.
    pub fn with_data_types(mut self, data_types: impl IntoIterator<Item = TypeKey>) -> Self {
        self.data_types = Some(data_types.into_iter().collect());
        self
    }

    pub fn with_type_mapper(mut self, mapper: TypeMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_options(mut self, options: ModelProtoOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Build the generator for `model_types`.
    ///
    /// Infers the data types from the models unless an explicit set was
    /// supplied.
    pub fn build(self, model_types: impl IntoIterator<Item = TypeKey>) -> ProtoResult<ProtoGenerator<S>> {
        let model_types: Vec<TypeKey> = model_types.into_iter().collect();
        let data_types = match self.data_types {
            Some(data_types) => {
                info!(count = data_types.len(), "using provided data types instead of inferring them");
                data_types
            }
            None => infer_data_types(&self.source, &model_types)?,
        };

        Ok(ProtoGenerator {
            source: self.source,
            model_types,
            data_types,
            mapper: self.mapper,
            options: self.options,
            syntax: self.syntax,
        })
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Generates schema documents for model and data types.
pub struct ProtoGenerator<S> {
    source: S,
    model_types: Vec<TypeKey>,
    data_types: Vec<TypeKey>,
    mapper: TypeMapper,
    options: ModelProtoOptions,
    syntax: Syntax,
}

impl<S: SchemaSource> ProtoGenerator<S> {
    /// Start building a generator over `source`.
    pub fn builder(source: S) -> ProtoGeneratorBuilder<S> {
        ProtoGeneratorBuilder {
            source,
            data_types: None,
            mapper: TypeMapper::new(),
            options: ModelProtoOptions::default(),
            syntax: Syntax::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn model_types(&self) -> &[TypeKey] {
        &self.model_types
    }

    pub fn data_types(&self) -> &[TypeKey] {
        &self.data_types
    }

    pub fn options(&self) -> &ModelProtoOptions {
        &self.options
    }

    fn new_document(&self, package: &str, headers: &[String]) -> SchemaDocument {
        SchemaDocument::new(package, headers.iter().cloned()).with_syntax(self.syntax)
    }

    /// Generate the document of one root type.
    ///
    /// The request's package applies to the root and every type it reaches.
    pub fn generate(&self, root: &TypeKey, request: &GenerationRequest) -> ProtoResult<SchemaDocument> {
        let mut doc = self.new_document(&request.package, &request.headers);
        let mut builder = SchemaBuilder::new(&self.source, &self.mapper);

        builder
            .resolve(&mut doc, root, Some(&request.package), request.comments())
            .map_err(|e| e.in_type(root.as_str()))?;

        debug!(root = %root, messages = doc.message_count(), enums = doc.enum_count(), "generated document");
        Ok(doc)
    }

    /// Generate one document holding every data type.
    ///
    /// Each type keeps its own package and no comments are attached.
    pub fn proto_of_data_types(&self, package: &str, headers: &[String]) -> ProtoResult<SchemaDocument> {
        let mut doc = self.new_document(package, headers);
        let mut builder = SchemaBuilder::new(&self.source, &self.mapper);

        for data_type in &self.data_types {
            builder
                .resolve(&mut doc, data_type, None, Comments::default())
                .map_err(|e| e.in_type(data_type.as_str()))?;
        }

        info!(
            data_types = self.data_types.len(),
            messages = doc.message_count(),
            enums = doc.enum_count(),
            "generated data types document"
        );
        Ok(doc)
    }

    /// Process ids referenced by the model types.
    pub fn process_ids(&self) -> ProtoResult<BTreeSet<String>> {
        let mut ids = BTreeSet::new();
        for model in &self.model_types {
            let descriptor = self.source.describe(model)?;
            if let Some(reference) = descriptor.markers.reference {
                ids.insert(reference);
            }
        }
        Ok(ids)
    }

    /// Generate the model proto of one generated model root.
    ///
    /// Returns `None` when the type carries no generated-root reference or
    /// when nothing was generated for it (the type is hidden).
    pub fn generate_model_proto(&self, model: &TypeKey) -> ProtoResult<Option<GeneratedArtifact>> {
        let descriptor = self.source.describe(model).map_err(|e| e.in_type(model.as_str()))?;
        let Some(process_id) = descriptor.markers.reference.clone() else {
            debug!(model = %model, "no generated-root reference, skipping model proto");
            return Ok(None);
        };
        let model_name = descriptor.output_name().to_string();

        let package = if descriptor.package.is_empty() {
            process_id.clone()
        } else {
            format!("{}.{process_id}", descriptor.package)
        };
        let request = GenerationRequest::new(package)
            .with_headers(self.options.headers(&model_name, &process_id))
            .with_message_comment(&self.options.message_comment)
            .with_field_comment(&self.options.field_comment);

        let doc = self.generate(model, &request)?;
        if doc.message_count() == 0 {
            debug!(model = %model, "model proto has no messages, nothing to write");
            return Ok(None);
        }

        let doc = self.append_metadata(doc, &model_name).map_err(|e| e.in_type(model.as_str()))?;
        let artifact = render(&doc.with_primary(&process_id));
        info!(model = %model, process_id = %process_id, artifact = %artifact.name, "generated model proto");
        Ok(Some(artifact))
    }

    /// Late-append the metadata field to the model message.
    fn append_metadata(&self, mut doc: SchemaDocument, model_name: &str) -> ProtoResult<SchemaDocument> {
        let id = doc
            .find_message(model_name)
            .ok_or_else(|| ProtoError::model_structure("Unable to find model message"))?;

        doc.message_mut(id)
            .add_field(
                Field::new(
                    &self.options.metadata_field,
                    FieldType::Named(self.options.metadata_type.clone()),
                    Cardinality::Optional,
                )
                .with_comment(Some(self.options.field_comment.clone())),
            )
            .map_err(ProtoError::model_structure)?;
        Ok(doc)
    }
}

impl<S: SchemaSource + Sync> ProtoGenerator<S> {
    /// Generate the model protos of every model type.
    ///
    /// Each model is an independent pass; passes run in parallel and the
    /// result follows the model order. The first failure aborts the batch.
    pub fn generate_model_protos(&self) -> ProtoResult<Vec<GeneratedArtifact>> {
        let artifacts = self
            .model_types
            .par_iter()
            .map(|model| self.generate_model_proto(model))
            .collect::<ProtoResult<Vec<_>>>()?;

        Ok(artifacts.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        ContainerKind, DeclaredType, PropertyDescriptor, ScalarKind, TypeDescriptor, TypeMarkers,
    };
    use crate::source::DescriptorSource;

    fn model_markers(reference: &str) -> TypeMarkers {
        TypeMarkers {
            model_root: true,
            reference: Some(reference.to_string()),
            ..Default::default()
        }
    }

    fn travels_source() -> DescriptorSource {
        DescriptorSource::from_descriptors([
            TypeDescriptor::message("org::acme::travels::Travels")
                .with_markers(model_markers("travels"))
                .with_property(PropertyDescriptor::new("id", DeclaredType::scalar(ScalarKind::String)))
                .with_property(PropertyDescriptor::new(
                    "traveller",
                    DeclaredType::named("org::acme::travels::Traveller"),
                )),
            TypeDescriptor::message("org::acme::travels::Traveller")
                .with_property(PropertyDescriptor::new("firstName", DeclaredType::scalar(ScalarKind::String))),
        ])
    }

    #[test]
    fn test_builder_infers_data_types() {
        let generator = ProtoGenerator::builder(travels_source())
            .build([TypeKey::new("org::acme::travels::Travels")])
            .unwrap();
        assert_eq!(generator.data_types(), &[TypeKey::new("org::acme::travels::Traveller")]);
    }

    #[test]
    fn test_builder_uses_explicit_data_types_verbatim() {
        let generator = ProtoGenerator::builder(travels_source())
            .with_data_types([TypeKey::new("org::acme::travels::Travels")])
            .build([TypeKey::new("org::acme::travels::Travels")])
            .unwrap();
        assert_eq!(generator.data_types(), &[TypeKey::new("org::acme::travels::Travels")]);
    }

    #[test]
    fn test_process_ids() {
        let generator = ProtoGenerator::builder(travels_source())
            .build([
                TypeKey::new("org::acme::travels::Travels"),
                TypeKey::new("org::acme::travels::Traveller"),
            ])
            .unwrap();
        let ids: Vec<_> = generator.process_ids().unwrap().into_iter().collect();
        assert_eq!(ids, vec!["travels".to_string()]);
    }

    #[test]
    fn test_model_proto_headers_and_metadata() {
        let generator = ProtoGenerator::builder(travels_source())
            .build([TypeKey::new("org::acme::travels::Travels")])
            .unwrap();
        let artifact = generator
            .generate_model_proto(&TypeKey::new("org::acme::travels::Travels"))
            .unwrap()
            .unwrap();

        assert_eq!(artifact.name, "org/acme/travels/travels/travels.proto");
        assert!(artifact.content.contains("package org.acme.travels.travels;\n"));
        assert!(artifact.content.contains("option kogito_model = \"Travels\";\n"));
        assert!(artifact.content.contains("option kogito_id = \"travels\";\n"));
        assert!(artifact
            .content
            .contains("    optional org.kie.kogito.index.model.KogitoMetadata metadata = 3;\n"));
        assert!(artifact
            .content
            .contains("    /* @Field(index = Index.YES, store = Store.YES) @SortableField */\n    optional string id = 1;\n"));
    }

    #[test]
    fn test_model_without_reference_yields_nothing() {
        let generator = ProtoGenerator::builder(travels_source())
            .build([TypeKey::new("org::acme::travels::Traveller")])
            .unwrap();
        let artifact = generator
            .generate_model_proto(&TypeKey::new("org::acme::travels::Traveller"))
            .unwrap();
        assert!(artifact.is_none());
    }

    #[test]
    fn test_hidden_model_yields_nothing() {
        let source = DescriptorSource::from_descriptors([TypeDescriptor::message("app::Hidden")
            .with_markers(TypeMarkers {
                hidden: true,
                ..model_markers("hidden")
            })]);
        let generator = ProtoGenerator::builder(source)
            .build([TypeKey::new("app::Hidden")])
            .unwrap();
        assert!(generator.generate_model_protos().unwrap().is_empty());
    }

    #[test]
    fn test_missing_model_message_is_structure_error() {
        let source = DescriptorSource::from_descriptors([TypeDescriptor::message("app::Travels")
            .with_markers(TypeMarkers {
                rename: Some("Trips".to_string()),
                ..model_markers("travels")
            })
            .with_property(PropertyDescriptor::new("id", DeclaredType::scalar(ScalarKind::String)))]);
        let generator = ProtoGenerator::builder(source)
            .build([TypeKey::new("app::Travels")])
            .unwrap();

        let artifact = generator.generate_model_proto(&TypeKey::new("app::Travels")).unwrap();
        assert!(artifact.unwrap().content.contains("message Trips {"));

        let doc = SchemaDocument::new("app", Vec::<String>::new());
        let err = generator.append_metadata(doc, "Trips").unwrap_err();
        assert!(matches!(err, ProtoError::ModelStructure(_)));
    }

    #[test]
    fn test_failed_pass_names_the_root_type() {
        let source = DescriptorSource::from_descriptors([TypeDescriptor::message("app::Broken")
            .with_markers(model_markers("broken"))
            .with_property(PropertyDescriptor::new("items", DeclaredType::erased(ContainerKind::List)))]);
        let generator = ProtoGenerator::builder(source)
            .with_data_types(Vec::<TypeKey>::new())
            .build([TypeKey::new("app::Broken")])
            .unwrap();

        let err = generator.generate_model_protos().unwrap_err();
        assert!(matches!(err, ProtoError::Generation { ref type_name, .. } if type_name == "app::Broken"));
        assert!(matches!(err.root_cause(), ProtoError::MissingGenericInfo { .. }));
    }

    #[test]
    fn test_data_types_document_keeps_own_packages() {
        let generator = ProtoGenerator::builder(travels_source())
            .build([TypeKey::new("org::acme::travels::Travels")])
            .unwrap();
        let doc = generator
            .proto_of_data_types("org.acme", &["import \"kogito-types.proto\";".to_string()])
            .unwrap();

        let traveller = doc.messages().next().unwrap();
        assert_eq!(traveller.name, "Traveller");
        assert_eq!(traveller.package, "org.acme.travels");
        assert_eq!(traveller.comment, None);
    }

    #[test]
    fn test_parallel_generation_keeps_model_order() {
        let mut descriptors = Vec::new();
        let mut models = Vec::new();
        for i in 0..16 {
            let key = format!("app::Model{i}");
            descriptors.push(
                TypeDescriptor::message(key.as_str())
                    .with_markers(model_markers(&format!("process{i}")))
                    .with_property(PropertyDescriptor::new("id", DeclaredType::scalar(ScalarKind::String))),
            );
            models.push(TypeKey::new(key));
        }
        let generator = ProtoGenerator::builder(DescriptorSource::from_descriptors(descriptors))
            .build(models)
            .unwrap();

        let names: Vec<_> = generator
            .generate_model_protos()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        let expected: Vec<_> = (0..16).map(|i| format!("app/process{i}/process{i}.proto")).collect();
        assert_eq!(names, expected);
    }
}
