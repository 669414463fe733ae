//! Integration tests for the ProtoSchema derive macro.
//!
//! Derived types are registered with a `ReflectiveSource` and run through
//! the generator, so these tests cover the generated impls end to end.

#![allow(dead_code)]

use protoschema::{
    DeclaredType, Introspect, ProtoError, ProtoGenerator, Reflect, ReflectiveSource, SchemaSource,
    TypeKey, TypeShape,
};
use protoschema_macros::ProtoSchema;

mod travels {
    use super::ProtoSchema;

    #[derive(ProtoSchema)]
    #[proto(package = "org.acme.travels", reference = "travels")]
    pub struct Travels {
        pub id: String,
        pub traveller: Traveller,
        #[proto(tags = "input")]
        pub flights: Vec<Flight>,
        #[proto(transient)]
        pub scratch: Vec<u8>,
    }

    #[derive(ProtoSchema)]
    #[proto(package = "org.acme.travels")]
    pub struct Traveller {
        pub first_name: String,
        pub nationality: Option<String>,
    }

    #[derive(ProtoSchema)]
    #[proto(package = "org.acme.travels")]
    pub struct Flight {
        pub number: String,
        pub status: FlightStatus,
    }

    #[derive(ProtoSchema)]
    pub enum FlightStatus {
        Scheduled,
        #[proto(number = 5)]
        Delayed,
        Landed,
    }
}

use travels::{Flight, FlightStatus, Traveller, Travels};

fn travels_source() -> ReflectiveSource {
    let mut source = ReflectiveSource::new();
    source.register::<Travels>();
    source
}

// =============================================================================
// Reflection
// =============================================================================

#[test]
fn test_type_key_follows_module_path() {
    assert_eq!(
        Travels::type_key(),
        TypeKey::new("integration_tests::travels::Travels")
    );
    assert_eq!(
        <Traveller as Reflect>::declared_type(),
        DeclaredType::named("integration_tests::travels::Traveller")
    );
}

#[test]
fn test_register_reaches_nested_types() {
    let source = travels_source();
    assert_eq!(source.len(), 4);
    assert!(source.contains(&Flight::type_key()));
    assert!(source.contains(&FlightStatus::type_key()));
}

#[test]
fn test_descriptor_markers() {
    let descriptor = Travels::descriptor();
    assert_eq!(descriptor.package, "org.acme.travels");
    assert!(descriptor.markers.model_root);
    assert_eq!(descriptor.markers.reference.as_deref(), Some("travels"));

    let TypeShape::Message { properties } = &descriptor.shape else {
        panic!("expected message");
    };
    assert_eq!(properties.len(), 4);
    assert_eq!(properties[2].markers.tags.as_deref(), Some("input"));
    assert!(properties[3].modifiers.is_transient);
}

#[test]
fn test_enum_without_package_uses_module_path() {
    let descriptor = FlightStatus::descriptor();
    assert!(descriptor.is_enum());
    assert_eq!(descriptor.package, "integration_tests.travels");
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn test_model_proto_from_derived_types() {
    let generator = ProtoGenerator::builder(travels_source())
        .build([Travels::type_key()])
        .unwrap();

    assert_eq!(
        generator.data_types(),
        &[Traveller::type_key(), Flight::type_key()]
    );
    let ids: Vec<_> = generator.process_ids().unwrap().into_iter().collect();
    assert_eq!(ids, vec!["travels".to_string()]);

    let artifacts = generator.generate_model_protos().unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].name, "org/acme/travels/travels/travels.proto");

    let base = "@Field(index = Index.NO, store = Store.YES) @SortableField";
    let indexed = "@Field(index = Index.YES, store = Store.YES) @SortableField";
    let expected = format!(
        "syntax = \"proto2\";\n\
         package org.acme.travels.travels;\n\
         import \"kogito-index.proto\";\n\
         import \"kogito-types.proto\";\n\
         option kogito_model = \"Travels\";\n\
         option kogito_id = \"travels\";\n\
         \n\
         enum FlightStatus {{\n    Scheduled = 0;\n    Delayed = 5;\n    Landed = 1;\n}}\n\
         \n\
         /* @Indexed */\n\
         message Traveller {{\n    /* {base} */\n    optional string first_name = 1;\n    /* {base} */\n    optional string nationality = 2;\n}}\n\
         \n\
         /* @Indexed */\n\
         message Flight {{\n    /* {base} */\n    optional string number = 1;\n    /* {base} */\n    optional FlightStatus status = 2;\n}}\n\
         \n\
         /* @Indexed */\n\
         message Travels {{\n    /* {indexed} */\n    optional string id = 1;\n    /* {base} */\n    optional Traveller traveller = 2;\n    /* {base}\n @VariableInfo(tags=\"input\") */\n    repeated Flight flights = 3;\n    /* {base} */\n    optional org.kie.kogito.index.model.KogitoMetadata metadata = 4;\n}}\n"
    );
    assert_eq!(artifacts[0].content, expected);
}

#[test]
fn test_self_referencing_type() {
    #[derive(ProtoSchema)]
    #[proto(package = "app")]
    struct Category {
        name: String,
        parent: Option<Box<Category>>,
        children: Vec<Category>,
    }

    let mut source = ReflectiveSource::new();
    source.register::<Category>();
    assert_eq!(source.len(), 1);

    let generator = ProtoGenerator::builder(source)
        .build([Category::type_key()])
        .unwrap();
    let doc = generator
        .proto_of_data_types("app", &[])
        .unwrap();
    assert_eq!(doc.message_count(), 1);
    let text = doc.to_string();
    assert!(text.contains("    optional Category parent = 2;\n"));
    assert!(text.contains("    repeated Category children = 3;\n"));
}

#[test]
fn test_hidden_field_type_omitted() {
    #[derive(ProtoSchema)]
    #[proto(hidden)]
    struct Secret {
        value: String,
    }

    #[derive(ProtoSchema)]
    #[proto(package = "app", reference = "vault")]
    struct Vault {
        id: String,
        secret: Secret,
        label: String,
    }

    let mut source = ReflectiveSource::new();
    source.register::<Vault>();
    let generator = ProtoGenerator::builder(source)
        .build([Vault::type_key()])
        .unwrap();

    let artifact = generator
        .generate_model_proto(&Vault::type_key())
        .unwrap()
        .unwrap();
    assert!(!artifact.content.contains("secret"));
    assert!(artifact.content.contains("optional string label = 2;"));
}

#[test]
fn test_interface_field_is_resolution_error() {
    trait Payment {}

    #[derive(ProtoSchema)]
    #[proto(package = "app", reference = "checkout")]
    struct Checkout {
        id: String,
        payment: Box<dyn Payment>,
    }

    let mut source = ReflectiveSource::new();
    source.register::<Checkout>();
    let generator = ProtoGenerator::builder(source)
        .build([Checkout::type_key()])
        .unwrap();

    let err = generator
        .generate_model_proto(&Checkout::type_key())
        .unwrap_err();
    assert!(err.root_cause().is_type_resolution());
    assert!(matches!(err, ProtoError::Generation { .. }));
}

#[test]
fn test_unregistered_type_is_introspection_error() {
    let source = ReflectiveSource::new();
    let err = source.describe(&Travels::type_key()).unwrap_err();
    assert!(matches!(err, ProtoError::Introspection { .. }));
}

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_rename_rules_and_explicit_names() {
    #[derive(ProtoSchema)]
    #[proto(package = "app", name = "Trip", rename_all = "camelCase")]
    struct Journey {
        start_date: String,
        #[proto(rename = "destination")]
        end_city: String,
    }

    let mut source = ReflectiveSource::new();
    source.register::<Journey>();
    let generator = ProtoGenerator::builder(source)
        .build([Journey::type_key()])
        .unwrap();
    let text = generator
        .proto_of_data_types("app", &[])
        .unwrap()
        .to_string();

    assert!(text.contains("message Trip {"));
    assert!(text.contains("optional string startDate = 1;"));
    assert!(text.contains("optional string destination = 2;"));
}

#[test]
fn test_serde_attributes_respected() {
    #[derive(ProtoSchema)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    #[proto(package = "app")]
    enum Priority {
        Low,
        VeryHigh,
        #[serde(skip)]
        Unset,
    }

    let descriptor = Priority::descriptor();
    let TypeShape::Enum { values } = &descriptor.shape else {
        panic!("expected enum");
    };
    let names: Vec<_> = values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Low", "VeryHigh"]);

    let mut source = ReflectiveSource::new();
    source.register::<Priority>();
    let generator = ProtoGenerator::builder(source)
        .with_data_types([Priority::type_key()])
        .build(Vec::<TypeKey>::new())
        .unwrap();
    let text = generator
        .proto_of_data_types("app", &[])
        .unwrap()
        .to_string();
    assert!(text.contains("enum Priority {\n    LOW = 0;\n    VERY_HIGH = 1;\n}\n"));
}
