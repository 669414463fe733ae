//! Integration tests for protoschema-cli.
//!
//! These run the scan, parse, generate and write steps end to end against
//! the fixture project and temporary projects.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use protoschema::{
    DeclaredType, DescriptorSource, PropertyDescriptor, ScalarKind, TypeDescriptor, TypeKey,
    TypeMarkers,
};
use protoschema_cli::{
    config::{Config, ConfigManager},
    error::{CliError, ParseError},
    generator::SchemaGenerator,
    parser::{ParsedType, RustParser},
    scanner::SourceScanner,
    writer::{CheckResult, FileWriter},
};

fn fixture_project() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/travels")
}

fn create_temp_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn parse_project(root: &std::path::Path, crate_name: &str) -> Vec<ParsedType> {
    let files = SourceScanner::new(root).scan().unwrap();
    let (types, errors) = RustParser::new(crate_name).parse_files(&files);
    assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
    types
}

fn travels_config() -> Config {
    let mut config = Config::default();
    config.input.crate_name = Some("travels".to_string());
    config
}

// =============================================================================
// Scanning and Parsing
// =============================================================================

#[test]
fn test_fixture_types_and_keys() {
    let types = parse_project(&fixture_project(), "travels");
    let mut keys: Vec<String> = types.iter().map(|t| t.key.to_string()).collect();
    keys.sort();

    assert_eq!(
        keys,
        vec![
            "travels::model::Address",
            "travels::model::Flight",
            "travels::model::Traveller",
            "travels::model::Travels",
            "travels::status::FlightStatus",
        ]
    );
}

#[test]
fn test_scanner_respects_gitignore() {
    let dir = create_temp_project(&[
        (".gitignore", "generated/\n"),
        ("src/lib.rs", "#[derive(ProtoSchema)] pub struct Kept { pub id: String }"),
        (
            "generated/old.rs",
            "#[derive(ProtoSchema)] pub struct Ignored { pub id: String }",
        ),
    ]);

    let types = parse_project(dir.path(), "app");
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].key, TypeKey::new("app::Kept"));
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn test_fixture_model_proto() {
    let types = parse_project(&fixture_project(), "travels");
    let output = SchemaGenerator::new(travels_config()).generate(&types).unwrap();

    assert_eq!(output.model_types, vec![TypeKey::new("travels::model::Travels")]);
    assert_eq!(output.artifacts.len(), 1);

    let artifact = &output.artifacts[0];
    assert_eq!(artifact.name, "travels/model/travels/travels.proto");

    let base = "@Field(index = Index.NO, store = Store.YES) @SortableField";
    let indexed = "@Field(index = Index.YES, store = Store.YES) @SortableField";
    let expected = format!(
        "syntax = \"proto2\";\n\
         package travels.model.travels;\n\
         import \"kogito-index.proto\";\n\
         import \"kogito-types.proto\";\n\
         option kogito_model = \"Travels\";\n\
         option kogito_id = \"travels\";\n\
         \n\
         enum FlightStatus {{\n    Scheduled = 0;\n    Boarding = 1;\n    Departed = 10;\n    Cancelled = 2;\n}}\n\
         \n\
         /* @Indexed */\n\
         message Address {{\n    /* {base} */\n    optional string city = 1;\n    /* {base} */\n    optional string country = 2;\n}}\n\
         \n\
         /* @Indexed */\n\
         message Traveller {{\n    /* {base} */\n    optional string first_name = 1;\n    /* {base} */\n    optional string last_name = 2;\n    /* {base} */\n    optional Address address = 3;\n}}\n\
         \n\
         /* @Indexed */\n\
         message Flight {{\n    /* {base} */\n    optional string number = 1;\n    /* {base} */\n    optional kogito.Instant departure = 2;\n    /* {base} */\n    optional FlightStatus status = 3;\n}}\n\
         \n\
         /* @Indexed */\n\
         message Travels {{\n    /* {indexed} */\n    optional string id = 1;\n    /* {base} */\n    optional Traveller traveller = 2;\n    /* {base} */\n    repeated Flight flights = 3;\n    /* {base}\n @VariableInfo(tags=\"output\") */\n    optional bool approved = 4;\n    /* {base} */\n    optional org.kie.kogito.index.model.KogitoMetadata metadata = 5;\n}}\n"
    );
    assert_eq!(artifact.content, expected);
}

#[test]
fn test_generation_is_deterministic() {
    let types = parse_project(&fixture_project(), "travels");
    let generator = SchemaGenerator::new(travels_config());

    let first = generator.generate(&types).unwrap();
    let second = generator.generate(&types).unwrap();
    assert_eq!(first.artifacts, second.artifacts);
}

#[test]
fn test_keys_rooted_at_manifest_package_name() {
    let dir = create_temp_project(&[
        (
            "Cargo.toml",
            "[package]\nname = \"travel-agency\"\nversion = \"0.1.0\"\nedition = \"2021\"\n",
        ),
        (
            "src/model.rs",
            "#[derive(ProtoSchema)]\npub struct Traveller { pub name: String }\n",
        ),
    ]);

    let crate_name = Config::default().crate_name_for(dir.path());
    let types = parse_project(dir.path(), &crate_name);
    assert_eq!(types[0].key.as_str(), "travel_agency::model::Traveller");
}

#[test]
fn test_config_file_drives_generation() {
    let dir = create_temp_project(&[(
        "protoschema.toml",
        r#"
[input]
crate_name = "travels"

[output]
data_types_file = "travels-data"
data_types_package = "org.acme.travels"

[proto]
syntax = "proto3"
"#,
    )]);
    let config = ConfigManager::load(Some(&dir.path().join("protoschema.toml"))).unwrap();
    let types = parse_project(&fixture_project(), &config.crate_name_for(&fixture_project()));

    let output = SchemaGenerator::new(config).generate(&types).unwrap();
    assert_eq!(output.artifacts.len(), 2);
    assert!(output.artifacts[0].content.contains("    string id = 1;\n"));

    let data = &output.artifacts[1];
    assert_eq!(data.name, "org/acme/travels/travels-data.proto");
    assert!(data.content.starts_with("syntax = \"proto3\";\npackage org.acme.travels;\n"));
    assert!(data.content.contains("message Traveller {"));
    assert!(data.content.contains("message Flight {"));
    assert!(data.content.contains("enum FlightStatus {"));
}

#[test]
fn test_descriptor_file_adds_model_type() {
    let booking = TypeDescriptor::message("legacy::Booking")
        .with_package("org.acme.legacy")
        .with_markers(TypeMarkers {
            reference: Some("booking".to_string()),
            model_root: true,
            ..Default::default()
        })
        .with_property(PropertyDescriptor::new(
            "id",
            DeclaredType::scalar(ScalarKind::String),
        ));
    let json = DescriptorSource::from_descriptors([booking]).to_json().unwrap();
    let dir = create_temp_project(&[("descriptors/legacy.json", &json)]);

    let mut config = travels_config();
    config.input.descriptors = vec![dir.path().join("descriptors/legacy.json")];

    let types = parse_project(&fixture_project(), "travels");
    let output = SchemaGenerator::new(config).generate(&types).unwrap();

    let names: Vec<_> = output.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "org/acme/legacy/booking/booking.proto",
            "travels/model/travels/travels.proto"
        ]
    );
}

#[test]
fn test_parse_errors_reported_per_file() {
    let dir = create_temp_project(&[
        ("src/lib.rs", "#[derive(ProtoSchema)] pub struct Fine { pub id: String }"),
        ("src/broken.rs", "pub struct Broken { id String }"),
    ]);
    let files = SourceScanner::new(dir.path()).scan().unwrap();
    let (types, errors) = RustParser::new("app").parse_files(&files);

    assert_eq!(types.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ParseError::Syntax { .. }));
}

#[test]
fn test_interface_field_fails_generation() {
    let dir = create_temp_project(&[(
        "src/lib.rs",
        r#"
        #[derive(ProtoSchema)]
        #[proto(reference = "payments")]
        pub struct Payment {
            pub id: String,
            pub method: Box<dyn PaymentMethod>,
        }
        "#,
    )]);
    let types = parse_project(dir.path(), "app");

    let err = SchemaGenerator::new(Config::default()).generate(&types).unwrap_err();
    match err {
        CliError::Generate(e) => {
            assert!(e.root_cause().is_type_resolution());
            assert!(e.to_string().contains("app::Payment"));
        }
        other => panic!("expected generation error, got {other}"),
    }
}

#[test]
fn test_hidden_model_writes_nothing() {
    let dir = create_temp_project(&[(
        "src/lib.rs",
        r#"
        #[derive(ProtoSchema)]
        #[proto(reference = "internal", hidden)]
        pub struct Internal {
            pub id: String,
        }
        "#,
    )]);
    let types = parse_project(dir.path(), "app");

    let output = SchemaGenerator::new(Config::default()).generate(&types).unwrap();
    assert_eq!(output.model_types.len(), 1);
    assert!(output.is_empty());
}

// =============================================================================
// Writing and Validation
// =============================================================================

#[test]
fn test_write_then_validate() {
    let out = TempDir::new().unwrap();
    let types = parse_project(&fixture_project(), "travels");
    let output = SchemaGenerator::new(travels_config()).generate(&types).unwrap();

    let writer = FileWriter::new(out.path(), false);
    let results = writer.write_all(&output.artifacts).unwrap();
    assert!(results.iter().all(|r| r.was_written()));
    assert!(out.path().join("travels/model/travels/travels.proto").exists());

    assert!(writer.check(&output.artifacts).iter().all(CheckResult::is_up_to_date));

    fs::write(out.path().join("travels/model/travels/travels.proto"), "stale").unwrap();
    let results = writer.check(&output.artifacts);
    assert!(matches!(results[0], CheckResult::Outdated(_)));
}

#[test]
fn test_dry_run_leaves_output_empty() {
    let out = TempDir::new().unwrap();
    let types = parse_project(&fixture_project(), "travels");
    let output = SchemaGenerator::new(travels_config()).generate(&types).unwrap();

    let results = FileWriter::new(out.path(), true)
        .write_all(&output.artifacts)
        .unwrap();
    assert!(results.iter().all(|r| !r.was_written()));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_process_ids_of_fixture() {
    let types = parse_project(&fixture_project(), "travels");
    let ids = SchemaGenerator::new(travels_config()).process_ids(&types).unwrap();
    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["travels".to_string()]);
}
