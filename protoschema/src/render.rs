//! Rendering of schema documents to `.proto` text.
//!
//! Output layout: syntax line, package, header directives in the order
//! supplied, then every enum, then every message. Messages appear in the
//! order their resolution completed, so a referenced type precedes the
//! message referring to it (cycles excepted). Field numbers are assigned
//! from 1 in field order. The same document always renders to the same
//! bytes.

use std::borrow::Cow;
use std::fmt::Write;

use tracing::debug;

use crate::proto::{Message, ProtoEnum, SchemaDocument};

/// Indentation of definitions' bodies.
const INDENT: &str = "    ";

/// A rendered schema ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Relative file name, e.g. `org/acme/orders/orders.proto`.
    pub name: String,
    pub content: String,
}

/// Render `doc` and name the resulting artifact.
pub fn render(doc: &SchemaDocument) -> GeneratedArtifact {
    let name = artifact_name(doc.package(), &primary_name(doc));
    let content = render_text(doc);
    debug!(artifact = %name, bytes = content.len(), "rendered schema document");
    GeneratedArtifact { name, content }
}

/// Artifact file name for a package and a primary type name.
pub fn artifact_name(package: &str, primary: &str) -> String {
    if package.is_empty() {
        format!("{primary}.proto")
    } else {
        format!("{}/{primary}.proto", package.replace('.', "/"))
    }
}

/// The name the artifact of `doc` is called after.
///
/// The explicit primary name if set, else the last completed message, else
/// the last enum.
pub fn primary_name(doc: &SchemaDocument) -> String {
    doc.primary()
        .map(str::to_string)
        .or_else(|| doc.messages().last().map(|m| m.name.clone()))
        .or_else(|| doc.enums().last().map(|e| e.name.clone()))
        .unwrap_or_else(|| "schema".to_string())
}

/// Render `doc` as `.proto` text.
pub fn render_text(doc: &SchemaDocument) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "syntax = \"{}\";", doc.syntax().as_str());
    if !doc.package().is_empty() {
        let _ = writeln!(out, "package {};", doc.package());
    }
    for header in doc.headers() {
        let _ = writeln!(out, "{header}");
    }

    for proto_enum in doc.enums() {
        out.push('\n');
        render_enum(&mut out, proto_enum);
    }

    for message in doc.messages() {
        out.push('\n');
        render_message(&mut out, doc, message);
    }

    out
}

fn render_enum(out: &mut String, proto_enum: &ProtoEnum) {
    let _ = writeln!(out, "enum {} {{", proto_enum.name);
    for value in &proto_enum.values {
        let _ = writeln!(out, "{INDENT}{} = {};", value.name, value.number);
    }
    out.push_str("}\n");
}

/// Comment text that cannot close its block comment early.
fn comment_text(comment: &str) -> Cow<'_, str> {
    if comment.contains("*/") {
        Cow::Owned(comment.replace("*/", "* /"))
    } else {
        Cow::Borrowed(comment)
    }
}

fn render_message(out: &mut String, doc: &SchemaDocument, message: &Message) {
    if let Some(comment) = &message.comment {
        let _ = writeln!(out, "/* {} */", comment_text(comment));
    }
    let _ = writeln!(out, "message {} {{", message.name);

    for (index, field) in message.fields.iter().enumerate() {
        if let Some(comment) = &field.comment {
            let _ = writeln!(out, "{INDENT}/* {} */", comment_text(comment));
        }
        let label = field.cardinality.label(doc.syntax());
        let type_name = doc.type_name(&field.ty);
        if label.is_empty() {
            let _ = writeln!(out, "{INDENT}{type_name} {} = {};", field.name, index + 1);
        } else {
            let _ = writeln!(out, "{INDENT}{label} {type_name} {} = {};", field.name, index + 1);
        }
    }

    out.push_str("}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{Cardinality, EnumValue, Field, FieldType, Syntax};

    fn sample() -> SchemaDocument {
        let mut doc = SchemaDocument::new("org.acme", ["import \"kogito-index.proto\";"]);
        let mut status = ProtoEnum::new("Status", "org.acme");
        status.values = vec![
            EnumValue {
                name: "OPEN".into(),
                number: 0,
            },
            EnumValue {
                name: "CLOSED".into(),
                number: 5,
            },
        ];
        let status = doc.add_enum(status).unwrap();

        let mut order = Message::new("Order", "org.acme");
        order.comment = Some("@Indexed".into());
        order.fields.push(
            Field::new("id", FieldType::Named("string".into()), Cardinality::Singular)
                .with_comment(Some("@Field(index = Index.YES)".into())),
        );
        order
            .fields
            .push(Field::new("status", FieldType::Enum(status), Cardinality::Optional));
        order.fields.push(Field::new(
            "tags",
            FieldType::Named("string".into()),
            Cardinality::Repeated,
        ));
        doc.add_message(order).unwrap();
        doc
    }

    #[test]
    fn test_render_layout() {
        let expected = "syntax = \"proto2\";\n\
                        package org.acme;\n\
                        import \"kogito-index.proto\";\n\
                        \n\
                        enum Status {\n    OPEN = 0;\n    CLOSED = 5;\n}\n\
                        \n\
                        /* @Indexed */\n\
                        message Order {\n    /* @Field(index = Index.YES) */\n    optional string id = 1;\n    optional Status status = 2;\n    repeated string tags = 3;\n}\n";
        assert_eq!(render_text(&sample()), expected);
    }

    #[test]
    fn test_proto3_singular_has_no_label() {
        let doc = sample().with_syntax(Syntax::Proto3);
        let text = render_text(&doc);
        assert!(text.starts_with("syntax = \"proto3\";"));
        assert!(text.contains("\n    string id = 1;\n"));
        assert!(text.contains("\n    optional Status status = 2;\n"));
    }

    #[test]
    fn test_comment_terminator_escaped() {
        let mut doc = SchemaDocument::new("org.acme", Vec::<String>::new());
        let mut order = Message::new("Order", "org.acme");
        order.comment = Some("@Indexed */ message Injected {".into());
        order.fields.push(
            Field::new("id", FieldType::Named("string".into()), Cardinality::Singular)
                .with_comment(Some("@VariableInfo(tags=\"a*/b\")".into())),
        );
        doc.add_message(order).unwrap();

        let text = render_text(&doc);
        assert!(text.contains("/* @Indexed * / message Injected { */\nmessage Order {\n"));
        assert!(text.contains("    /* @VariableInfo(tags=\"a* /b\") */\n    optional string id = 1;\n"));
        assert_eq!(text.matches("*/").count(), 2);
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(artifact_name("org.acme.orders", "orders"), "org/acme/orders/orders.proto");
        assert_eq!(artifact_name("", "Order"), "Order.proto");
    }

    #[test]
    fn test_primary_defaults_to_last_message() {
        let artifact = render(&sample());
        assert_eq!(artifact.name, "org/acme/Order.proto");

        let artifact = render(&sample().with_primary("orders"));
        assert_eq!(artifact.name, "org/acme/orders.proto");
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(&sample()), render(&sample()));
    }
}
