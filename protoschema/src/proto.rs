//! In-memory schema document.
//!
//! A [`SchemaDocument`] owns every [`Message`] and [`ProtoEnum`] it contains
//! in two arenas. Fields point at other entities through [`MessageId`] and
//! [`EnumId`], so self-referencing and mutually referencing types need no
//! shared ownership.
//!
//! Messages are reserved in the arena when their resolution starts and
//! committed once all fields are in place. Only committed messages are part
//! of the document's output order.

use std::fmt;

/// Index of a message in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(usize);

/// Index of an enum in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(usize);

/// Proto language level of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Syntax {
    #[default]
    Proto2,
    Proto3,
}

impl Syntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
        }
    }
}

impl std::str::FromStr for Syntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proto2" => Ok(Syntax::Proto2),
            "proto3" => Ok(Syntax::Proto3),
            other => Err(format!("unknown proto syntax '{other}'")),
        }
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Singular,
    Optional,
    Repeated,
}

impl Cardinality {
    /// Label written before the field type. Empty for proto3 singular fields.
    pub fn label(&self, syntax: Syntax) -> &'static str {
        match (self, syntax) {
            (Cardinality::Repeated, _) => "repeated",
            (Cardinality::Optional, _) => "optional",
            (Cardinality::Singular, Syntax::Proto2) => "optional",
            (Cardinality::Singular, Syntax::Proto3) => "",
        }
    }
}

/// Type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// A scalar keyword or any externally defined type name.
    Named(String),
    /// A message of the same document.
    Message(MessageId),
    /// An enum of the same document.
    Enum(EnumId),
}

/// A message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub cardinality: Cardinality,
    pub comment: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            ty,
            cardinality,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
}

/// A message definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub package: String,
    pub fields: Vec<Field>,
    pub comment: Option<String>,
}

impl Message {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            fields: Vec::new(),
            comment: None,
        }
    }

    /// Append a field, keeping discovery order. Field names are unique.
    pub fn add_field(&mut self, field: Field) -> Result<(), String> {
        if self.field(&field.name).is_some() {
            return Err(format!(
                "duplicate field name '{}' in message '{}'",
                field.name, self.name
            ));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

/// An enum definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoEnum {
    pub name: String,
    pub package: String,
    pub values: Vec<EnumValue>,
}

impl ProtoEnum {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            values: Vec::new(),
        }
    }

    /// Ordinal of a value.
    pub fn number(&self, name: &str) -> Option<i32> {
        self.values.iter().find(|v| v.name == name).map(|v| v.number)
    }
}

/// A schema document under construction or ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDocument {
    package: String,
    syntax: Syntax,
    headers: Vec<String>,
    primary: Option<String>,
    messages: Vec<Message>,
    enums: Vec<ProtoEnum>,
    message_order: Vec<MessageId>,
}

impl SchemaDocument {
    /// Create an empty document.
    pub fn new<I, H>(package: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        Self {
            package: package.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Set the name the rendered artifact is called after.
    pub fn with_primary(mut self, primary: impl Into<String>) -> Self {
        self.primary = Some(primary.into());
        self
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    // -------------------------------------------------------------------------
    // Messages
    // -------------------------------------------------------------------------

    /// Reserve an arena slot for a message whose fields are not resolved yet.
    pub fn reserve_message(&mut self, name: impl Into<String>, package: impl Into<String>) -> MessageId {
        self.messages.push(Message::new(name, package));
        MessageId(self.messages.len() - 1)
    }

    /// Add a reserved message to the document's output.
    ///
    /// Fails when another committed message or an enum already uses the name.
    pub fn commit_message(&mut self, id: MessageId) -> Result<(), String> {
        let name = &self.messages[id.0].name;
        if self.message_order.contains(&id) {
            return Ok(());
        }
        if self.find_message(name).is_some() || self.find_enum(name).is_some() {
            return Err(format!("duplicate definition name '{name}' in package '{}'", self.package));
        }
        self.message_order.push(id);
        Ok(())
    }

    /// Reserve and commit a message in one step.
    pub fn add_message(&mut self, message: Message) -> Result<MessageId, String> {
        self.messages.push(message);
        let id = MessageId(self.messages.len() - 1);
        self.commit_message(id)?;
        Ok(id)
    }

    pub fn message(&self, id: MessageId) -> &Message {
        &self.messages[id.0]
    }

    pub fn message_mut(&mut self, id: MessageId) -> &mut Message {
        &mut self.messages[id.0]
    }

    /// Committed messages in commit order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.message_order.iter().map(|id| &self.messages[id.0])
    }

    /// Committed message ids in commit order.
    pub fn message_ids(&self) -> &[MessageId] {
        &self.message_order
    }

    /// Find a committed message by name.
    pub fn find_message(&self, name: &str) -> Option<MessageId> {
        self.message_order
            .iter()
            .copied()
            .find(|id| self.messages[id.0].name == name)
    }

    // -------------------------------------------------------------------------
    // Enums
    // -------------------------------------------------------------------------

    /// Add a complete enum.
    pub fn add_enum(&mut self, proto_enum: ProtoEnum) -> Result<EnumId, String> {
        if self.find_message(&proto_enum.name).is_some() || self.find_enum(&proto_enum.name).is_some() {
            return Err(format!(
                "duplicate definition name '{}' in package '{}'",
                proto_enum.name, self.package
            ));
        }
        self.enums.push(proto_enum);
        Ok(EnumId(self.enums.len() - 1))
    }

    pub fn proto_enum(&self, id: EnumId) -> &ProtoEnum {
        &self.enums[id.0]
    }

    /// Enums in insertion order.
    pub fn enums(&self) -> impl Iterator<Item = &ProtoEnum> {
        self.enums.iter()
    }

    /// Find an enum by name.
    pub fn find_enum(&self, name: &str) -> Option<EnumId> {
        self.enums.iter().position(|e| e.name == name).map(EnumId)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Name a field type refers to.
    pub fn type_name<'a>(&'a self, ty: &'a FieldType) -> &'a str {
        match ty {
            FieldType::Named(name) => name,
            FieldType::Message(id) => &self.messages[id.0].name,
            FieldType::Enum(id) => &self.enums[id.0].name,
        }
    }

    /// Number of committed messages.
    pub fn message_count(&self) -> usize {
        self.message_order.len()
    }

    /// Number of enums.
    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    /// Check if the document defines nothing.
    pub fn is_empty(&self) -> bool {
        self.message_order.is_empty() && self.enums.is_empty()
    }
}

impl fmt::Display for SchemaDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::render_text(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_message_is_not_output_until_committed() {
        let mut doc = SchemaDocument::new("app", Vec::<String>::new());
        let id = doc.reserve_message("Order", "app");
        assert_eq!(doc.message_count(), 0);
        assert!(doc.find_message("Order").is_none());

        doc.commit_message(id).unwrap();
        assert_eq!(doc.find_message("Order"), Some(id));
        assert_eq!(doc.messages().count(), 1);
    }

    #[test]
    fn test_commit_twice_is_noop() {
        let mut doc = SchemaDocument::new("app", Vec::<String>::new());
        let id = doc.reserve_message("Order", "app");
        doc.commit_message(id).unwrap();
        doc.commit_message(id).unwrap();
        assert_eq!(doc.message_count(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut doc = SchemaDocument::new("app", Vec::<String>::new());
        doc.add_message(Message::new("Order", "app")).unwrap();
        assert!(doc.add_message(Message::new("Order", "other")).is_err());
        assert!(doc.add_enum(ProtoEnum::new("Order", "app")).is_err());
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let mut order = Message::new("Order", "app");
        let string = || FieldType::Named("string".into());
        order.add_field(Field::new("id", string(), Cardinality::Singular)).unwrap();
        order.add_field(Field::new("code", string(), Cardinality::Singular)).unwrap();

        let err = order
            .add_field(Field::new("id", string(), Cardinality::Repeated))
            .unwrap_err();
        assert_eq!(err, "duplicate field name 'id' in message 'Order'");
        assert_eq!(order.fields.len(), 2);
    }

    #[test]
    fn test_type_name_follows_ids() {
        let mut doc = SchemaDocument::new("app", Vec::<String>::new());
        let message = doc.add_message(Message::new("Order", "app")).unwrap();
        let status = doc.add_enum(ProtoEnum::new("Status", "app")).unwrap();

        assert_eq!(doc.type_name(&FieldType::Message(message)), "Order");
        assert_eq!(doc.type_name(&FieldType::Enum(status)), "Status");
        assert_eq!(doc.type_name(&FieldType::Named("string".into())), "string");
    }

    #[test]
    fn test_cardinality_labels() {
        assert_eq!(Cardinality::Singular.label(Syntax::Proto2), "optional");
        assert_eq!(Cardinality::Singular.label(Syntax::Proto3), "");
        assert_eq!(Cardinality::Repeated.label(Syntax::Proto3), "repeated");
    }
}
