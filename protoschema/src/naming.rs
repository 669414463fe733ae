//! Case conventions for property and enum value names.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rename rule for property and enum value name transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenameRule {
    /// camelCase
    #[serde(rename = "camelCase")]
    CamelCase,

    /// snake_case
    #[serde(rename = "snake_case")]
    SnakeCase,

    /// PascalCase
    #[serde(rename = "PascalCase")]
    PascalCase,

    /// SCREAMING_SNAKE_CASE
    #[serde(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnakeCase,
}

impl RenameRule {
    /// Apply the rename rule to a string.
    pub fn apply(&self, name: &str) -> String {
        use convert_case::{Case, Casing};

        match self {
            RenameRule::CamelCase => name.to_case(Case::Camel),
            RenameRule::SnakeCase => name.to_case(Case::Snake),
            RenameRule::PascalCase => name.to_case(Case::Pascal),
            RenameRule::ScreamingSnakeCase => name.to_case(Case::UpperSnake),
        }
    }

    /// The attribute spelling of this rule.
    pub fn as_str(&self) -> &'static str {
        match self {
            RenameRule::CamelCase => "camelCase",
            RenameRule::SnakeCase => "snake_case",
            RenameRule::PascalCase => "PascalCase",
            RenameRule::ScreamingSnakeCase => "SCREAMING_SNAKE_CASE",
        }
    }
}

impl FromStr for RenameRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camelCase" => Ok(RenameRule::CamelCase),
            "snake_case" => Ok(RenameRule::SnakeCase),
            "PascalCase" => Ok(RenameRule::PascalCase),
            "SCREAMING_SNAKE_CASE" => Ok(RenameRule::ScreamingSnakeCase),
            other => Err(format!(
                "unknown rename rule '{other}', expected one of camelCase, snake_case, PascalCase, SCREAMING_SNAKE_CASE"
            )),
        }
    }
}
