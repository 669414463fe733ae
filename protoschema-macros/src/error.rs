//! Error type of the derive macro.

use proc_macro2::{Span, TokenStream};
use thiserror::Error;

/// Error raised while parsing a type for `#[derive(ProtoSchema)]`.
#[derive(Debug, Error)]
pub enum DeriveError {
    /// Malformed `#[proto(...)]` attributes or an unsupported shape.
    #[error("invalid proto attributes: {0}")]
    Attributes(#[from] darling::Error),

    /// A construct the derive cannot describe.
    #[error("{message}")]
    Unsupported {
        message: String,
        span: Span,
        suggestion: Option<String>,
    },
}

impl DeriveError {
    pub fn unsupported(span: Span, message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
            span,
            suggestion: None,
        }
    }

    /// Attach a hint shown below the error.
    pub fn with_suggestion(self, hint: impl Into<String>) -> Self {
        match self {
            Self::Unsupported { message, span, .. } => Self::Unsupported {
                message,
                span,
                suggestion: Some(hint.into()),
            },
            other => other,
        }
    }

    /// Render as compiler errors.
    pub fn into_compile_error(self) -> TokenStream {
        match self {
            Self::Attributes(error) => error.write_errors(),
            Self::Unsupported {
                message,
                span,
                suggestion,
            } => {
                let mut error = syn::Error::new(span, message);
                if let Some(hint) = suggestion {
                    error.combine(syn::Error::new(span, format!("help: {hint}")));
                }
                error.to_compile_error()
            }
        }
    }
}
