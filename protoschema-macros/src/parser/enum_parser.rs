//! Enum parsing.
//!
//! Unit-only enums map to proto enumerations. The ordinal of a variant comes
//! from `#[proto(number = N)]` or, failing that, an integer discriminant.

use darling::FromVariant;
use syn::{Data, DeriveInput, Expr, ExprLit, ExprUnary, Lit, UnOp};

use crate::error::DeriveError;
use crate::ir::{SchemaIR, SchemaKind, VariantIR};
use crate::parser::attributes::VariantAttrs;

#[cfg(feature = "serde-compat")]
use crate::parser::serde_compat::SerdeVariantAttrs;

/// Parses enum definitions into [`SchemaIR`].
pub struct EnumParser;

impl EnumParser {
    pub fn parse(input: &DeriveInput) -> Result<SchemaIR, DeriveError> {
        super::parse_container(input, || {
            let Data::Enum(data) = &input.data else {
                return Err(DeriveError::unsupported(input.ident.span(), "expected an enum"));
            };

            let mut variants = Vec::with_capacity(data.variants.len());
            for variant in &data.variants {
                if let Some(parsed) = Self::parse_variant(variant)? {
                    variants.push(parsed);
                }
            }
            Ok(SchemaKind::Enum(variants))
        })
    }

    /// `None` for skipped variants.
    fn parse_variant(variant: &syn::Variant) -> Result<Option<VariantIR>, DeriveError> {
        let attrs = VariantAttrs::from_variant(variant)?;

        #[cfg(feature = "serde-compat")]
        let skip = attrs.skip || SerdeVariantAttrs::from_attrs(&variant.attrs).skip;

        #[cfg(not(feature = "serde-compat"))]
        let skip = attrs.skip;

        if skip {
            return Ok(None);
        }

        let number = match (attrs.number, &attrs.discriminant) {
            (Some(number), _) => Some(number),
            (None, Some(expr)) => Some(discriminant_value(expr)?),
            (None, None) => None,
        };

        Ok(Some(VariantIR {
            name: attrs.ident.to_string(),
            number,
        }))
    }
}

/// Evaluate an integer literal discriminant, optionally negated.
fn discriminant_value(expr: &Expr) -> Result<i32, DeriveError> {
    let unsupported = || {
        DeriveError::unsupported(
            syn::spanned::Spanned::span(expr),
            "discriminant must be an integer literal",
        )
        .with_suggestion("use #[proto(number = N)] to set the ordinal explicitly")
    };

    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse::<i32>().map_err(|_| unsupported()),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => discriminant_value(expr).map(|value| -value),
        _ => Err(unsupported()),
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use quote::format_ident;

    proptest! {
        /// **Property 1: Explicit numbers survive parsing**
        ///
        /// Every `#[proto(number = N)]` reaches the IR unchanged, in variant order.
        #[test]
        fn prop_explicit_numbers_preserved(numbers in prop::collection::vec(0..=i32::MAX, 1..8)) {
            let variants = numbers.iter().enumerate().map(|(index, number)| {
                let ident = format_ident!("V{}", index);
                quote::quote!(#[proto(number = #number)] #ident)
            });
            let input: DeriveInput = syn::parse_quote! {
                enum Generated {
                    #(#variants,)*
                }
            };

            let ir = EnumParser::parse(&input).unwrap();
            let SchemaKind::Enum(parsed) = ir.kind else {
                panic!("expected enum");
            };
            let parsed: Vec<_> = parsed.iter().map(|v| v.number).collect();
            let expected: Vec<_> = numbers.into_iter().map(Some).collect();
            prop_assert_eq!(parsed, expected);
        }
    }
}
