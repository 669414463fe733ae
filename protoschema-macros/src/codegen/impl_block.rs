//! Impl block generation.
//!
//! A derived type gets two impls:
//!
//! - `Reflect`: the type appears as a named reference, and registering it
//!   registers every type reachable from its fields.
//! - `Introspect`: the type key and the full descriptor.

use proc_macro2::TokenStream;
use quote::quote;

use crate::ir::{FieldIR, FieldReflection, SchemaIR, SchemaKind, VariantIR};

/// Generates the impl blocks for a parsed type.
#[derive(Debug, Default)]
pub struct ImplBlockGenerator;

impl ImplBlockGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate both impl blocks for `schema`.
    pub fn generate(&self, schema: &SchemaIR) -> TokenStream {
        let reflect = self.generate_reflect(schema);
        let introspect = self.generate_introspect(schema);
        quote! {
            #reflect
            #introspect
        }
    }

    fn generate_reflect(&self, schema: &SchemaIR) -> TokenStream {
        let ident = &schema.ident;
        let registrations = match &schema.kind {
            SchemaKind::Message(fields) => fields
                .iter()
                .filter(|field| field.reflection == FieldReflection::Reflect)
                .map(|field| {
                    let ty = &field.ty;
                    quote!(<#ty as ::protoschema::Reflect>::register(source);)
                })
                .collect(),
            SchemaKind::Enum(_) => Vec::new(),
        };

        quote! {
            impl ::protoschema::Reflect for #ident {
                fn declared_type() -> ::protoschema::DeclaredType {
                    ::protoschema::DeclaredType::named(<Self as ::protoschema::Introspect>::type_key())
                }

                fn register(source: &mut ::protoschema::ReflectiveSource) {
                    if source.insert(
                        <Self as ::protoschema::Introspect>::type_key(),
                        <Self as ::protoschema::Introspect>::descriptor,
                    ) {
                        #(#registrations)*
                    }
                }
            }
        }
    }

    fn generate_introspect(&self, schema: &SchemaIR) -> TokenStream {
        let ident = &schema.ident;
        let name = ident.to_string();

        let constructor = if schema.is_enum() {
            quote!(::protoschema::TypeDescriptor::enumeration(Self::type_key()))
        } else {
            quote!(::protoschema::TypeDescriptor::message(Self::type_key()))
        };
        let package = schema
            .package
            .as_ref()
            .map(|package| quote!(.with_package(#package)));
        let markers = self.generate_type_markers(schema);
        let members: Vec<TokenStream> = match &schema.kind {
            SchemaKind::Message(fields) => fields.iter().map(|f| self.generate_property(f)).collect(),
            SchemaKind::Enum(variants) => variants.iter().map(|v| self.generate_value(v)).collect(),
        };

        quote! {
            impl ::protoschema::Introspect for #ident {
                fn type_key() -> ::protoschema::TypeKey {
                    ::protoschema::TypeKey::new(concat!(module_path!(), "::", #name))
                }

                fn descriptor() -> ::protoschema::TypeDescriptor {
                    #constructor
                        #package
                        .with_markers(#markers)
                        #(#members)*
                }
            }
        }
    }

    fn generate_type_markers(&self, schema: &SchemaIR) -> TokenStream {
        let rename = option_string(schema.rename.as_deref());
        let reference = option_string(schema.reference.as_deref());
        let hidden = schema.hidden;
        let model_root = schema.model_root;
        let rename_all = match schema.rename_all {
            Some(rule) => {
                let rule = rule.to_tokens();
                quote!(::std::option::Option::Some(#rule))
            }
            None => quote!(::std::option::Option::None),
        };

        quote! {
            ::protoschema::TypeMarkers {
                rename: #rename,
                hidden: #hidden,
                model_root: #model_root,
                reference: #reference,
                rename_all: #rename_all,
            }
        }
    }

    fn generate_property(&self, field: &FieldIR) -> TokenStream {
        let name = &field.name;
        let declared = match &field.reflection {
            FieldReflection::Reflect => {
                let ty = &field.ty;
                quote!(<#ty as ::protoschema::Reflect>::declared_type())
            }
            FieldReflection::Interface { name, optional } => {
                let interface = quote!(::protoschema::DeclaredType::interface(#name));
                if *optional {
                    quote!(::protoschema::DeclaredType::optional(#interface))
                } else {
                    interface
                }
            }
            FieldReflection::Opaque(type_name) => {
                quote!(::protoschema::DeclaredType::opaque(#type_name))
            }
        };

        let rename = option_string(field.rename.as_deref());
        let tags = option_string(field.tags.as_deref());
        let identity = field.identity;
        let transient = field.transient.then(|| quote!(.transient()));

        quote! {
            .with_property(
                ::protoschema::PropertyDescriptor::new(#name, #declared)
                    .with_markers(::protoschema::FieldMarkers {
                        rename: #rename,
                        identity: #identity,
                        tags: #tags,
                    })
                    #transient
            )
        }
    }

    fn generate_value(&self, variant: &VariantIR) -> TokenStream {
        let name = &variant.name;
        let number = variant.number.map(|number| quote!(.with_number(#number)));
        quote! {
            .with_value(::protoschema::EnumValueDescriptor::new(#name) #number)
        }
    }
}

fn option_string(value: Option<&str>) -> TokenStream {
    match value {
        Some(value) => quote!(::std::option::Option::Some(::std::string::String::from(#value))),
        None => quote!(::std::option::Option::None),
    }
}
