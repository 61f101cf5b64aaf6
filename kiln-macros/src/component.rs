//! `#[derive(Component)]` expansion.

use darling::ast::{Data, Style};
use darling::util::PathList;
use darling::{FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, GenericArgument, Generics, Ident, Lit, PathArguments, Type, TypeParamBound};

#[derive(FromDeriveInput)]
#[darling(attributes(component), supports(struct_any))]
struct ComponentInput {
    ident: Ident,
    generics: Generics,
    data: Data<(), ComponentField>,
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    implements: PathList,
}

#[derive(FromField)]
#[darling(attributes(component))]
struct ComponentField {
    ident: Option<Ident>,
    ty: Type,
    #[darling(default)]
    inject: Option<String>,
    #[darling(default)]
    optional: bool,
    #[darling(default)]
    hint: Option<Lit>,
}

impl ComponentField {
    /// Marked `optional`, or typed `Option<..>`.
    fn is_optional(&self) -> bool {
        self.optional || is_option(&self.ty)
    }
}

pub fn derive_component_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(error) => error.write_errors(),
    }
}

fn expand(input: &DeriveInput) -> darling::Result<TokenStream> {
    let parsed = ComponentInput::from_derive_input(input)?;
    if !parsed.generics.params.is_empty() {
        return Err(
            darling::Error::custom("#[derive(Component)] does not support generic types")
                .with_span(&parsed.generics),
        );
    }

    let ident = parsed.ident;
    let identity = parsed.name.unwrap_or_else(|| ident.to_string());
    let Some(fields) = parsed.data.take_struct() else {
        return Err(darling::Error::unsupported_shape("enum").with_span(&ident));
    };

    let mut errors = darling::Error::accumulator();
    for field in &fields.fields {
        if let Some(lit) = &field.hint {
            if !matches!(lit, Lit::Str(_) | Lit::Int(_) | Lit::Float(_) | Lit::Bool(_)) {
                errors.push(
                    darling::Error::custom("hint must be a string, integer, float or bool")
                        .with_span(lit),
                );
            }
        }
    }
    errors.finish()?;

    let params = fields.fields.iter().map(|field| {
        let hint = match field.inject.clone().or_else(|| wire_name(&field.ty)) {
            Some(name) => quote!(::std::option::Option::Some(#name)),
            None => quote!(::std::option::Option::None),
        };
        if field.is_optional() {
            quote!(.optional_param(#hint))
        } else {
            quote!(.param(#hint))
        }
    });

    let annotations = fields.fields.iter().enumerate().filter_map(|(position, field)| {
        field.hint.as_ref().map(|lit| quote!(.annotate(#position, #lit)))
    });

    let casts = parsed.implements.iter().map(|path| {
        let capability = path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default();
        quote! {
            .implements::<dyn #path>(
                #capability,
                |component: ::std::sync::Arc<Self>| -> ::std::sync::Arc<dyn #path> { component },
            )
        }
    });

    let values = fields.fields.iter().enumerate().map(|(position, field)| {
        let value = if field.is_optional() {
            quote!(args.get_or_default(#position)?)
        } else {
            quote!(args.get(#position)?)
        };
        match &field.ident {
            Some(name) => quote!(#name: #value),
            None => value,
        }
    });

    let constructor = match fields.style {
        Style::Struct => quote!(|args| ::std::result::Result::Ok(Self { #(#values),* })),
        Style::Tuple => quote!(|args| ::std::result::Result::Ok(Self( #(#values),* ))),
        Style::Unit => quote!(|_| ::std::result::Result::Ok(Self)),
    };

    Ok(quote! {
        impl ::kiln::shape::Component for #ident {
            fn shape() -> ::kiln::shape::ComponentShape {
                ::kiln::shape::ComponentShape::builder::<Self>(#identity)
                    #(#params)*
                    #(#annotations)*
                    #(#casts)*
                    .constructor(#constructor)
                    .build()
            }
        }

        ::kiln::__private::inventory::submit! {
            ::kiln::catalog::ShapeEntry::new(<#ident as ::kiln::shape::Component>::shape)
        }
    })
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    type_path
        .path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Option")
}

/// Auto-wiring hint for a field type: the last path segment inside `Arc<..>`.
fn wire_name(ty: &Type) -> Option<String> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    match arguments.args.first()? {
        GenericArgument::Type(Type::Path(inner)) => {
            inner.path.segments.last().map(|s| s.ident.to_string())
        }
        GenericArgument::Type(Type::TraitObject(object)) => {
            object.bounds.iter().find_map(|bound| match bound {
                TypeParamBound::Trait(bound) => {
                    bound.path.segments.last().map(|s| s.ident.to_string())
                }
                _ => None,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn wire_name_reads_arc_targets() {
        assert_eq!(wire_name(&parse_quote!(Arc<Config>)), Some("Config".into()));
        assert_eq!(
            wire_name(&parse_quote!(std::sync::Arc<crate::mail::Config>)),
            Some("Config".into())
        );
        assert_eq!(
            wire_name(&parse_quote!(Arc<dyn Transport + Send>)),
            Some("Transport".into())
        );
        assert_eq!(wire_name(&parse_quote!(String)), None);
        assert_eq!(wire_name(&parse_quote!(Box<Config>)), None);
    }

    #[test]
    fn expands_shape_and_inventory_submission() {
        let input: DeriveInput = parse_quote! {
            #[component(name = "Outbox", implements(Transport))]
            struct Mailer {
                transport: Arc<dyn Transport>,
                #[component(optional, hint = 3)]
                retries: u32,
            }
        };

        let expanded = derive_component_impl(input).to_string();
        assert!(expanded.contains("\"Outbox\""));
        assert!(expanded.contains("\"Transport\""));
        assert!(expanded.contains("optional_param"));
        assert!(expanded.contains("annotate"));
        assert!(expanded.contains("ShapeEntry"));
        assert!(!expanded.contains("compile_error"));
    }

    #[test]
    fn option_fields_are_optional() {
        assert!(is_option(&parse_quote!(Option<String>)));
        assert!(is_option(&parse_quote!(std::option::Option<Arc<Config>>)));
        assert!(!is_option(&parse_quote!(Arc<Config>)));

        let input: DeriveInput = parse_quote! {
            struct Greeting {
                text: Option<String>,
            }
        };
        let expanded = derive_component_impl(input).to_string();
        assert!(expanded.contains("optional_param"));
        assert!(expanded.contains("get_or_default"));
    }

    #[test]
    fn unit_struct_has_no_params() {
        let input: DeriveInput = parse_quote! {
            struct Sendmail;
        };

        let expanded = derive_component_impl(input).to_string();
        assert!(!expanded.contains("param"));
        assert!(expanded.contains("\"Sendmail\""));
    }

    #[test]
    fn generics_are_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Cache<T> {
                inner: T,
            }
        };

        assert!(derive_component_impl(input).to_string().contains("compile_error"));
    }

    #[test]
    fn enums_are_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Mode { Fast, Slow }
        };

        assert!(derive_component_impl(input).to_string().contains("compile_error"));
    }

    #[test]
    fn unsupported_hint_literal_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Clock {
                #[component(hint = 'x')]
                zone: char,
            }
        };

        assert!(derive_component_impl(input).to_string().contains("compile_error"));
    }
}
