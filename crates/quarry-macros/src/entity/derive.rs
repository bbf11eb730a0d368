//! Code generation for the `Entity` and `Projectable` derives.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Ident, Result, Type};

use super::attrs::{parse_query_attrs, FieldKind};

/// A field that takes part in queries.
struct Member<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    name: String,
    kind: FieldKind,
}

/// Collects the annotated, non-skipped fields of a named-field struct.
fn members<'a>(input: &'a DeriveInput, derive: &str) -> Result<Vec<Member<'a>>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    format!("{derive} can only be derived for structs with named fields"),
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                format!("{derive} can only be derived for structs"),
            ))
        }
    };

    let mut members = Vec::new();
    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;
        let attr = parse_query_attrs(&field.attrs)?;
        let Some(kind) = attr.kind.filter(|_| !attr.skip) else {
            continue;
        };
        members.push(Member {
            ident,
            ty: &field.ty,
            name: attr.rename.unwrap_or_else(|| ident.to_string()),
            kind,
        });
    }
    Ok(members)
}

/// Generates `Shape`, `Entity` and member name constants.
pub fn entity_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let members = members(&input, "Entity")?;

    let constants = members.iter().map(|m| {
        let const_name = format_ident!("{}", to_screaming_snake_case(&m.name));
        let name = &m.name;
        quote! {
            /// Member name for building queries.
            pub const #const_name: &'static str = #name;
        }
    });

    let fields = members.iter().map(|m| {
        let name = &m.name;
        let variant = format_ident!("{}", m.kind.variant());
        quote! { ::quarry::Field::new(#name, ::quarry::ValueKind::#variant) }
    });

    let arms = members.iter().map(|m| {
        let name = &m.name;
        let ident = m.ident;
        let value = match m.kind {
            FieldKind::String => quote! { ::quarry::Value::String(&self.#ident) },
            FieldKind::Number => quote! {
                ::quarry::Value::Number(::quarry::Number::from(self.#ident))
            },
            FieldKind::Timestamp => quote! {
                ::quarry::Value::Timestamp(::quarry::AsTimestamp::as_timestamp(&self.#ident))
            },
            FieldKind::Enum => quote! {
                ::quarry::Value::Enum(::quarry::Discriminant::discriminant(&self.#ident))
            },
            FieldKind::Bool => quote! { ::quarry::Value::Bool(self.#ident) },
        };
        quote! { #name => #value, }
    });

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*
        }

        impl #impl_generics ::quarry::Shape for #struct_name #ty_generics #where_clause {
            const FIELDS: &'static [::quarry::Field] = &[#(#fields),*];
        }

        impl #impl_generics ::quarry::Entity for #struct_name #ty_generics #where_clause {
            fn field_value(&self, field: &str) -> ::quarry::Value<'_> {
                match field {
                    #(#arms)*
                    _ => ::quarry::Value::None,
                }
            }
        }
    })
}

/// Generates `Projectable::set_field` over the annotated members.
pub fn projectable_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let members = members(&input, "Projectable")?;

    let arms = members.iter().map(|m| {
        let name = &m.name;
        let ident = m.ident;
        let ty = m.ty;
        quote! {
            #name => match <#ty as ::quarry::FromValue>::from_value(&value) {
                ::core::option::Option::Some(v) => {
                    self.#ident = v;
                    true
                }
                ::core::option::Option::None => false,
            },
        }
    });

    Ok(quote! {
        impl #impl_generics ::quarry::Projectable for #struct_name #ty_generics #where_clause {
            fn set_field(&mut self, field: &str, value: ::quarry::Value<'_>) -> bool {
                match field {
                    #(#arms)*
                    _ => false,
                }
            }
        }
    })
}

/// `createdAt` and `created_at` both become `CREATED_AT`.
fn to_screaming_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;

    for c in s.chars() {
        if c == '_' || c == '-' {
            out.push('_');
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c);
            prev_lower = false;
        } else {
            out.push(c.to_ascii_uppercase());
            prev_lower = true;
        }
    }

    out
}
