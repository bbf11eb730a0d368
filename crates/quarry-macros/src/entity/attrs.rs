//! Parsing of `#[query(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Ident, Lit, LitStr, Meta, Result, Token,
};

/// Kind of a queryable member, mirroring `quarry::ValueKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
}

impl FieldKind {
    fn from_name(name: &str, span: Span) -> Result<Self> {
        match name {
            "String" | "string" => Ok(FieldKind::String),
            "Number" | "number" => Ok(FieldKind::Number),
            "Timestamp" | "timestamp" => Ok(FieldKind::Timestamp),
            "Enum" | "enum" | "enumeration" => Ok(FieldKind::Enum),
            "Bool" | "bool" | "boolean" => Ok(FieldKind::Bool),
            other => Err(Error::new(
                span,
                format!(
                    "unknown query kind '{other}', expected String, Number, Timestamp, Enum or Bool"
                ),
            )),
        }
    }

    /// Path of the matching `ValueKind` variant.
    pub fn variant(self) -> &'static str {
        match self {
            FieldKind::String => "String",
            FieldKind::Number => "Number",
            FieldKind::Timestamp => "Timestamp",
            FieldKind::Enum => "Enum",
            FieldKind::Bool => "Bool",
        }
    }
}

/// Everything `#[query(...)]` can say about one field.
#[derive(Debug, Clone, Default)]
pub struct QueryAttr {
    pub kind: Option<FieldKind>,
    pub skip: bool,
    /// Member name used in queries, when it differs from the field name.
    pub rename: Option<String>,
}

fn string_value(value: &syn::Expr, what: &str) -> Result<LitStr> {
    match value {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(Error::new(
            other.span(),
            format!("{what} must be a string literal"),
        )),
    }
}

impl Parse for QueryAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = QueryAttr::default();
        let items: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in items {
            match &meta {
                Meta::Path(path) if path.is_ident("skip") => attr.skip = true,
                Meta::Path(path) => {
                    let ident: &Ident = path.get_ident().ok_or_else(|| {
                        Error::new(path.span(), "expected a query kind or `skip`")
                    })?;
                    attr.kind = Some(FieldKind::from_name(&ident.to_string(), ident.span())?);
                }
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    attr.rename = Some(string_value(&nv.value, "rename")?.value());
                }
                // `ty = "enum"` spells kinds that are Rust keywords
                Meta::NameValue(nv) if nv.path.is_ident("ty") => {
                    let lit = string_value(&nv.value, "ty")?;
                    attr.kind = Some(FieldKind::from_name(&lit.value(), lit.span())?);
                }
                other => {
                    return Err(Error::new(
                        other.span(),
                        "unsupported query attribute, expected a kind, skip, rename = \"..\" or ty = \"..\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Reads the `#[query(...)]` attribute of a field, if any.
pub fn parse_query_attrs(attrs: &[Attribute]) -> Result<QueryAttr> {
    match attrs.iter().find(|a| a.path().is_ident("query")) {
        Some(attr) => attr.parse_args::<QueryAttr>(),
        None => Ok(QueryAttr::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &str) -> Result<QueryAttr> {
        syn::parse_str::<QueryAttr>(tokens)
    }

    #[test]
    fn kinds_by_ident() {
        assert_eq!(parse("String").unwrap().kind, Some(FieldKind::String));
        assert_eq!(parse("number").unwrap().kind, Some(FieldKind::Number));
        assert_eq!(parse("Timestamp").unwrap().kind, Some(FieldKind::Timestamp));
        assert_eq!(parse("Enum").unwrap().kind, Some(FieldKind::Enum));
        assert_eq!(parse("Bool").unwrap().kind, Some(FieldKind::Bool));
        assert_eq!(parse("boolean").unwrap().kind, Some(FieldKind::Bool));
    }

    #[test]
    fn keyword_kinds_via_ty() {
        assert_eq!(parse(r#"ty = "enum""#).unwrap().kind, Some(FieldKind::Enum));
        assert_eq!(parse(r#"ty = "bool""#).unwrap().kind, Some(FieldKind::Bool));
    }

    #[test]
    fn skip() {
        let attr = parse("skip").unwrap();
        assert!(attr.skip);
        assert_eq!(attr.kind, None);
    }

    #[test]
    fn rename_with_kind() {
        let attr = parse(r#"String, rename = "full_name""#).unwrap();
        assert_eq!(attr.kind, Some(FieldKind::String));
        assert_eq!(attr.rename.as_deref(), Some("full_name"));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = parse("Decimal").unwrap_err();
        assert!(err.to_string().contains("unknown query kind 'Decimal'"));
    }

    #[test]
    fn rename_needs_a_string() {
        assert!(parse("rename = 3").is_err());
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(parse(r#"alias = "x""#).is_err());
    }
}
