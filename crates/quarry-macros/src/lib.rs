//! Derive macros for quarry.
//!
//! - [`Entity`]: generates `Shape` and `Entity` from `#[query(...)]` fields
//! - [`Projectable`]: generates `Projectable` so a type can receive projections
//!
//! These are re-exported by `quarry` behind its `derive` feature; depend on
//! that rather than on this crate directly.

mod entity;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Shape` and `Entity` for a struct with named fields.
///
/// Only fields carrying a kind in `#[query(...)]` become queryable members.
/// For each one an associated constant in SCREAMING_SNAKE_CASE holds the
/// member name.
///
/// # Field Attributes
///
/// | Attribute | Member kind | Field type needs |
/// |-----------|-------------|------------------|
/// | `#[query(String)]` | string | `AsRef<str>` via `&String` |
/// | `#[query(Number)]` | number | `Into<quarry::Number>` |
/// | `#[query(Timestamp)]` | timestamp | `quarry::AsTimestamp` |
/// | `#[query(Enum)]` | enum | `quarry::Discriminant` |
/// | `#[query(Bool)]` | bool | `bool` |
/// | `#[query(skip)]` | - | field is left out |
///
/// `rename = "..."` changes the member name. `ty = "..."` spells the kind as
/// a string, for kinds that clash with keywords.
///
/// # Example
///
/// ```ignore
/// use quarry::{Entity, Predicate};
///
/// #[derive(Entity)]
/// struct Task {
///     #[query(String)]
///     title: String,
///     #[query(Number)]
///     priority: u8,
///     #[query(Bool, rename = "is_done")]
///     done: bool,
///     internal_id: u64,
/// }
///
/// let open: Predicate<Task> = Predicate::new("t", |t| t.member(Task::IS_DONE).equals(false));
/// ```
#[proc_macro_derive(Entity, attributes(query))]
pub fn entity_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::entity_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `Projectable` for a struct with named fields.
///
/// Every field with a `#[query(...)]` kind can be assigned by a projection.
/// Its type must implement `quarry::FromValue`. The type also needs `Shape`
/// and `Default`, usually from `#[derive(Entity, Default)]`.
///
/// ```ignore
/// #[derive(Default, Entity, Projectable)]
/// struct TaskSummary {
///     #[query(String)]
///     title: String,
///     #[query(Number)]
///     priority: u8,
/// }
/// ```
#[proc_macro_derive(Projectable, attributes(query))]
pub fn projectable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::projectable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
