//! `#[derive(Entity)]` and `#[derive(Projectable)]`.
//!
//! Both derives read the same `#[query(...)]` field attributes, so a struct
//! deriving both exposes and accepts exactly the same members.

mod attrs;
mod derive;

pub use derive::{entity_derive_impl, projectable_derive_impl};
