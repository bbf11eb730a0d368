//! Quarry - Store-agnostic query specifications and predicate surgery.
//!
//! Quarry lets callers describe *what* data they want as a reusable value and
//! leaves *how* to fetch it to a backing-store [`Driver`]. A specification
//! carries:
//!
//! - Filters: boolean predicates, ANDed together
//! - Ordering: selector and direction pairs, primary key first
//! - Search: `%` wildcard terms over string members, ORed together
//! - Projection: member mappings onto a result type
//! - Paging and store hints
//!
//! Predicates and selectors are expression trees ([`Expr`]) wrapped in
//! single-parameter lambdas ([`Lambda`]). Trees are immutable; combining two
//! predicates rebinds one onto the other's parameter instead of mutating
//! either.
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{Entity, Field, Number, Predicate, Query, Selector, Shape, Specification,
//!              Value, ValueKind};
//!
//! struct Task {
//!     name: String,
//!     priority: i64,
//!     archived: bool,
//! }
//!
//! impl Shape for Task {
//!     const FIELDS: &'static [Field] = &[
//!         Field::new("name", ValueKind::String),
//!         Field::new("priority", ValueKind::Number),
//!         Field::new("archived", ValueKind::Bool),
//!     ];
//! }
//!
//! impl Entity for Task {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "name" => Value::String(&self.name),
//!             "priority" => Value::Number(Number::I64(self.priority)),
//!             "archived" => Value::Bool(self.archived),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! let query = Query::<Task>::new()
//!     .filter(Predicate::new("t", |t| t.member("priority").gte(3)))
//!     .filter(Predicate::new("t", |t| t.member("archived").equals(false)))
//!     .order_desc(Selector::member("priority"))
//!     .take(20);
//!
//! let task = Task { name: "Fix bug".into(), priority: 5, archived: false };
//! assert!(query.is_satisfied_by(&task).unwrap());
//!
//! let predicate = query.predicate().unwrap().unwrap();
//! assert_eq!(predicate.to_string(), "|t| (t.priority >= 3) && (t.archived == false)");
//! ```
//!
//! # Predicate Surgery
//!
//! [`ConditionRemover`] strips one conjunct out of a compiled predicate, such
//! as a store's automatic row filter. Conditions are compared semantically
//! with [`equivalent`]: `x.deleted == false` and `!x.deleted` are the same
//! condition.
//!
//! # Derive Macros
//!
//! With the `derive` feature, `#[derive(Entity, Projectable)]` generates the
//! shape traits from struct fields annotated with `#[query(...)]`.

mod compare;
mod driver;
mod error;
mod eval;
mod expr;
mod filter;
mod lambda;
mod literal;
mod merge;
mod op;
mod ordering;
mod query;
mod remove;
mod search;
mod select;
mod traits;
mod value;

// Re-export public API
pub use compare::{equivalent, normalize};
pub use driver::Driver;
pub use error::{QueryError, Result};
pub use expr::{lit, Expr, MemberBinding, Param};
pub use filter::WhereBuilder;
pub use lambda::{Lambda, Predicate, Selector};
pub use literal::Literal;
pub use merge::{combine, merge};
pub use op::{BinaryOp, LogicalOp, TextOp};
pub use ordering::{compare_values, Dir, OrderBuilder, OrderCriterion};
pub use query::{Criteria, ProjectedQuery, Query, QueryHints, Specification, Transform};
pub use remove::{ConditionRemover, Removal};
pub use search::{SearchBuilder, SearchCriterion, SearchPattern};
pub use select::{Projection, ProjectionMapping, SelectBuilder};
pub use traits::{AsTimestamp, Discriminant, Entity, Field, FromValue, Projectable, Shape};
pub use value::{Number, Timestamp, Value, ValueKind};

#[cfg(feature = "derive")]
pub use quarry_macros::{Entity, Projectable};
