//! Parameter-unifying combination of predicates.
//!
//! Two predicates built separately each close over their own parameter.
//! Gluing their bodies together as-is would leave the right-hand body
//! pointing at a parameter the new lambda does not bind. Merging picks the
//! left parameter as canonical and substitutes it into the right body before
//! joining the two.

use tracing::trace;

use crate::error::Result;
use crate::expr::Expr;
use crate::lambda::Predicate;
use crate::op::LogicalOp;
use crate::traits::Shape;

/// Joins two predicates with a logical connective under one shared parameter.
///
/// Fails with `InvalidArgument` if either side is not a boolean predicate.
pub fn combine<T: Shape>(
    left: &Predicate<T>,
    right: &Predicate<T>,
    op: LogicalOp,
) -> Result<Predicate<T>> {
    left.ensure_predicate()?;
    right.ensure_predicate()?;

    let param = left.param().clone();
    let right_body = right.body_for(&param);
    trace!(op = ?op, left = %left, right = %right, "combining predicates");

    let body = Expr::binary(op.into(), left.body().clone(), right_body);
    Ok(Predicate::from_parts(param, body))
}

/// Conjunction of two predicates: `left && right`.
///
/// ```
/// use quarry::{merge, Predicate};
/// # use quarry::{Entity, Field, Shape, Value, ValueKind};
/// # struct Person;
/// # impl Shape for Person {
/// #     const FIELDS: &'static [Field] = &[
/// #         Field::new("age", ValueKind::Number),
/// #         Field::new("deleted", ValueKind::Bool),
/// #     ];
/// # }
/// # impl Entity for Person { fn field_value(&self, _: &str) -> Value<'_> { Value::None } }
///
/// let adult: Predicate<Person> = Predicate::new("a", |a| a.member("age").gte(18));
/// let live: Predicate<Person> = Predicate::new("b", |b| b.member("deleted").equals(false));
///
/// let both = merge(&adult, &live).unwrap();
/// assert_eq!(both.to_string(), "|a| (a.age >= 18) && (a.deleted == false)");
/// ```
pub fn merge<T: Shape>(left: &Predicate<T>, right: &Predicate<T>) -> Result<Predicate<T>> {
    combine(left, right, LogicalOp::And)
}
