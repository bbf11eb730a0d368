//! Removing one conjunct from a compiled predicate.
//!
//! Stores often apply an automatic row filter, such as "not soft-deleted" or
//! "belongs to the current tenant". An escape-hatch query wants that filter
//! minus one condition. [`ConditionRemover`] takes the compiled filter plus
//! the condition, built the same way the filter was, and excises it.
//!
//! The search only follows the AndAlso spine from the root. A condition
//! nested under an OR, a NOT or anything else is not found, and the
//! predicate comes back unchanged as [`Removal::NotFound`].

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::compare::equivalent;
use crate::error::Result;
use crate::expr::Expr;
use crate::lambda::Predicate;
use crate::op::BinaryOp;
use crate::traits::Shape;

/// Outcome of a removal.
pub enum Removal<T> {
    /// The whole predicate was the condition. Nothing is left to enforce.
    Collapsed,
    /// The condition was excised. This is what remains.
    Removed(Predicate<T>),
    /// The condition was not found on the AND spine. This is the unchanged
    /// predicate. It does not prove the condition is absent.
    NotFound(Predicate<T>),
}

impl<T> Clone for Removal<T> {
    fn clone(&self) -> Self {
        match self {
            Removal::Collapsed => Removal::Collapsed,
            Removal::Removed(p) => Removal::Removed(p.clone()),
            Removal::NotFound(p) => Removal::NotFound(p.clone()),
        }
    }
}

impl<T> PartialEq for Removal<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Removal::Collapsed, Removal::Collapsed) => true,
            (Removal::Removed(a), Removal::Removed(b)) => a == b,
            (Removal::NotFound(a), Removal::NotFound(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> fmt::Debug for Removal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Removal::Collapsed => f.write_str("Collapsed"),
            Removal::Removed(p) => f.debug_tuple("Removed").field(p).finish(),
            Removal::NotFound(p) => f.debug_tuple("NotFound").field(p).finish(),
        }
    }
}

impl<T> Removal<T> {
    /// The predicate to apply afterwards, `None` when nothing remains.
    pub fn into_predicate(self) -> Option<Predicate<T>> {
        match self {
            Removal::Collapsed => None,
            Removal::Removed(p) | Removal::NotFound(p) => Some(p),
        }
    }
}

/// Strips a condition out of a compiled predicate.
///
/// ```
/// use quarry::{merge, ConditionRemover, Predicate};
/// # use quarry::{Entity, Field, Shape, Value, ValueKind};
/// # struct Order;
/// # impl Shape for Order {
/// #     const FIELDS: &'static [Field] = &[
/// #         Field::new("deleted", ValueKind::Bool),
/// #         Field::new("tenant", ValueKind::Number),
/// #     ];
/// # }
/// # impl Entity for Order { fn field_value(&self, _: &str) -> Value<'_> { Value::None } }
///
/// let not_deleted: Predicate<Order> = Predicate::new("o", |o| o.member("deleted").equals(false));
/// let tenant: Predicate<Order> = Predicate::new("o", |o| o.member("tenant").equals(7));
/// let row_filter = merge(&not_deleted, &tenant).unwrap();
///
/// // the condition is built separately, and spelled differently
/// let soft_delete: Predicate<Order> = Predicate::new("e", |e| e.member("deleted").negate());
///
/// let remaining = ConditionRemover::remove(&row_filter, &soft_delete).unwrap().unwrap();
/// assert!(remaining.is_equivalent(&tenant));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionRemover;

impl ConditionRemover {
    /// Removes `condition` from `predicate`.
    ///
    /// Returns `None` when the whole predicate was the condition, and
    /// otherwise the remaining predicate. That includes the unchanged input
    /// when the condition was not found.
    pub fn remove<T: Shape>(
        predicate: &Predicate<T>,
        condition: &Predicate<T>,
    ) -> Result<Option<Predicate<T>>> {
        Ok(Self::try_remove(predicate, condition)?.into_predicate())
    }

    /// Like [`ConditionRemover::remove`], but tells "removed" apart from
    /// "not found".
    pub fn try_remove<T: Shape>(
        predicate: &Predicate<T>,
        condition: &Predicate<T>,
    ) -> Result<Removal<T>> {
        predicate.ensure_predicate()?;
        condition.ensure_predicate()?;

        if predicate.is_equivalent(condition) {
            debug!(predicate = %predicate, "condition covers the whole predicate");
            return Ok(Removal::Collapsed);
        }

        let target = condition.body_for(predicate.param());
        match excise(predicate.body(), &target) {
            Some(body) => {
                let remaining = Predicate::from_parts(predicate.param().clone(), body);
                debug!(condition = %condition, remaining = %remaining, "condition removed");
                Ok(Removal::Removed(remaining))
            }
            None => {
                debug!(
                    condition = %condition,
                    predicate = %predicate,
                    "condition not found on the AND spine"
                );
                Ok(Removal::NotFound(predicate.clone()))
            }
        }
    }
}

/// Walks the AndAlso spine looking for `target`.
///
/// At each AndAlso node the left side is tested first, then the right. A
/// matching side is dropped and its sibling takes the node's place. The
/// first hit ends the walk. Quote wrappers on the spine are looked through
/// and dropped from the result.
fn excise(expr: &Expr, target: &Expr) -> Option<Expr> {
    if let Expr::Quote(inner) = expr {
        return excise(inner, target);
    }
    let Expr::Binary {
        op: BinaryOp::AndAlso,
        left,
        right,
    } = expr
    else {
        return None;
    };

    if equivalent(left, target) {
        return Some((**right).clone());
    }
    if equivalent(right, target) {
        return Some((**left).clone());
    }

    if let Some(left) = excise(left, target) {
        return Some(Expr::Binary {
            op: BinaryOp::AndAlso,
            left: Arc::new(left),
            right: Arc::clone(right),
        });
    }
    excise(right, target).map(|right| Expr::Binary {
        op: BinaryOp::AndAlso,
        left: Arc::clone(left),
        right: Arc::new(right),
    })
}
