//! In-memory evaluation of expression trees against a single entity.
//!
//! This is what backs [`Lambda::matches`](crate::Lambda::matches) and the
//! local `is_satisfied_by` check. It is not a query executor: there is no
//! planning, just a direct walk of the tree.

use crate::expr::{Expr, Param};
use crate::op::BinaryOp;
use crate::ordering::compare_values;
use crate::traits::Entity;
use crate::value::Value;

impl Expr {
    /// Evaluates this expression with `param` bound to `item`.
    ///
    /// Member accesses on any other parameter, nested member accesses and
    /// construction nodes evaluate to [`Value::None`].
    pub fn evaluate<'a, T: Entity>(&'a self, param: &Param, item: &'a T) -> Value<'a> {
        match self {
            Expr::Constant(lit) => lit.as_value(),
            Expr::Parameter(_) | Expr::New { .. } => Value::None,
            Expr::Member { target, member } => match &**target {
                Expr::Parameter(p) if p == param => item.field_value(member),
                _ => Value::None,
            },
            Expr::Quote(inner) => inner.evaluate(param, item),
            Expr::Not(inner) => match inner.evaluate(param, item) {
                Value::Bool(b) => Value::Bool(!b),
                _ => Value::None,
            },
            Expr::Binary { op, left, right } => match op {
                BinaryOp::AndAlso => {
                    let pass = is_true(&left.evaluate(param, item))
                        && is_true(&right.evaluate(param, item));
                    Value::Bool(pass)
                }
                BinaryOp::OrElse => {
                    let pass = is_true(&left.evaluate(param, item))
                        || is_true(&right.evaluate(param, item));
                    Value::Bool(pass)
                }
                op => {
                    let l = left.evaluate(param, item);
                    let r = right.evaluate(param, item);
                    Value::Bool(compare(*op, &l, &r))
                }
            },
            Expr::Text {
                op,
                target,
                pattern,
                ignore_case,
            } => match target.evaluate(param, item) {
                Value::String(text) => Value::Bool(op.matches(text, pattern, *ignore_case)),
                _ => Value::Bool(false),
            },
        }
    }
}

fn is_true(value: &Value<'_>) -> bool {
    matches!(value, Value::Bool(true))
}

fn compare(op: BinaryOp, left: &Value<'_>, right: &Value<'_>) -> bool {
    match op {
        BinaryOp::Eq => left.loose_eq(right),
        BinaryOp::Ne => !left.loose_eq(right),
        _ => {
            // A missing value is never greater or smaller than anything
            if left.is_none() || right.is_none() {
                return false;
            }
            match compare_values(left, right) {
                Some(ordering) => op.eval_ordering(ordering),
                None => false,
            }
        }
    }
}
