//! Semantic comparison of expression trees.
//!
//! Two predicates built independently rarely come out node-for-node identical.
//! One says `deleted == false`, the other says `!deleted`, or one of them went
//! through a quoting step. [`equivalent`] looks past those differences in
//! four steps:
//!
//! 1. [`Expr::reduce`] inlines reducible wrappers;
//! 2. [`normalize`] rewrites comparisons against boolean constants;
//! 3. the normalized trees are compared structurally;
//! 4. failing that, their rendered text is compared.
//!
//! # Limitation
//!
//! Step 4 is an approximation, not a proof of equivalence. The renderer
//! prints chains of one associative operator flat, so regrouping an AND chain
//! is tolerated. Reordered operands (`a && b` against `b && a`) and
//! redistributed AND/OR groups are still judged different.

use std::sync::Arc;

use crate::expr::Expr;
use crate::literal::Literal;
use crate::op::BinaryOp;

/// Rewrites comparisons with boolean constants, recursively.
///
/// `x == true` and `x != false` become `x`; `x == false` and `x != true`
/// become `!x`. The constant may sit on either side.
pub fn normalize(expr: &Expr) -> Expr {
    expr.rewrite(&|node: Expr| match node {
        Expr::Binary { op, left, right } if matches!(op, BinaryOp::Eq | BinaryOp::Ne) => {
            match (bool_constant(&right), bool_constant(&left)) {
                (Some(b), _) => against_constant(op, left, b),
                (None, Some(b)) => against_constant(op, right, b),
                (None, None) => Expr::Binary { op, left, right },
            }
        }
        other => other,
    })
}

fn bool_constant(expr: &Expr) -> Option<bool> {
    match expr {
        Expr::Constant(Literal::Bool(b)) => Some(*b),
        _ => None,
    }
}

fn against_constant(op: BinaryOp, operand: Arc<Expr>, constant: bool) -> Expr {
    let keep = (op == BinaryOp::Eq) == constant;
    if keep {
        (*operand).clone()
    } else {
        Expr::Not(operand)
    }
}

/// Decides whether two expression bodies denote the same condition.
///
/// Both bodies must already use the same parameter; see
/// [`Lambda::is_equivalent`](crate::Lambda::is_equivalent) for comparing
/// whole lambdas.
pub fn equivalent(a: &Expr, b: &Expr) -> bool {
    let a = normalize(&a.reduce());
    let b = normalize(&b.reduce());
    a == b || a.to_string() == b.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{lit, Param};

    fn x() -> Expr {
        Expr::param(&Param::new("x"))
    }

    #[test]
    fn normalizes_true_comparisons() {
        let x = x();
        let deleted = x.member("deleted");
        assert_eq!(normalize(&deleted.clone().equals(true)), deleted);
        assert_eq!(normalize(&deleted.clone().not_equals(false)), deleted);
        assert_eq!(normalize(&lit(true).equals(deleted.clone())), deleted);
    }

    #[test]
    fn normalizes_false_comparisons() {
        let x = x();
        let deleted = x.member("deleted");
        let negated = deleted.clone().negate();
        assert_eq!(normalize(&deleted.clone().equals(false)), negated);
        assert_eq!(normalize(&deleted.clone().not_equals(true)), negated);
        assert_eq!(normalize(&lit(false).equals(deleted)), negated);
    }

    #[test]
    fn normalizes_nested() {
        let x = x();
        let e = x
            .member("deleted")
            .equals(false)
            .and(x.member("age").gt(3).equals(true));
        let expected = x.member("deleted").negate().and(x.member("age").gt(3));
        assert_eq!(normalize(&e), expected);
    }

    #[test]
    fn leaves_other_comparisons() {
        let x = x();
        let e = x.member("age").equals(3);
        assert_eq!(normalize(&e), e);
    }

    #[test]
    fn equivalent_through_normalization_and_quotes() {
        let x = x();
        let a = x.member("deleted").equals(false);
        let b = x.member("deleted").quote().negate();
        assert!(equivalent(&a, &b));
    }

    #[test]
    fn equivalent_by_text_fallback() {
        let x = x();
        // I64(5) and U64(5) differ structurally but render the same
        let a = x.member("age").equals(5i64);
        let b = x.member("age").equals(5u64);
        assert_ne!(a, b);
        assert!(equivalent(&a, &b));
    }

    #[test]
    fn reordered_operands_are_not_equivalent() {
        let x = x();
        let p = x.member("a").equals(1);
        let q = x.member("b").equals(2);
        assert!(!equivalent(&p.clone().and(q.clone()), &q.and(p)));
    }

    #[test]
    fn distinct_conditions() {
        let x = x();
        assert!(!equivalent(&x.member("age").gt(3), &x.member("age").gte(3)));
    }
}
