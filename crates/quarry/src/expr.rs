//! Immutable expression trees.
//!
//! An [`Expr`] is a tagged union over the node kinds the engine understands.
//! Children are held in [`Arc`]s and never mutated: every rewrite (parameter
//! substitution, reduction, normalization, conjunct removal) returns a new
//! tree. That is what makes it safe to graft the body of one predicate into
//! another.
//!
//! Trees are normally built through the combinators on [`Expr`] inside
//! [`Lambda::new`](crate::Lambda::new):
//!
//! ```
//! use quarry::Predicate;
//! # use quarry::{Entity, Field, Shape, Value, ValueKind};
//! # struct Person;
//! # impl Shape for Person { const FIELDS: &'static [Field] = &[]; }
//! # impl Entity for Person { fn field_value(&self, _: &str) -> Value<'_> { Value::None } }
//!
//! let adults: Predicate<Person> = Predicate::new("p", |p| {
//!     p.member("age").gte(18).and(p.member("name").not_equals(""))
//! });
//! assert_eq!(adults.to_string(), r#"|p| (p.age >= 18) && (p.name != "")"#);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{QueryError, Result};
use crate::literal::Literal;
use crate::op::{BinaryOp, TextOp};
use crate::traits::Field;
use crate::value::{Timestamp, ValueKind};

/// A lambda parameter placeholder.
///
/// Identity is the identity of the allocation behind the name, not the name
/// itself: two parameters both called `x` are different parameters unless one
/// was cloned from the other.
#[derive(Clone)]
pub struct Param(Arc<str>);

impl Param {
    pub fn new(name: &str) -> Self {
        Param(Arc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Param {}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param({})", self.0)
    }
}

/// One member initializer of an [`Expr::New`] node.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberBinding {
    pub member: String,
    pub source: Expr,
}

/// Expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Literal),
    Parameter(Param),
    Member {
        target: Arc<Expr>,
        member: String,
    },
    Not(Arc<Expr>),
    Binary {
        op: BinaryOp,
        left: Arc<Expr>,
        right: Arc<Expr>,
    },
    /// String match of `target` against a fixed pattern.
    Text {
        op: TextOp,
        target: Arc<Expr>,
        pattern: String,
        ignore_case: bool,
    },
    /// Identity wrapper. Reducible: [`Expr::reduce`] inlines it.
    Quote(Arc<Expr>),
    /// Default-construct `shape`, then assign each binding.
    New {
        shape: &'static str,
        bindings: Vec<MemberBinding>,
    },
}

/// Shorthand for [`Expr::constant`].
pub fn lit(value: impl Into<Literal>) -> Expr {
    Expr::constant(value)
}

impl Expr {
    pub fn constant(value: impl Into<Literal>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn param(param: &Param) -> Self {
        Expr::Parameter(param.clone())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Arc::new(left),
            right: Arc::new(right),
        }
    }

    // ========================================================================
    // Combinators
    // ========================================================================

    /// Member access on this expression.
    pub fn member(&self, name: impl Into<String>) -> Expr {
        Expr::Member {
            target: Arc::new(self.clone()),
            member: name.into(),
        }
    }

    pub fn equals(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Eq, self, rhs.into())
    }

    pub fn not_equals(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Ne, self, rhs.into())
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Gt, self, rhs.into())
    }

    pub fn gte(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Gte, self, rhs.into())
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Lt, self, rhs.into())
    }

    pub fn lte(self, rhs: impl Into<Expr>) -> Expr {
        Expr::binary(BinaryOp::Lte, self, rhs.into())
    }

    pub fn and(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::AndAlso, self, rhs)
    }

    pub fn or(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::OrElse, self, rhs)
    }

    pub fn negate(self) -> Expr {
        Expr::Not(Arc::new(self))
    }

    pub fn quote(self) -> Expr {
        Expr::Quote(Arc::new(self))
    }

    pub fn text(self, op: TextOp, pattern: impl Into<String>, ignore_case: bool) -> Expr {
        Expr::Text {
            op,
            target: Arc::new(self),
            pattern: pattern.into(),
            ignore_case,
        }
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Expr {
        self.text(TextOp::StartsWith, prefix, false)
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Expr {
        self.text(TextOp::EndsWith, suffix, false)
    }

    pub fn contains(self, needle: impl Into<String>) -> Expr {
        self.text(TextOp::Contains, needle, false)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Returns the member name when this is a direct member access on a
    /// parameter, e.g. `c.name`.
    pub fn as_member_access(&self) -> Option<&str> {
        match self {
            Expr::Member { target, member } if matches!(**target, Expr::Parameter(_)) => {
                Some(member.as_str())
            }
            Expr::Quote(inner) => inner.as_member_access(),
            _ => None,
        }
    }

    /// Static kind of this expression against an entity's fields.
    ///
    /// Returns `None` when the kind cannot be determined: unknown members,
    /// bare parameters, `null` constants and construction nodes.
    pub fn kind(&self, fields: &[Field]) -> Option<ValueKind> {
        match self {
            Expr::Constant(lit) => lit.kind(),
            Expr::Parameter(_) | Expr::New { .. } => None,
            Expr::Member { target, member } => match **target {
                Expr::Parameter(_) => fields
                    .iter()
                    .find(|f| f.name == member.as_str())
                    .map(|f| f.kind),
                _ => None,
            },
            Expr::Not(_) | Expr::Binary { .. } | Expr::Text { .. } => Some(ValueKind::Bool),
            Expr::Quote(inner) => inner.kind(fields),
        }
    }

    /// Checks that every member accessed on a parameter exists in `fields`.
    pub fn check_members(&self, fields: &[Field], shape: &str) -> Result<()> {
        let mut unknown = None;
        self.visit(&mut |node: &Expr| {
            if unknown.is_some() {
                return;
            }
            if let Some(member) = node.as_member_access() {
                if !fields.iter().any(|f| f.name == member) {
                    unknown = Some(member.to_string());
                }
            }
        });
        match unknown {
            Some(member) => Err(QueryError::shape_mismatch(
                member,
                format!("no such member on {shape}"),
            )),
            None => Ok(()),
        }
    }

    /// Pre-order traversal.
    pub fn visit(&self, f: &mut impl FnMut(&Expr)) {
        f(self);
        match self {
            Expr::Constant(_) | Expr::Parameter(_) => {}
            Expr::Member { target, .. } | Expr::Text { target, .. } => target.visit(f),
            Expr::Not(inner) | Expr::Quote(inner) => inner.visit(f),
            Expr::Binary { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
            Expr::New { bindings, .. } => {
                for binding in bindings {
                    binding.source.visit(f);
                }
            }
        }
    }

    // ========================================================================
    // Rewrites
    // ========================================================================

    /// Rebuilds the tree bottom-up, letting `f` replace each rebuilt node.
    pub fn rewrite(&self, f: &impl Fn(Expr) -> Expr) -> Expr {
        let rebuilt = match self {
            Expr::Constant(_) | Expr::Parameter(_) => self.clone(),
            Expr::Member { target, member } => Expr::Member {
                target: Arc::new(target.rewrite(f)),
                member: member.clone(),
            },
            Expr::Not(inner) => Expr::Not(Arc::new(inner.rewrite(f))),
            Expr::Quote(inner) => Expr::Quote(Arc::new(inner.rewrite(f))),
            Expr::Binary { op, left, right } => Expr::binary(*op, left.rewrite(f), right.rewrite(f)),
            Expr::Text {
                op,
                target,
                pattern,
                ignore_case,
            } => Expr::Text {
                op: *op,
                target: Arc::new(target.rewrite(f)),
                pattern: pattern.clone(),
                ignore_case: *ignore_case,
            },
            Expr::New { shape, bindings } => Expr::New {
                shape: *shape,
                bindings: bindings
                    .iter()
                    .map(|b| MemberBinding {
                        member: b.member.clone(),
                        source: b.source.rewrite(f),
                    })
                    .collect(),
            },
        };
        f(rebuilt)
    }

    /// Substitutes every occurrence of `from` with `to`. No other node changes.
    pub fn replace_param(&self, from: &Param, to: &Param) -> Expr {
        self.rewrite(&|node: Expr| match node {
            Expr::Parameter(ref p) if p == from => Expr::Parameter(to.clone()),
            other => other,
        })
    }

    /// Inlines reducible wrapper nodes.
    pub fn reduce(&self) -> Expr {
        self.rewrite(&|node: Expr| match node {
            Expr::Quote(inner) => (*inner).clone(),
            other => other,
        })
    }
}

macro_rules! expr_from_literal {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expr {
                fn from(v: $t) -> Self {
                    Expr::Constant(Literal::from(v))
                }
            }
        )*
    };
}

expr_from_literal!(
    &str, String, bool, Timestamp, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64
);

impl From<Literal> for Expr {
    fn from(lit: Literal) -> Self {
        Expr::Constant(lit)
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(lit) => write!(f, "{lit}"),
            Expr::Parameter(p) => f.write_str(p.name()),
            Expr::Member { target, member } => {
                fmt_operand(target, None, f)?;
                write!(f, ".{member}")
            }
            Expr::Not(inner) => {
                f.write_str("!")?;
                fmt_operand(inner, None, f)
            }
            Expr::Binary { op, left, right } => {
                fmt_operand(left, Some(*op), f)?;
                write!(f, " {op} ")?;
                fmt_operand(right, Some(*op), f)
            }
            Expr::Text {
                op,
                target,
                pattern,
                ignore_case,
            } => {
                fmt_operand(target, None, f)?;
                let suffix = if *ignore_case { "_ignore_case" } else { "" };
                write!(f, ".{op}{suffix}({pattern:?})")
            }
            Expr::Quote(inner) => write!(f, "{inner}"),
            Expr::New { shape, bindings } => {
                write!(f, "{shape} {{ ")?;
                for (i, binding) in bindings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", binding.member, binding.source)?;
                }
                f.write_str(" }")
            }
        }
    }
}

/// Renders a child node, parenthesizing binary children.
///
/// A chain of the same logical operator is printed flat, so `(a && b) && c`
/// and `a && (b && c)` render identically.
fn fmt_operand(expr: &Expr, parent: Option<BinaryOp>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let inner = match expr {
        Expr::Quote(inner) => inner.as_ref(),
        other => other,
    };
    match inner {
        Expr::Binary { op, .. } if !(Some(*op) == parent && op.is_logical()) => {
            write!(f, "({inner})")
        }
        _ => write!(f, "{inner}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<Field> {
        vec![
            Field::new("name", ValueKind::String),
            Field::new("age", ValueKind::Number),
            Field::new("deleted", ValueKind::Bool),
        ]
    }

    #[test]
    fn params_compare_by_identity() {
        let a = Param::new("x");
        let b = Param::new("x");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn renders_with_precedence() {
        let x = Expr::param(&Param::new("x"));
        let e = x.member("age").gt(3).and(x.member("name").equals("a"));
        assert_eq!(e.to_string(), r#"(x.age > 3) && (x.name == "a")"#);

        let n = x.member("deleted").negate();
        assert_eq!(n.to_string(), "!x.deleted");
        let n = x.member("age").lt(1).negate();
        assert_eq!(n.to_string(), "!(x.age < 1)");
    }

    #[test]
    fn flat_rendering_of_associative_chains() {
        let x = Expr::param(&Param::new("x"));
        let a = x.member("a").equals(1);
        let b = x.member("b").equals(2);
        let c = x.member("c").equals(3);

        let left = a.clone().and(b.clone()).and(c.clone());
        let right = a.clone().and(b.clone().and(c.clone()));
        assert_ne!(left, right);
        assert_eq!(left.to_string(), right.to_string());

        let mixed = a.and(b.or(c));
        assert_eq!(mixed.to_string(), "(x.a == 1) && ((x.b == 2) || (x.c == 3))");
    }

    #[test]
    fn kind_inference() {
        let x = Expr::param(&Param::new("x"));
        let fields = fields();
        assert_eq!(x.member("name").kind(&fields), Some(ValueKind::String));
        assert_eq!(x.member("age").kind(&fields), Some(ValueKind::Number));
        assert_eq!(x.member("nope").kind(&fields), None);
        assert_eq!(x.member("age").gt(1).kind(&fields), Some(ValueKind::Bool));
        assert_eq!(x.member("deleted").quote().kind(&fields), Some(ValueKind::Bool));
        assert_eq!(lit(Literal::Null).kind(&fields), None);
        assert_eq!(x.kind(&fields), None);
    }

    #[test]
    fn check_members_reports_first_unknown() {
        let x = Expr::param(&Param::new("x"));
        let e = x.member("age").gt(1).and(x.member("nickname").equals("a"));
        let err = e.check_members(&fields(), "Person").unwrap_err();
        assert_eq!(
            err,
            QueryError::shape_mismatch("nickname", "no such member on Person")
        );
        assert!(x.member("age").gt(1).check_members(&fields(), "Person").is_ok());
    }

    #[test]
    fn replace_param_only_touches_parameters() {
        let from = Param::new("a");
        let to = Param::new("b");
        let e = Expr::param(&from).member("age").gt(1);
        let replaced = e.replace_param(&from, &to);

        assert_eq!(replaced, Expr::param(&to).member("age").gt(1));
        // the source tree is untouched
        assert_eq!(e, Expr::param(&from).member("age").gt(1));
    }

    #[test]
    fn reduce_strips_quotes() {
        let x = Expr::param(&Param::new("x"));
        let quoted = x.member("deleted").quote().equals(true).quote();
        assert_eq!(quoted.reduce(), x.member("deleted").equals(true));
    }

    #[test]
    fn member_access_detection() {
        let x = Expr::param(&Param::new("x"));
        assert_eq!(x.member("name").as_member_access(), Some("name"));
        assert_eq!(x.member("name").quote().as_member_access(), Some("name"));
        assert_eq!(x.member("a").member("b").as_member_access(), None);
        assert_eq!(lit(1).as_member_access(), None);
    }
}
