//! Single-parameter lambdas typed over an entity.

use std::fmt;
use std::marker::PhantomData;

use crate::compare::equivalent;
use crate::error::{QueryError, Result};
use crate::expr::{Expr, Param};
use crate::traits::{Entity, Shape};
use crate::value::{Value, ValueKind};

/// A single-parameter expression over entity `T`.
///
/// The parameter is a fresh [`Param`] per lambda, so two lambdas built
/// independently never share a parameter until one is rebound onto the
/// other.
pub struct Lambda<T> {
    param: Param,
    body: Expr,
    _entity: PhantomData<fn(&T)>,
}

/// A lambda whose body evaluates to a boolean.
pub type Predicate<T> = Lambda<T>;

/// A lambda whose body selects a value, typically a member.
pub type Selector<T> = Lambda<T>;

impl<T> Lambda<T> {
    /// Builds a lambda with a fresh parameter called `name`.
    ///
    /// ```
    /// use quarry::Selector;
    /// # use quarry::{Entity, Field, Shape, Value, ValueKind};
    /// # struct Person;
    /// # impl Shape for Person { const FIELDS: &'static [Field] = &[]; }
    /// # impl Entity for Person { fn field_value(&self, _: &str) -> Value<'_> { Value::None } }
    ///
    /// let name: Selector<Person> = Selector::new("p", |p| p.member("name"));
    /// assert_eq!(name.to_string(), "|p| p.name");
    /// ```
    pub fn new(name: &str, build: impl FnOnce(&Expr) -> Expr) -> Self {
        let param = Param::new(name);
        let body = build(&Expr::param(&param));
        Lambda::from_parts(param, body)
    }

    /// Shorthand for the member selector `|x| x.<member>`.
    pub fn member(member: &str) -> Self {
        Lambda::new("x", |x| x.member(member))
    }

    pub fn from_parts(param: Param, body: Expr) -> Self {
        Lambda {
            param,
            body,
            _entity: PhantomData,
        }
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn into_parts(self) -> (Param, Expr) {
        (self.param, self.body)
    }

    /// Returns this lambda's body with its parameter replaced by `param`.
    pub fn body_for(&self, param: &Param) -> Expr {
        if &self.param == param {
            self.body.clone()
        } else {
            self.body.replace_param(&self.param, param)
        }
    }

    /// Semantic equality of two lambdas, independent of parameter identity.
    pub fn is_equivalent(&self, other: &Lambda<T>) -> bool {
        equivalent(&self.body, &other.body_for(&self.param))
    }
}

impl<T: Shape> Lambda<T> {
    /// Static kind of the body against `T`'s members.
    pub fn kind(&self) -> Option<ValueKind> {
        self.body.kind(T::FIELDS)
    }

    /// Fails with `InvalidArgument` unless the body is boolean.
    pub fn ensure_predicate(&self) -> Result<()> {
        match self.kind() {
            Some(ValueKind::Bool) => Ok(()),
            _ => Err(QueryError::InvalidArgument(format!(
                "`{self}` is not a boolean predicate over {}",
                T::shape_name()
            ))),
        }
    }

    /// Fails with `ShapeMismatch` if the body names a member `T` lacks.
    pub fn check_members(&self) -> Result<()> {
        self.body.check_members(T::FIELDS, T::shape_name())
    }
}

impl<T: Entity> Lambda<T> {
    pub fn evaluate<'a>(&'a self, item: &'a T) -> Value<'a> {
        self.body.evaluate(&self.param, item)
    }

    /// Returns `true` when the body evaluates to `true` for `item`.
    pub fn matches(&self, item: &T) -> bool {
        matches!(self.evaluate(item), Value::Bool(true))
    }
}

impl<T> Clone for Lambda<T> {
    fn clone(&self) -> Self {
        Lambda::from_parts(self.param.clone(), self.body.clone())
    }
}

/// Structural equality that also requires the same parameter object.
/// Two lambdas built by separate calls are never equal; use
/// [`Lambda::is_equivalent`] to compare meaning.
impl<T> PartialEq for Lambda<T> {
    fn eq(&self, other: &Self) -> bool {
        self.param == other.param && self.body == other.body
    }
}

impl<T> fmt::Debug for Lambda<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("param", &self.param)
            .field("body", &self.body)
            .finish()
    }
}

impl<T> fmt::Display for Lambda<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}| {}", self.param.name(), self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Field;
    use crate::value::Number;

    struct Item {
        size: u32,
        hidden: bool,
    }

    impl Shape for Item {
        const FIELDS: &'static [Field] = &[
            Field::new("size", ValueKind::Number),
            Field::new("hidden", ValueKind::Bool),
        ];
    }

    impl Entity for Item {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "size" => Value::Number(Number::from(self.size)),
                "hidden" => Value::Bool(self.hidden),
                _ => Value::None,
            }
        }
    }

    #[test]
    fn independent_lambdas_have_distinct_params() {
        let a: Predicate<Item> = Predicate::new("x", |x| x.member("hidden"));
        let b: Predicate<Item> = Predicate::new("x", |x| x.member("hidden"));
        assert_ne!(a, b);
        assert!(a.is_equivalent(&b));
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn body_for_rebinds() {
        let a: Predicate<Item> = Predicate::new("a", |a| a.member("size").gt(2));
        let b: Predicate<Item> = Predicate::new("b", |b| b.member("size").gt(2));
        assert_eq!(b.body_for(a.param()), *a.body());
    }

    #[test]
    fn ensure_predicate() {
        let ok: Predicate<Item> = Predicate::new("x", |x| x.member("size").gt(1));
        assert!(ok.ensure_predicate().is_ok());

        let hidden: Predicate<Item> = Predicate::member("hidden");
        assert!(hidden.ensure_predicate().is_ok());

        let not_bool: Predicate<Item> = Predicate::member("size");
        let err = not_bool.ensure_predicate().unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(msg) if msg.contains("|x| x.size")));
    }

    #[test]
    fn check_members() {
        let bad: Predicate<Item> = Predicate::new("x", |x| x.member("colour").equals("red"));
        assert!(matches!(
            bad.check_members(),
            Err(QueryError::ShapeMismatch { member, .. }) if member == "colour"
        ));
    }

    #[test]
    fn matches_items() {
        let small: Predicate<Item> = Predicate::new("x", |x| x.member("size").lt(10));
        assert!(small.matches(&Item {
            size: 3,
            hidden: true
        }));
        assert!(!small.matches(&Item {
            size: 30,
            hidden: false
        }));
    }
}
