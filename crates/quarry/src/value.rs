//! Runtime values produced while evaluating expressions.
//!
//! A [`Value`] is what a member access, a constant or a comparison evaluates
//! to. String values borrow from either the entity being inspected or the
//! expression tree itself, so evaluation never allocates for plain reads.

use std::cmp::Ordering;
use std::fmt;

/// Static kind of a member or expression, used for shape validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Timestamp,
    Enum,
    Bool,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Enum => "enum",
            ValueKind::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime value, borrowed from the entity or the expression tree.
///
/// # Example
///
/// ```
/// use quarry::{Entity, Field, Number, Shape, Value, ValueKind};
///
/// struct Person {
///     name: String,
///     age: u8,
/// }
///
/// impl Shape for Person {
///     const FIELDS: &'static [Field] = &[
///         Field::new("name", ValueKind::String),
///         Field::new("age", ValueKind::Number),
///     ];
/// }
///
/// impl Entity for Person {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "age" => Value::Number(Number::from(self.age)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    String(&'a str),
    Number(Number),
    /// Milliseconds since the Unix epoch.
    Timestamp(Timestamp),
    /// Enum discriminant.
    Enum(u32),
    Bool(bool),
    /// Missing, null, or not addressable.
    None,
}

impl<'a> Value<'a> {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns the kind of this value, or `None` for [`Value::None`].
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::String(_) => Some(ValueKind::String),
            Value::Number(_) => Some(ValueKind::Number),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
            Value::Enum(_) => Some(ValueKind::Enum),
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::None => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Equality as the evaluator sees it.
    ///
    /// Numbers compare across representations (`I64(5) == F64(5.0)`), two
    /// missing values are equal, and values of different kinds never are.
    pub fn loose_eq(&self, other: &Value<'_>) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Number(a), Value::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Mixed-representation comparisons fall back to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types. `None` on NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

fn compare_signed_unsigned(signed: i64, unsigned: u64) -> Ordering {
    match u64::try_from(signed) {
        Ok(s) => s.cmp(&unsigned),
        Err(_) => Ordering::Less,
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n:?}"),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as $wide)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Saturates at the `i64` bounds instead of overflowing.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Value::String("x").kind(), Some(ValueKind::String));
        assert_eq!(Value::Number(Number::I64(1)).kind(), Some(ValueKind::Number));
        assert_eq!(Value::Enum(3).kind(), Some(ValueKind::Enum));
        assert_eq!(Value::None.kind(), None);
    }

    #[test]
    fn loose_eq_crosses_number_representations() {
        assert!(Value::Number(Number::I64(5)).loose_eq(&Value::Number(Number::F64(5.0))));
        assert!(Value::Number(Number::U64(7)).loose_eq(&Value::Number(Number::I64(7))));
        assert!(!Value::Number(Number::I64(-1)).loose_eq(&Value::Number(Number::U64(u64::MAX))));
    }

    #[test]
    fn loose_eq_none_and_mismatch() {
        assert!(Value::None.loose_eq(&Value::None));
        assert!(!Value::None.loose_eq(&Value::Bool(false)));
        assert!(!Value::String("1").loose_eq(&Value::Number(Number::I64(1))));
    }

    #[test]
    fn signed_unsigned_ordering() {
        assert_eq!(
            Number::I64(-3).compare(Number::U64(0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(10).compare(Number::I64(3)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn nan_is_uncomparable() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn number_display() {
        assert_eq!(Number::I64(-4).to_string(), "-4");
        assert_eq!(Number::F64(2.5).to_string(), "2.5");
        assert_eq!(Number::F64(2.0).to_string(), "2.0");
    }

    #[test]
    fn timestamp_units() {
        assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
        assert!(Timestamp(1) < Timestamp(2));
    }

    #[test]
    fn timestamp_from_huge_secs_saturates() {
        assert_eq!(Timestamp::from_secs(i64::MAX / 10).as_millis(), i64::MAX);
        assert_eq!(Timestamp::from_secs(i64::MIN / 10).as_millis(), i64::MIN);
    }
}
