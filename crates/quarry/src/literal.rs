//! Owned constant values stored inside expression trees.
//!
//! Unlike [`Value`], which borrows from whatever is being evaluated, a
//! [`Literal`] owns its data so it can live in a predicate that outlives the
//! call that built it.

use std::fmt;

use crate::value::{Number, Timestamp, Value, ValueKind};

/// Constant operand of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    Enum(u32),
    Bool(bool),
    Null,
}

impl Literal {
    /// Borrows this literal as a runtime value.
    pub fn as_value(&self) -> Value<'_> {
        match self {
            Literal::String(s) => Value::String(s),
            Literal::Number(n) => Value::Number(*n),
            Literal::Timestamp(t) => Value::Timestamp(*t),
            Literal::Enum(d) => Value::Enum(*d),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::None,
        }
    }

    pub fn kind(&self) -> Option<ValueKind> {
        self.as_value().kind()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Timestamp(t) => write!(f, "@{}", t.as_millis()),
            Literal::Enum(d) => write!(f, "#{d}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => f.write_str("null"),
        }
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<Number> for Literal {
    fn from(n: Number) -> Self {
        Literal::Number(n)
    }
}

impl From<Timestamp> for Literal {
    fn from(t: Timestamp) -> Self {
        Literal::Timestamp(t)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl<V: Into<Literal>> From<Option<V>> for Literal {
    fn from(v: Option<V>) -> Self {
        v.map_or(Literal::Null, Into::into)
    }
}

macro_rules! literal_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Literal {
                fn from(n: $t) -> Self {
                    Literal::Number(Number::from(n))
                }
            }
        )*
    };
}

literal_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
