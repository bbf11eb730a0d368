//! Shape traits implemented by entity and result types.
//!
//! The engine never reflects over types at runtime. Instead a type describes
//! its queryable members once through [`Shape`], exposes their values through
//! [`Entity`], and, when it is a projection target, accepts assignments
//! through [`Projectable`]. All three are usually derived with
//! `#[derive(Entity, Projectable)]` from `quarry-macros`.

use crate::value::{Number, Timestamp, Value, ValueKind};

/// Descriptor for one queryable member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Field { name, kind }
    }
}

/// Static member list of an entity or result type.
pub trait Shape {
    const FIELDS: &'static [Field];

    /// Looks up a member descriptor by name.
    fn field(name: &str) -> Option<&'static Field>
    where
        Self: Sized,
    {
        Self::FIELDS.iter().find(|f| f.name == name)
    }

    /// Short type name used in error messages and rendered projections.
    fn shape_name() -> &'static str
    where
        Self: Sized,
    {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Types whose members can be read by evaluated expressions.
///
/// # Manual Implementation
///
/// ```
/// use quarry::{Entity, Field, Number, Shape, Value, ValueKind};
///
/// struct Company {
///     name: String,
///     employees: u32,
/// }
///
/// impl Shape for Company {
///     const FIELDS: &'static [Field] = &[
///         Field::new("name", ValueKind::String),
///         Field::new("employees", ValueKind::Number),
///     ];
/// }
///
/// impl Entity for Company {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "employees" => Value::Number(Number::from(self.employees)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Entity: Shape {
    /// Returns the value of a member, or [`Value::None`] when the member does
    /// not exist or is not queryable.
    fn field_value(&self, field: &str) -> Value<'_>;
}

/// Types that can be constructed by a projection.
///
/// The projection default-constructs the type and then assigns each mapped
/// member through [`Projectable::set_field`].
pub trait Projectable: Shape + Default {
    /// Assigns a member. Returns `false` when the member does not exist or the
    /// value cannot be converted to the member's type.
    fn set_field(&mut self, field: &str, value: Value<'_>) -> bool;
}

/// Conversion from a runtime [`Value`] into a concrete member type.
pub trait FromValue: Sized {
    fn from_value(value: &Value<'_>) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for Timestamp {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        value.as_timestamp()
    }
}

impl<V: FromValue> FromValue for Option<V> {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        match value {
            Value::None => Some(None),
            other => V::from_value(other).map(Some),
        }
    }
}

macro_rules! int_from_value {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value<'_>) -> Option<Self> {
                    match value.as_number()? {
                        Number::I64(n) => <$t>::try_from(n).ok(),
                        Number::U64(n) => <$t>::try_from(n).ok(),
                        Number::F64(n) => {
                            // MAX + 1 is a power of two, so it is exact as f64
                            let in_range = n >= <$t>::MIN as f64 && n < <$t>::MAX as f64 + 1.0;
                            (n.fract() == 0.0 && in_range).then_some(n as $t)
                        }
                    }
                }
            }
        )*
    };
}

int_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        value.as_number().map(Number::to_f64)
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        value.as_number().map(|n| n.to_f64() as f32)
    }
}

/// Maps an enum member to a stable discriminant.
///
/// Used by `#[query(Enum)]` fields. Use explicit values rather than relying
/// on declaration order so stored filters keep their meaning.
///
/// ```
/// use quarry::Discriminant;
///
/// #[derive(Clone, Copy)]
/// enum Status {
///     Active,
///     Deleted,
/// }
///
/// impl Discriminant for Status {
///     fn discriminant(&self) -> u32 {
///         match self {
///             Status::Active => 0,
///             Status::Deleted => 1,
///         }
///     }
/// }
/// ```
pub trait Discriminant {
    fn discriminant(&self) -> u32;
}

/// Converts a datetime member to a [`Timestamp`]. Used by `#[query(Timestamp)]`.
pub trait AsTimestamp {
    fn as_timestamp(&self) -> Timestamp;
}

impl AsTimestamp for i64 {
    fn as_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl AsTimestamp for Timestamp {
    fn as_timestamp(&self) -> Timestamp {
        *self
    }
}
