//! Ordering criteria and the order builder.
//!
//! An [`OrderBuilder`] keeps (selector, direction) pairs in insertion order.
//! The first pair is the primary key and each later pair breaks ties among
//! rows equal on every earlier key. Drivers translate the list into their own
//! sort chain. [`OrderBuilder::compare`] and [`OrderBuilder::sort`] apply it
//! in process.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::lambda::Selector;
use crate::traits::{Entity, Shape};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    #[default]
    Asc,
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sort key: a selector and its direction.
pub struct OrderCriterion<T> {
    pub selector: Selector<T>,
    pub dir: Dir,
}

impl<T> Clone for OrderCriterion<T> {
    fn clone(&self) -> Self {
        OrderCriterion {
            selector: self.selector.clone(),
            dir: self.dir,
        }
    }
}

impl<T> fmt::Debug for OrderCriterion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderCriterion")
            .field("selector", &self.selector.to_string())
            .field("dir", &self.dir)
            .finish()
    }
}

impl<T: Entity> OrderCriterion<T> {
    /// Compares two items on this key alone.
    ///
    /// Returns `None` if the selected values cannot be compared.
    pub fn compare(&self, a: &T, b: &T) -> Option<Ordering> {
        let va = self.selector.evaluate(a);
        let vb = self.selector.evaluate(b);
        compare_values(&va, &vb).map(|ordering| self.dir.apply(ordering))
    }
}

/// Compares two values of the same kind.
///
/// Missing values sort last. Returns `None` on a kind mismatch or NaN.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),

        (Value::None, Value::None) => Some(Ordering::Equal),
        (Value::None, _) => Some(Ordering::Greater),
        (_, Value::None) => Some(Ordering::Less),

        _ => None,
    }
}

/// Accumulates sort keys in insertion order.
pub struct OrderBuilder<T> {
    criteria: Vec<OrderCriterion<T>>,
}

impl<T> Default for OrderBuilder<T> {
    fn default() -> Self {
        OrderBuilder {
            criteria: Vec::new(),
        }
    }
}

impl<T> Clone for OrderBuilder<T> {
    fn clone(&self) -> Self {
        OrderBuilder {
            criteria: self.criteria.clone(),
        }
    }
}

impl<T> fmt::Debug for OrderBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.criteria).finish()
    }
}

impl<T> OrderBuilder<T> {
    pub fn new() -> Self {
        OrderBuilder::default()
    }

    /// Appends a sort key. Duplicate keys are accepted as given.
    pub fn add(&mut self, selector: Selector<T>, dir: Dir) -> &mut Self {
        self.criteria.push(OrderCriterion { selector, dir });
        self
    }

    pub fn asc(&mut self, selector: Selector<T>) -> &mut Self {
        self.add(selector, Dir::Asc)
    }

    pub fn desc(&mut self, selector: Selector<T>) -> &mut Self {
        self.add(selector, Dir::Desc)
    }

    pub fn clear(&mut self) {
        self.criteria.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// The accumulated keys, primary first.
    pub fn criteria(&self) -> &[OrderCriterion<T>] {
        &self.criteria
    }
}

impl<T: Shape> OrderBuilder<T> {
    /// Returns the sort keys after checking every selector against `T`.
    pub fn build(&self) -> Result<Vec<OrderCriterion<T>>> {
        for criterion in &self.criteria {
            criterion.selector.check_members()?;
        }
        Ok(self.criteria.clone())
    }
}

impl<T: Entity> OrderBuilder<T> {
    /// Compares two items using every key in order.
    ///
    /// Keys that cannot compare their values count as equal.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for criterion in &self.criteria {
            if let Some(ordering) = criterion.compare(a, b) {
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort of borrowed items.
    pub fn sort(&self, items: &mut [&T]) {
        if !self.criteria.is_empty() {
            items.sort_by(|a, b| self.compare(a, b));
        }
    }
}
