//! The Where builder.

use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::lambda::Predicate;
use crate::merge::merge;
use crate::traits::{Entity, Shape};

/// Accumulates filter predicates and folds them into one conjunction.
///
/// Predicates are kept in insertion order and are not deduplicated: adding
/// the same condition twice yields `p && p`.
pub struct WhereBuilder<T> {
    predicates: Vec<Predicate<T>>,
}

impl<T> Default for WhereBuilder<T> {
    fn default() -> Self {
        WhereBuilder {
            predicates: Vec::new(),
        }
    }
}

impl<T> Clone for WhereBuilder<T> {
    fn clone(&self) -> Self {
        WhereBuilder {
            predicates: self.predicates.clone(),
        }
    }
}

impl<T> fmt::Debug for WhereBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.predicates.iter().map(|p| p.to_string()))
            .finish()
    }
}

impl<T> WhereBuilder<T> {
    pub fn new() -> Self {
        WhereBuilder::default()
    }

    pub fn add(&mut self, predicate: Predicate<T>) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    pub fn clear(&mut self) {
        self.predicates.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn predicates(&self) -> &[Predicate<T>] {
        &self.predicates
    }
}

impl<T: Shape> WhereBuilder<T> {
    /// Folds every predicate into `p1 && p2 && ...` over the first
    /// predicate's parameter.
    ///
    /// Returns `Ok(None)` when nothing was added. Fails with `ShapeMismatch`
    /// if a predicate names a member `T` lacks, and with `InvalidArgument` if
    /// one is not boolean.
    pub fn build(&self) -> Result<Option<Predicate<T>>> {
        let mut predicates = self.predicates.iter();
        let Some(first) = predicates.next() else {
            return Ok(None);
        };

        first.check_members()?;
        first.ensure_predicate()?;
        let mut folded = first.clone();
        for predicate in predicates {
            predicate.check_members()?;
            folded = merge(&folded, predicate)?;
        }

        debug!(count = self.predicates.len(), predicate = %folded, "built where clause");
        Ok(Some(folded))
    }
}

impl<T: Entity> WhereBuilder<T> {
    /// Evaluates the folded predicate against one item.
    ///
    /// An empty builder is satisfied by everything.
    pub fn matches(&self, item: &T) -> Result<bool> {
        Ok(match self.build()? {
            Some(predicate) => predicate.matches(item),
            None => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::traits::Field;
    use crate::value::{Number, Value, ValueKind};

    struct Task {
        title: String,
        priority: i64,
        done: bool,
    }

    impl Shape for Task {
        const FIELDS: &'static [Field] = &[
            Field::new("title", ValueKind::String),
            Field::new("priority", ValueKind::Number),
            Field::new("done", ValueKind::Bool),
        ];
    }

    impl Entity for Task {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "title" => Value::String(&self.title),
                "priority" => Value::Number(Number::I64(self.priority)),
                "done" => Value::Bool(self.done),
                _ => Value::None,
            }
        }
    }

    fn task(title: &str, priority: i64, done: bool) -> Task {
        Task {
            title: title.to_string(),
            priority,
            done,
        }
    }

    #[test]
    fn empty_builds_to_none() {
        let filter: WhereBuilder<Task> = WhereBuilder::new();
        assert!(filter.build().unwrap().is_none());
        assert!(filter.matches(&task("a", 1, false)).unwrap());
    }

    #[test]
    fn single_predicate_is_returned_as_is() {
        let urgent: Predicate<Task> = Predicate::new("t", |t| t.member("priority").gte(5));
        let mut filter = WhereBuilder::new();
        filter.add(urgent.clone());
        assert_eq!(filter.build().unwrap(), Some(urgent));
    }

    #[test]
    fn folds_in_insertion_order() {
        let mut filter: WhereBuilder<Task> = WhereBuilder::new();
        filter
            .add(Predicate::new("a", |a| a.member("priority").gte(5)))
            .add(Predicate::new("b", |b| b.member("done").equals(false)))
            .add(Predicate::new("c", |c| c.member("title").starts_with("Fix")));

        let built = filter.build().unwrap().unwrap();
        assert_eq!(
            built.to_string(),
            "|a| (a.priority >= 5) && (a.done == false) && a.title.starts_with(\"Fix\")"
        );

        assert!(filter.matches(&task("Fix login", 7, false)).unwrap());
        assert!(!filter.matches(&task("Fix login", 7, true)).unwrap());
        assert!(!filter.matches(&task("Write docs", 7, false)).unwrap());
    }

    #[test]
    fn duplicates_are_kept() {
        let open: Predicate<Task> = Predicate::new("t", |t| t.member("done").equals(false));
        let mut filter = WhereBuilder::new();
        filter.add(open.clone()).add(open);
        assert_eq!(filter.len(), 2);
        assert_eq!(
            filter.build().unwrap().unwrap().to_string(),
            "|t| (t.done == false) && (t.done == false)"
        );
    }

    #[test]
    fn unknown_member_is_shape_mismatch() {
        let mut filter: WhereBuilder<Task> = WhereBuilder::new();
        filter
            .add(Predicate::new("t", |t| t.member("done").equals(false)))
            .add(Predicate::new("t", |t| t.member("owner").equals("me")));
        assert!(matches!(
            filter.build(),
            Err(QueryError::ShapeMismatch { member, .. }) if member == "owner"
        ));
        // a failed build leaves the builder as it was
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn clear_empties() {
        let mut filter: WhereBuilder<Task> = WhereBuilder::new();
        filter.add(Predicate::new("t", |t| t.member("done")));
        filter.clear();
        assert!(filter.is_empty());
        assert!(filter.build().unwrap().is_none());
    }
}
