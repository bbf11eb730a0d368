//! Query specifications.
//!
//! A query is a reusable description of what to fetch: filters, ordering,
//! free-text search, paging and store hints. It executes nothing on its own.
//! A [`Driver`](crate::Driver) materializes it.
//!
//! The shared state lives in [`Criteria`]. [`Query`] returns entities,
//! [`ProjectedQuery`] adds a projection onto a result type. Both expose the
//! same chaining API through the [`Specification`] trait.
//!
//! # Example
//!
//! ```
//! use quarry::{Predicate, Query, Selector, Specification};
//! # use quarry::{Entity, Field, Number, Shape, Value, ValueKind};
//! # struct Task { title: String, priority: i64, done: bool }
//! # impl Shape for Task {
//! #     const FIELDS: &'static [Field] = &[
//! #         Field::new("title", ValueKind::String),
//! #         Field::new("priority", ValueKind::Number),
//! #         Field::new("done", ValueKind::Bool),
//! #     ];
//! # }
//! # impl Entity for Task {
//! #     fn field_value(&self, field: &str) -> Value<'_> {
//! #         match field {
//! #             "title" => Value::String(&self.title),
//! #             "priority" => Value::Number(Number::I64(self.priority)),
//! #             "done" => Value::Bool(self.done),
//! #             _ => Value::None,
//! #         }
//! #     }
//! # }
//!
//! let query = Query::<Task>::new()
//!     .filter(Predicate::new("t", |t| t.member("done").equals(false)))
//!     .search(Selector::member("title"), "%bug%")
//!     .order_desc(Selector::member("priority"))
//!     .set_page(2, 20)
//!     .unwrap()
//!     .no_tracking();
//!
//! assert_eq!(query.criteria().get_skip(), Some(20));
//! assert_eq!(query.criteria().get_take(), Some(20));
//! assert!(query.criteria().hints().no_tracking);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::filter::WhereBuilder;
use crate::lambda::{Predicate, Selector};
use crate::merge::merge;
use crate::ordering::{Dir, OrderBuilder, OrderCriterion};
use crate::search::SearchBuilder;
use crate::select::{Projection, SelectBuilder};
use crate::traits::{Entity, Shape};

/// Advisory flags for the backing store.
///
/// Drivers honor them on a best-effort basis. Missing keys deserialize as
/// `false`, so a config file only needs to name the hints it turns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryHints {
    /// Results will not be modified; the store may skip change tracking.
    pub no_tracking: bool,
    /// Bypass the store's automatic row filters.
    pub ignore_query_filters: bool,
    /// Load related collections with separate statements.
    pub split_query: bool,
    /// Skip relations the store would include automatically.
    pub ignore_auto_includes: bool,
}

/// Post-materialization transform over a fetched list.
pub type Transform<X> = Arc<dyn Fn(Vec<X>) -> Vec<X> + Send + Sync>;

// ============================================================================
// Criteria
// ============================================================================

/// Everything a query specifies except its result shape.
pub struct Criteria<T> {
    filters: WhereBuilder<T>,
    ordering: OrderBuilder<T>,
    searches: SearchBuilder<T>,
    skip: Option<usize>,
    take: Option<usize>,
    hints: QueryHints,
}

impl<T> Default for Criteria<T> {
    fn default() -> Self {
        Criteria {
            filters: WhereBuilder::new(),
            ordering: OrderBuilder::new(),
            searches: SearchBuilder::new(),
            skip: None,
            take: None,
            hints: QueryHints::default(),
        }
    }
}

impl<T> Clone for Criteria<T> {
    fn clone(&self) -> Self {
        Criteria {
            filters: self.filters.clone(),
            ordering: self.ordering.clone(),
            searches: self.searches.clone(),
            skip: self.skip,
            take: self.take,
            hints: self.hints,
        }
    }
}

impl<T> fmt::Debug for Criteria<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criteria")
            .field("filters", &self.filters)
            .field("ordering", &self.ordering)
            .field("searches", &self.searches)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("hints", &self.hints)
            .finish()
    }
}

impl<T> Criteria<T> {
    pub fn new() -> Self {
        Criteria::default()
    }

    /// Drops every filter, order, search, paging bound and hint.
    pub fn clear(&mut self) {
        *self = Criteria::default();
    }

    /// Returns `true` when nothing has been specified.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.ordering.is_empty()
            && self.searches.is_empty()
            && self.skip.is_none()
            && self.take.is_none()
            && self.hints == QueryHints::default()
    }

    /// Sets 1-based page bounds: `skip = (page - 1) * page_size`,
    /// `take = page_size`.
    ///
    /// Fails with `InvalidPage` for a zero page or page size, or when the
    /// offset does not fit in `usize`. Bounds are untouched on failure.
    pub fn set_page(&mut self, page: usize, page_size: usize) -> Result<()> {
        let invalid = || QueryError::InvalidPage { page, page_size };
        if page == 0 || page_size == 0 {
            return Err(invalid());
        }
        let skip = (page - 1).checked_mul(page_size).ok_or_else(invalid)?;

        self.skip = Some(skip);
        self.take = Some(page_size);
        debug!(page, page_size, skip, take = page_size, "page bounds set");
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn filters(&self) -> &WhereBuilder<T> {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut WhereBuilder<T> {
        &mut self.filters
    }

    pub fn ordering(&self) -> &OrderBuilder<T> {
        &self.ordering
    }

    pub fn ordering_mut(&mut self) -> &mut OrderBuilder<T> {
        &mut self.ordering
    }

    pub fn searches(&self) -> &SearchBuilder<T> {
        &self.searches
    }

    pub fn searches_mut(&mut self) -> &mut SearchBuilder<T> {
        &mut self.searches
    }

    pub fn get_skip(&self) -> Option<usize> {
        self.skip
    }

    /// `None` means unbounded.
    pub fn get_take(&self) -> Option<usize> {
        self.take
    }

    pub fn set_skip(&mut self, skip: Option<usize>) {
        self.skip = skip;
    }

    pub fn set_take(&mut self, take: Option<usize>) {
        self.take = take;
    }

    pub fn hints(&self) -> QueryHints {
        self.hints
    }

    pub fn hints_mut(&mut self) -> &mut QueryHints {
        &mut self.hints
    }
}

impl<T: Shape> Criteria<T> {
    /// The predicate a driver applies: the Where clause AND the Search
    /// clause, whichever of them are present.
    pub fn predicate(&self) -> Result<Option<Predicate<T>>> {
        let filter = self.filters.build()?;
        let search = self.searches.build()?;
        match (filter, search) {
            (Some(filter), Some(search)) => merge(&filter, &search).map(Some),
            (filter, search) => Ok(filter.or(search)),
        }
    }

    /// Validated sort keys, primary first.
    pub fn order_criteria(&self) -> Result<Vec<OrderCriterion<T>>> {
        self.ordering.build()
    }
}

impl<T: Entity> Criteria<T> {
    /// Evaluates the Where clause against one item. Search terms are not
    /// considered. An empty Where clause is satisfied by everything.
    pub fn is_satisfied_by(&self, item: &T) -> Result<bool> {
        self.filters.matches(item)
    }
}

// ============================================================================
// Chaining API
// ============================================================================

/// Fluent configuration shared by [`Query`] and [`ProjectedQuery`].
pub trait Specification<T>: Sized {
    fn criteria(&self) -> &Criteria<T>;

    fn criteria_mut(&mut self) -> &mut Criteria<T>;

    /// Adds a Where predicate. Predicates are ANDed in insertion order.
    fn filter(mut self, predicate: Predicate<T>) -> Self {
        self.criteria_mut().filters.add(predicate);
        self
    }

    /// Adds a sort key. The first key added is the primary one.
    fn order_by(mut self, selector: Selector<T>, dir: Dir) -> Self {
        self.criteria_mut().ordering.add(selector, dir);
        self
    }

    fn order_asc(self, selector: Selector<T>) -> Self {
        self.order_by(selector, Dir::Asc)
    }

    fn order_desc(self, selector: Selector<T>) -> Self {
        self.order_by(selector, Dir::Desc)
    }

    /// Adds a `%`-wildcard search term. Search terms are ORed together.
    fn search(mut self, selector: Selector<T>, pattern: &str) -> Self {
        self.criteria_mut().searches.add(selector, pattern);
        self
    }

    fn skip(mut self, n: usize) -> Self {
        self.criteria_mut().skip = Some(n);
        self
    }

    fn take(mut self, n: usize) -> Self {
        self.criteria_mut().take = Some(n);
        self
    }

    /// See [`Criteria::set_page`].
    fn set_page(mut self, page: usize, page_size: usize) -> Result<Self> {
        self.criteria_mut().set_page(page, page_size)?;
        Ok(self)
    }

    fn no_tracking(mut self) -> Self {
        self.criteria_mut().hints.no_tracking = true;
        self
    }

    fn ignore_query_filters(mut self) -> Self {
        self.criteria_mut().hints.ignore_query_filters = true;
        self
    }

    fn split_query(mut self) -> Self {
        self.criteria_mut().hints.split_query = true;
        self
    }

    fn ignore_auto_includes(mut self) -> Self {
        self.criteria_mut().hints.ignore_auto_includes = true;
        self
    }

    /// Replaces all four hints at once, e.g. with a set loaded from config.
    fn with_hints(mut self, hints: QueryHints) -> Self {
        self.criteria_mut().hints = hints;
        self
    }

    fn is_satisfied_by(&self, item: &T) -> Result<bool>
    where
        T: Entity,
    {
        self.criteria().is_satisfied_by(item)
    }

    fn predicate(&self) -> Result<Option<Predicate<T>>>
    where
        T: Shape,
    {
        self.criteria().predicate()
    }
}

// ============================================================================
// Query
// ============================================================================

/// A query returning entities of type `T`.
pub struct Query<T> {
    criteria: Criteria<T>,
    transform: Option<Transform<T>>,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Query {
            criteria: Criteria::default(),
            transform: None,
        }
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Query {
            criteria: self.criteria.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("criteria", &self.criteria)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl<T> Specification<T> for Query<T> {
    fn criteria(&self) -> &Criteria<T> {
        &self.criteria
    }

    fn criteria_mut(&mut self) -> &mut Criteria<T> {
        &mut self.criteria
    }
}

impl<T> Query<T> {
    pub fn new() -> Self {
        Query::default()
    }

    /// Resets the query to empty. The instance stays usable.
    pub fn clear(&mut self) {
        self.criteria.clear();
        self.transform = None;
    }

    /// Sets the transform a driver runs over the fetched list, replacing any
    /// earlier one.
    pub fn transform(mut self, f: impl Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// Runs the transform, or returns `items` as-is when none is set.
    pub fn apply_transform(&self, items: Vec<T>) -> Vec<T> {
        match &self.transform {
            Some(transform) => transform(items),
            None => items,
        }
    }

    /// Turns this query into one projecting onto `R`, keeping its criteria.
    /// The transform is dropped since it worked on `T`.
    pub fn project<R>(self) -> ProjectedQuery<T, R> {
        ProjectedQuery {
            criteria: self.criteria,
            selection: SelectBuilder::new(),
            transform: None,
        }
    }
}

// ============================================================================
// ProjectedQuery
// ============================================================================

/// A query returning `R` values projected from entities of type `T`.
pub struct ProjectedQuery<T, R> {
    criteria: Criteria<T>,
    selection: SelectBuilder<T, R>,
    transform: Option<Transform<R>>,
}

impl<T, R> Default for ProjectedQuery<T, R> {
    fn default() -> Self {
        ProjectedQuery {
            criteria: Criteria::default(),
            selection: SelectBuilder::new(),
            transform: None,
        }
    }
}

impl<T, R> Clone for ProjectedQuery<T, R> {
    fn clone(&self) -> Self {
        ProjectedQuery {
            criteria: self.criteria.clone(),
            selection: self.selection.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<T, R> fmt::Debug for ProjectedQuery<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedQuery")
            .field("criteria", &self.criteria)
            .field("selection", &self.selection)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl<T, R> Specification<T> for ProjectedQuery<T, R> {
    fn criteria(&self) -> &Criteria<T> {
        &self.criteria
    }

    fn criteria_mut(&mut self) -> &mut Criteria<T> {
        &mut self.criteria
    }
}

impl<T, R> ProjectedQuery<T, R> {
    pub fn new() -> Self {
        ProjectedQuery::default()
    }

    /// Resets the query to empty, projection included.
    pub fn clear(&mut self) {
        self.criteria.clear();
        self.selection.clear();
        self.transform = None;
    }

    /// Maps a member of `T` onto the `R` member of the same name.
    pub fn select(mut self, selector: Selector<T>) -> Self {
        self.selection.add(selector);
        self
    }

    /// Maps any selector onto the named `R` member.
    pub fn select_to(mut self, selector: Selector<T>, destination: impl Into<String>) -> Self {
        self.selection.add_to(selector, destination);
        self
    }

    pub fn selection(&self) -> &SelectBuilder<T, R> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectBuilder<T, R> {
        &mut self.selection
    }

    pub fn transform(mut self, f: impl Fn(Vec<R>) -> Vec<R> + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    pub fn apply_transform(&self, items: Vec<R>) -> Vec<R> {
        match &self.transform {
            Some(transform) => transform(items),
            None => items,
        }
    }
}

impl<T: Shape, R: Shape> ProjectedQuery<T, R> {
    /// Compiles the projection. See [`SelectBuilder::build`].
    pub fn projection(&self) -> Result<Projection<T, R>> {
        self.selection.build()
    }
}
