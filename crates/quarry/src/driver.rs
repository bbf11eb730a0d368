//! The interface backing stores implement to materialize queries.

use crate::query::{ProjectedQuery, Query};
use crate::traits::{Entity, Projectable};

/// A backing store that can execute query specifications.
///
/// Implementations are expected to, in order:
///
/// 1. apply [`Criteria::predicate`](crate::Criteria::predicate), plus their
///    own automatic row filter unless `ignore_query_filters` is set;
/// 2. sort by [`Criteria::order_criteria`](crate::Criteria::order_criteria);
/// 3. skip and take;
/// 4. project, for [`ProjectedQuery`];
/// 5. run the query's transform.
///
/// The other hints are advisory and may be ignored. A store that needs to
/// relax only part of its row filter can strip a single condition with
/// [`ConditionRemover`](crate::ConditionRemover).
pub trait Driver<T: Entity> {
    type Error: std::error::Error + From<crate::QueryError>;

    fn fetch(&self, query: &Query<T>) -> Result<Vec<T>, Self::Error>;

    fn fetch_projected<R: Projectable>(
        &self,
        query: &ProjectedQuery<T, R>,
    ) -> Result<Vec<R>, Self::Error>;

    /// Number of rows matching the predicate, ignoring paging and transform.
    fn count(&self, query: &Query<T>) -> Result<usize, Self::Error>;
}
