//! The Search builder and `%` wildcard patterns.

use std::fmt;

use tracing::debug;

use crate::error::{QueryError, Result};
use crate::lambda::{Predicate, Selector};
use crate::merge::combine;
use crate::op::{LogicalOp, TextOp};
use crate::traits::Shape;
use crate::value::ValueKind;

/// A search term classified by where its `%` wildcards sit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPattern {
    /// `%term%`
    Contains(String),
    /// `term%`
    StartsWith(String),
    /// `%term`
    EndsWith(String),
    /// `term`
    Equals(String),
}

impl SearchPattern {
    /// Classifies a raw pattern.
    ///
    /// Only a leading and a trailing `%` are wildcards. A `%` anywhere else is
    /// kept as a literal character. A lone `%` matches everything.
    ///
    /// ```
    /// use quarry::SearchPattern;
    ///
    /// assert_eq!(SearchPattern::parse("%rust%"), SearchPattern::Contains("rust".into()));
    /// assert_eq!(SearchPattern::parse("rust%"), SearchPattern::StartsWith("rust".into()));
    /// assert_eq!(SearchPattern::parse("%rust"), SearchPattern::EndsWith("rust".into()));
    /// assert_eq!(SearchPattern::parse("rust"), SearchPattern::Equals("rust".into()));
    /// assert_eq!(SearchPattern::parse("%"), SearchPattern::Contains(String::new()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        if raw == "%" {
            return SearchPattern::Contains(String::new());
        }
        let leading = raw.starts_with('%');
        let trailing = raw.len() > 1 && raw.ends_with('%');
        let start = usize::from(leading);
        let end = raw.len() - usize::from(trailing);
        let term = raw[start..end].to_string();

        match (leading, trailing) {
            (true, true) => SearchPattern::Contains(term),
            (false, true) => SearchPattern::StartsWith(term),
            (true, false) => SearchPattern::EndsWith(term),
            (false, false) => SearchPattern::Equals(term),
        }
    }

    pub fn op(&self) -> TextOp {
        match self {
            SearchPattern::Contains(_) => TextOp::Contains,
            SearchPattern::StartsWith(_) => TextOp::StartsWith,
            SearchPattern::EndsWith(_) => TextOp::EndsWith,
            SearchPattern::Equals(_) => TextOp::Equals,
        }
    }

    /// The pattern with its wildcards stripped.
    pub fn term(&self) -> &str {
        match self {
            SearchPattern::Contains(t)
            | SearchPattern::StartsWith(t)
            | SearchPattern::EndsWith(t)
            | SearchPattern::Equals(t) => t,
        }
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPattern::Contains(t) => write!(f, "%{t}%"),
            SearchPattern::StartsWith(t) => write!(f, "{t}%"),
            SearchPattern::EndsWith(t) => write!(f, "%{t}"),
            SearchPattern::Equals(t) => f.write_str(t),
        }
    }
}

/// One (selector, pattern) search criterion.
pub struct SearchCriterion<T> {
    pub selector: Selector<T>,
    pub pattern: SearchPattern,
}

impl<T> Clone for SearchCriterion<T> {
    fn clone(&self) -> Self {
        SearchCriterion {
            selector: self.selector.clone(),
            pattern: self.pattern.clone(),
        }
    }
}

impl<T> fmt::Debug for SearchCriterion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCriterion")
            .field("selector", &self.selector.to_string())
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl<T: Shape> SearchCriterion<T> {
    /// Case-insensitive match of the selected string against the pattern.
    fn to_predicate(&self) -> Result<Predicate<T>> {
        self.selector.check_members()?;
        if self.selector.kind() != Some(ValueKind::String) {
            let member = self
                .selector
                .body()
                .as_member_access()
                .map(str::to_owned)
                .unwrap_or_else(|| self.selector.body().to_string());
            return Err(QueryError::shape_mismatch(
                member,
                "search applies to string members only",
            ));
        }

        let (param, body) = self.selector.clone().into_parts();
        let body = body.text(self.pattern.op(), self.pattern.term(), true);
        Ok(Predicate::from_parts(param, body))
    }
}

/// Accumulates search criteria and folds them into one disjunction.
pub struct SearchBuilder<T> {
    criteria: Vec<SearchCriterion<T>>,
}

impl<T> Default for SearchBuilder<T> {
    fn default() -> Self {
        SearchBuilder {
            criteria: Vec::new(),
        }
    }
}

impl<T> Clone for SearchBuilder<T> {
    fn clone(&self) -> Self {
        SearchBuilder {
            criteria: self.criteria.clone(),
        }
    }
}

impl<T> fmt::Debug for SearchBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.criteria).finish()
    }
}

impl<T> SearchBuilder<T> {
    pub fn new() -> Self {
        SearchBuilder::default()
    }

    pub fn add(&mut self, selector: Selector<T>, pattern: &str) -> &mut Self {
        self.criteria.push(SearchCriterion {
            selector,
            pattern: SearchPattern::parse(pattern),
        });
        self
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

    pub fn criteria(&self) -> &[SearchCriterion<T>] {
        &self.criteria
    }
}

impl<T: Shape> SearchBuilder<T> {
    /// ORs every criterion together, case-insensitively.
    ///
    /// Returns `Ok(None)` when nothing was added.
    pub fn build(&self) -> Result<Option<Predicate<T>>> {
        let mut criteria = self.criteria.iter();
        let Some(first) = criteria.next() else {
            return Ok(None);
        };

        let mut folded = first.to_predicate()?;
        for criterion in criteria {
            folded = combine(&folded, &criterion.to_predicate()?, LogicalOp::Or)?;
        }

        debug!(count = self.criteria.len(), predicate = %folded, "built search clause");
        Ok(Some(folded))
    }
}
