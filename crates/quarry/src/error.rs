//! Error types for the quarry crate.

use thiserror::Error;

/// Errors raised while building query specifications.
///
/// Every variant is produced synchronously by the call that received the bad
/// input. Nothing here is transient, so none of them is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A required input was missing or malformed, e.g. a predicate whose body
    /// does not evaluate to a boolean.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A member reference does not fit the shape it was resolved against.
    #[error("shape mismatch on member '{member}': {reason}")]
    ShapeMismatch { member: String, reason: String },

    /// A projection was built with no member mappings.
    #[error("projection has no member mappings")]
    EmptyProjection,

    /// A page request that cannot be turned into skip/take bounds.
    #[error("invalid page {page} with page size {page_size}")]
    InvalidPage { page: usize, page_size: usize },
}

impl QueryError {
    pub(crate) fn shape_mismatch(member: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::ShapeMismatch {
            member: member.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = QueryError::shape_mismatch("nickname", "no such member on Person");
        assert_eq!(
            err.to_string(),
            "shape mismatch on member 'nickname': no such member on Person"
        );

        let err = QueryError::InvalidPage {
            page: 0,
            page_size: 10,
        };
        assert_eq!(err.to_string(), "invalid page 0 with page size 10");
    }
}
