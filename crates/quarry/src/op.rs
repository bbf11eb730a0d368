//! Operators carried by expression nodes.
//!
//! [`BinaryOp`] covers the logical connectives and the comparisons.
//! [`TextOp`] covers the string-matching calls produced by search patterns.

use std::cmp::Ordering;
use std::fmt;

/// Operator of a binary expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Logical, short-circuiting
    AndAlso,
    OrElse,

    // Comparisons
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl BinaryOp {
    /// Returns `true` for `AndAlso` and `OrElse`.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::AndAlso | BinaryOp::OrElse)
    }

    /// Evaluates a comparison given an ordering result.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            BinaryOp::Eq => ordering == Ordering::Equal,
            BinaryOp::Ne => ordering != Ordering::Equal,
            BinaryOp::Gt => ordering == Ordering::Greater,
            BinaryOp::Gte => ordering != Ordering::Less,
            BinaryOp::Lt => ordering == Ordering::Less,
            BinaryOp::Lte => ordering != Ordering::Greater,
            BinaryOp::AndAlso | BinaryOp::OrElse => false,
        }
    }

    /// Operator token used when rendering expressions.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::AndAlso => "&&",
            BinaryOp::OrElse => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical connective used to fold predicates together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl From<LogicalOp> for BinaryOp {
    fn from(op: LogicalOp) -> Self {
        match op {
            LogicalOp::And => BinaryOp::AndAlso,
            LogicalOp::Or => BinaryOp::OrElse,
        }
    }
}

/// String-matching operation of a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOp {
    StartsWith,
    EndsWith,
    Contains,
    Equals,
}

impl TextOp {
    /// Applies the operation. With `ignore_case` both sides are lowercased
    /// first.
    pub fn matches(self, text: &str, pattern: &str, ignore_case: bool) -> bool {
        if ignore_case {
            let text = text.to_lowercase();
            let pattern = pattern.to_lowercase();
            self.matches_exact(&text, &pattern)
        } else {
            self.matches_exact(text, pattern)
        }
    }

    fn matches_exact(self, text: &str, pattern: &str) -> bool {
        match self {
            TextOp::StartsWith => text.starts_with(pattern),
            TextOp::EndsWith => text.ends_with(pattern),
            TextOp::Contains => text.contains(pattern),
            TextOp::Equals => text == pattern,
        }
    }

    /// Method name used when rendering expressions.
    pub fn as_str(self) -> &'static str {
        match self {
            TextOp::StartsWith => "starts_with",
            TextOp::EndsWith => "ends_with",
            TextOp::Contains => "contains",
            TextOp::Equals => "equals",
        }
    }
}

impl fmt::Display for TextOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
