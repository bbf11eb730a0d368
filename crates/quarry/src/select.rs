//! The Select builder and compiled projections.
//!
//! A projection maps members of an entity `T` onto members of a result type
//! `R`. Mappings are only validated when [`SelectBuilder::build`] runs, so
//! they can be added in any order and replaced freely before that.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::error::{QueryError, Result};
use crate::expr::{Expr, MemberBinding, Param};
use crate::lambda::{Lambda, Selector};
use crate::literal::Literal;
use crate::traits::{Entity, Projectable, Shape};

/// One source-to-destination mapping.
///
/// With no destination the mapping is implicit: the source must be a plain
/// member access and its member name is reused on `R`.
pub struct ProjectionMapping<T> {
    pub selector: Selector<T>,
    pub destination: Option<String>,
}

impl<T> Clone for ProjectionMapping<T> {
    fn clone(&self) -> Self {
        ProjectionMapping {
            selector: self.selector.clone(),
            destination: self.destination.clone(),
        }
    }
}

impl<T> fmt::Debug for ProjectionMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionMapping")
            .field("selector", &self.selector.to_string())
            .field("destination", &self.destination)
            .finish()
    }
}

impl<T> ProjectionMapping<T> {
    fn destination(&self) -> Result<&str> {
        match &self.destination {
            Some(destination) => Ok(destination.as_str()),
            None => self.selector.body().as_member_access().ok_or_else(|| {
                QueryError::shape_mismatch(
                    self.selector.body().to_string(),
                    "implicit projection source must be a member access",
                )
            }),
        }
    }
}

/// Accumulates projection mappings from `T` to `R`.
pub struct SelectBuilder<T, R> {
    mappings: Vec<ProjectionMapping<T>>,
    _result: PhantomData<fn() -> R>,
}

impl<T, R> Default for SelectBuilder<T, R> {
    fn default() -> Self {
        SelectBuilder {
            mappings: Vec::new(),
            _result: PhantomData,
        }
    }
}

impl<T, R> Clone for SelectBuilder<T, R> {
    fn clone(&self) -> Self {
        SelectBuilder {
            mappings: self.mappings.clone(),
            _result: PhantomData,
        }
    }
}

impl<T, R> fmt::Debug for SelectBuilder<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.mappings).finish()
    }
}

impl<T, R> SelectBuilder<T, R> {
    pub fn new() -> Self {
        SelectBuilder::default()
    }

    /// Adds an implicit mapping: the source member keeps its name on `R`.
    pub fn add(&mut self, selector: Selector<T>) -> &mut Self {
        self.mappings.push(ProjectionMapping {
            selector,
            destination: None,
        });
        self
    }

    /// Adds an explicit mapping onto `destination`.
    pub fn add_to(&mut self, selector: Selector<T>, destination: impl Into<String>) -> &mut Self {
        self.mappings.push(ProjectionMapping {
            selector,
            destination: Some(destination.into()),
        });
        self
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn mappings(&self) -> &[ProjectionMapping<T>] {
        &self.mappings
    }
}

impl<T: Shape, R: Shape> SelectBuilder<T, R> {
    /// Compiles the mappings into one construction lambda.
    ///
    /// When two mappings target the same destination the later one replaces
    /// the earlier, keeping the earlier one's position.
    ///
    /// Fails with `EmptyProjection` when nothing was added and with
    /// `ShapeMismatch` when a source or destination does not fit, including
    /// a source whose kind cannot be inferred.
    pub fn build(&self) -> Result<Projection<T, R>> {
        let Some(first) = self.mappings.first() else {
            return Err(QueryError::EmptyProjection);
        };
        let param = first.selector.param().clone();

        let mut bindings: Vec<MemberBinding> = Vec::with_capacity(self.mappings.len());
        for mapping in &self.mappings {
            let destination = mapping.destination()?;
            mapping.selector.check_members()?;

            let Some(field) = R::field(destination) else {
                return Err(QueryError::shape_mismatch(
                    destination,
                    format!("no such member on {}", R::shape_name()),
                ));
            };
            match mapping.selector.kind() {
                Some(kind) if kind != field.kind => {
                    return Err(QueryError::shape_mismatch(
                        destination,
                        format!(
                            "cannot assign {kind} from `{}` to {} member",
                            mapping.selector,
                            field.kind
                        ),
                    ));
                }
                Some(_) => {}
                // null fits any member; `apply` decides whether it converts
                None if matches!(
                    mapping.selector.body().reduce(),
                    Expr::Constant(Literal::Null)
                ) => {}
                None => {
                    return Err(QueryError::shape_mismatch(
                        destination,
                        format!("cannot infer the kind of `{}`", mapping.selector),
                    ));
                }
            }

            let source = mapping.selector.body_for(&param);
            match bindings.iter_mut().find(|b| b.member == destination) {
                Some(existing) => existing.source = source,
                None => bindings.push(MemberBinding {
                    member: destination.to_string(),
                    source,
                }),
            }
        }

        debug!(
            count = self.mappings.len(),
            members = bindings.len(),
            result = R::shape_name(),
            "built projection"
        );
        let body = Expr::New {
            shape: R::shape_name(),
            bindings,
        };
        Ok(Projection {
            lambda: Lambda::from_parts(param, body),
            _result: PhantomData,
        })
    }
}

/// A compiled projection: `|x| R { member: source, .. }`.
pub struct Projection<T, R> {
    lambda: Lambda<T>,
    _result: PhantomData<fn() -> R>,
}

impl<T, R> Clone for Projection<T, R> {
    fn clone(&self) -> Self {
        Projection {
            lambda: self.lambda.clone(),
            _result: PhantomData,
        }
    }
}

impl<T, R> fmt::Debug for Projection<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Projection").field(&self.lambda).finish()
    }
}

impl<T, R> fmt::Display for Projection<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.lambda, f)
    }
}

impl<T, R> Projection<T, R> {
    /// The construction lambda handed to drivers.
    pub fn expression(&self) -> &Lambda<T> {
        &self.lambda
    }

    pub fn param(&self) -> &Param {
        self.lambda.param()
    }

    pub fn bindings(&self) -> &[MemberBinding] {
        match self.lambda.body() {
            Expr::New { bindings, .. } => bindings,
            _ => &[],
        }
    }
}

impl<T: Entity, R: Projectable> Projection<T, R> {
    /// Builds one `R` from `item`.
    ///
    /// Fails with `ShapeMismatch` if a value cannot be converted into its
    /// destination member.
    pub fn apply(&self, item: &T) -> Result<R> {
        let mut result = R::default();
        for binding in self.bindings() {
            let value = binding.source.evaluate(self.param(), item);
            if !result.set_field(&binding.member, value) {
                return Err(QueryError::shape_mismatch(
                    binding.member.as_str(),
                    format!(
                        "value of `{}` does not convert into {}",
                        binding.source,
                        R::shape_name()
                    ),
                ));
            }
        }
        Ok(result)
    }
}
