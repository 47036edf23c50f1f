//! The `Specification` contract.
//!
//! A specification is a named, reusable business rule about an entity type.
//! Implementors provide exactly one thing, the rule as an [`Expr`]. Everything
//! else (direct evaluation, composition) lives on [`SpecificationExt`], which
//! is blanket-implemented and therefore cannot be overridden: evaluating a
//! specification against one entity always means evaluating its expression.
//!
//! Specifications hold configuration only (thresholds, an injected clock), never
//! repository or storage state, and are `Send + Sync` so one instance can be
//! shared across tasks.

use core::fmt;
use std::sync::Arc;

use crate::expr::{Expr, Record};

/// A boolean business rule over `T`.
pub trait Specification<T: Record>: Send + Sync {
    /// The rule as an inspectable predicate expression.
    ///
    /// Time-relative rules read their clock here, so every call may yield a
    /// freshly anchored expression.
    fn to_expression(&self) -> Expr<T::Field>;

    /// Human-readable label for logs. Defaults to the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }
}

/// Operations every specification gets for free.
pub trait SpecificationExt<T: Record>: Specification<T> {
    /// Whether `entity` satisfies the rule.
    ///
    /// Always identical to `self.to_expression().evaluate(entity)`.
    fn is_satisfied_by(&self, entity: &T) -> bool {
        self.to_expression().evaluate(entity)
    }

    /// Both rules must hold.
    fn and<S>(self, other: S) -> AndSpecification<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        AndSpecification::new(self, other)
    }

    /// Either rule must hold.
    fn or<S>(self, other: S) -> OrSpecification<Self, S>
    where
        Self: Sized,
        S: Specification<T>,
    {
        OrSpecification::new(self, other)
    }

    /// The rule must not hold.
    fn not(self) -> NotSpecification<Self>
    where
        Self: Sized,
    {
        NotSpecification::new(self)
    }
}

impl<T: Record, S: Specification<T> + ?Sized> SpecificationExt<T> for S {}

impl<T: Record, S: Specification<T> + ?Sized> Specification<T> for &S {
    fn to_expression(&self) -> Expr<T::Field> {
        (**self).to_expression()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: Record, S: Specification<T> + ?Sized> Specification<T> for Box<S> {
    fn to_expression(&self) -> Expr<T::Field> {
        (**self).to_expression()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: Record, S: Specification<T> + ?Sized> Specification<T> for Arc<S> {
    fn to_expression(&self) -> Expr<T::Field> {
        (**self).to_expression()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Conjunction of two specifications.
#[derive(Debug, Clone)]
pub struct AndSpecification<A, B> {
    left: A,
    right: B,
}

impl<A, B> AndSpecification<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<T, A, B> Specification<T> for AndSpecification<A, B>
where
    T: Record,
    A: Specification<T>,
    B: Specification<T>,
{
    fn to_expression(&self) -> Expr<T::Field> {
        self.left.to_expression().and(self.right.to_expression())
    }
}

/// Disjunction of two specifications.
#[derive(Debug, Clone)]
pub struct OrSpecification<A, B> {
    left: A,
    right: B,
}

impl<A, B> OrSpecification<A, B> {
    pub fn new(left: A, right: B) -> Self {
        Self { left, right }
    }
}

impl<T, A, B> Specification<T> for OrSpecification<A, B>
where
    T: Record,
    A: Specification<T>,
    B: Specification<T>,
{
    fn to_expression(&self) -> Expr<T::Field> {
        self.left.to_expression().or(self.right.to_expression())
    }
}

/// Negation of a specification.
#[derive(Debug, Clone)]
pub struct NotSpecification<A> {
    inner: A,
}

impl<A> NotSpecification<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

impl<T, A> Specification<T> for NotSpecification<A>
where
    T: Record,
    A: Specification<T>,
{
    fn to_expression(&self) -> Expr<T::Field> {
        self.inner.to_expression().negate()
    }
}

/// Satisfied by every entity. Neutral starting point when composing optional
/// criteria with `and`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AnySpecification;

impl<T: Record> Specification<T> for AnySpecification {
    fn to_expression(&self) -> Expr<T::Field> {
        Expr::always()
    }
}

/// Adapts a raw expression to the specification contract.
pub struct ExpressionSpecification<T: Record> {
    expr: Expr<T::Field>,
}

impl<T: Record> ExpressionSpecification<T> {
    pub fn new(expr: Expr<T::Field>) -> Self {
        Self { expr }
    }

    pub fn expression(&self) -> &Expr<T::Field> {
        &self.expr
    }
}

impl<T: Record> Clone for ExpressionSpecification<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
        }
    }
}

impl<T: Record> fmt::Debug for ExpressionSpecification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionSpecification")
            .field("expr", &self.expr)
            .finish()
    }
}

impl<T: Record> Specification<T> for ExpressionSpecification<T> {
    fn to_expression(&self) -> Expr<T::Field> {
        self.expr.clone()
    }
}
