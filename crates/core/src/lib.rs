//! `cinema-core`: specification building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! entity identity, the predicate expression tree, the `Specification`
//! contract and the repository boundary that consumes it.

pub mod clock;
pub mod entity;
pub mod error;
pub mod expr;
pub mod id;
pub mod repository;
pub mod specification;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use expr::{CompareOp, Expr, FieldName, FieldRef, Operand, Record, Value, ValueKind};
pub use repository::{Repository, RepositoryError};
pub use specification::{
    AndSpecification, AnySpecification, ExpressionSpecification, NotSpecification,
    OrSpecification, Specification, SpecificationExt,
};
