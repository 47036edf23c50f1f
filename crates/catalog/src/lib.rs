//! Movie catalog: the consumer side of the specification pattern.
//!
//! Turns user-facing search options into specifications and checks purchases
//! against the same named rules. Rule logic never appears here; it is always
//! delegated to `cinema-movies` specifications.

pub mod catalog;
pub mod criteria;
pub mod seed;

pub use catalog::{CatalogError, MovieCatalog, Purchase, PurchaseKind, PurchaseOutcome};
pub use criteria::SearchCriteria;
