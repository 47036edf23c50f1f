//! Repository backends.
//!
//! Both backends consume a specification's expression: the in-memory store
//! evaluates the tree per entity, Postgres receives it translated into a
//! parameterised `WHERE` clause (see [`sql`]).

pub mod in_memory;
pub mod postgres;
pub mod sql;

pub use in_memory::InMemoryRepository;
pub use postgres::PostgresMovieRepository;
