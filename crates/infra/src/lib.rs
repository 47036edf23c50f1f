//! Infrastructure layer: repository backends and configuration.

pub mod config;
pub mod repository;

pub use config::{Config, ConfigError, StoreConfig};
pub use repository::{InMemoryRepository, PostgresMovieRepository};
