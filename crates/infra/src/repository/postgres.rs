//! Postgres-backed movie repository.
//!
//! ## Filtering
//!
//! `find`/`get_many` translate the specification's expression with
//! [`push_filter`](super::sql::push_filter) and let Postgres do the filtering;
//! no rule is re-implemented here.
//!
//! ## Connections
//!
//! Each operation acquires one pooled connection for its own duration. The
//! connection returns to the pool when the guard drops, on success, on error
//! and on cancellation alike.
//!
//! ## Error Mapping
//!
//! | Source | RepositoryError |
//! |--------|-----------------|
//! | any `sqlx::Error` (pool, network, database) | `DataAccess` carrying the original error |
//! | row column missing / wrong type | `Decode` |
//! | stored values violate `Movie` invariants | `Decode` |
//!
//! Errors are returned, not logged; spans here carry no `err` field.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::{Span, instrument};

use cinema_core::{Expr, Repository, RepositoryError};
use cinema_movies::{Movie, MovieField, MovieId, MpaaRating};

use super::sql::push_filter;

const SELECT_MOVIES: &str = "SELECT id, name, release_date, mpaa_rating, genre, score FROM movies";

const SELECT_MOVIE_BY_ID: &str =
    "SELECT id, name, release_date, mpaa_rating, genre, score FROM movies WHERE id = $1";

const CREATE_MOVIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS movies (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    release_date TIMESTAMPTZ NOT NULL,
    mpaa_rating SMALLINT NOT NULL CHECK (mpaa_rating BETWEEN 1 AND 4),
    genre TEXT NOT NULL,
    score DOUBLE PRECISION NOT NULL
)
"#;

const UPSERT_MOVIE: &str = r#"
INSERT INTO movies (id, name, release_date, mpaa_rating, genre, score)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (id) DO UPDATE SET
    name = EXCLUDED.name,
    release_date = EXCLUDED.release_date,
    mpaa_rating = EXCLUDED.mpaa_rating,
    genre = EXCLUDED.genre,
    score = EXCLUDED.score
"#;

/// Postgres-backed repository of movies.
///
/// `Send + Sync`; clones share the same pool.
#[derive(Debug, Clone)]
pub struct PostgresMovieRepository {
    pool: Arc<PgPool>,
}

impl PostgresMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(RepositoryError::data_access)?;
        Ok(Self::new(pool))
    }

    /// Create the `movies` table if it does not exist.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(RepositoryError::data_access)?;
        sqlx::query(CREATE_MOVIES_TABLE)
            .execute(&mut *conn)
            .await
            .map_err(RepositoryError::data_access)?;
        Ok(())
    }

    /// Insert or replace a movie (persistence boundary, used for seeding).
    #[instrument(skip(self, movie), fields(movie_id = %movie.id()))]
    pub async fn upsert(&self, movie: &Movie) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(RepositoryError::data_access)?;
        sqlx::query(UPSERT_MOVIE)
            .bind(*movie.id().as_uuid())
            .bind(movie.name())
            .bind(movie.release_date())
            .bind(movie.mpaa_rating().ordinal())
            .bind(movie.genre())
            .bind(movie.score())
            .execute(&mut *conn)
            .await
            .map_err(RepositoryError::data_access)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository<Movie> for PostgresMovieRepository {
    #[instrument(skip(self), fields(movie_id = %id))]
    async fn get_one(&self, id: &MovieId) -> Result<Option<Movie>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(RepositoryError::data_access)?;
        let row = sqlx::query(SELECT_MOVIE_BY_ID)
            .bind(*id.as_uuid())
            .fetch_optional(&mut *conn)
            .await
            .map_err(RepositoryError::data_access)?;

        row.as_ref().map(movie_from_row).transpose()
    }

    #[instrument(skip(self, filter), fields(filter = %filter, matched = tracing::field::Empty))]
    async fn find(&self, filter: &Expr<MovieField>) -> Result<Vec<Movie>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_MOVIES);
        builder.push(" WHERE ");
        push_filter(&mut builder, filter);
        tracing::debug!(sql = builder.sql(), "translated movie filter");

        let mut conn = self.pool.acquire().await.map_err(RepositoryError::data_access)?;
        let rows = builder
            .build()
            .fetch_all(&mut *conn)
            .await
            .map_err(RepositoryError::data_access)?;

        let movies = rows.iter().map(movie_from_row).collect::<Result<Vec<_>, _>>()?;
        Span::current().record("matched", movies.len());
        Ok(movies)
    }
}

fn movie_from_row(row: &PgRow) -> Result<Movie, RepositoryError> {
    let id: uuid::Uuid = column(row, "id")?;
    let name: String = column(row, "name")?;
    let release_date: DateTime<Utc> = column(row, "release_date")?;
    let rating: i16 = column(row, "mpaa_rating")?;
    let genre: String = column(row, "genre")?;
    let score: f64 = column(row, "score")?;

    let mpaa_rating = MpaaRating::from_ordinal(i64::from(rating))
        .ok_or_else(|| RepositoryError::decode(format!("mpaa_rating out of range: {rating}")))?;

    Movie::new(MovieId::from_uuid(id), name, release_date, mpaa_rating, genre, score)
        .map_err(|e| RepositoryError::decode(format!("movie {id}: {e}")))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::decode(format!("failed to read {name}: {e}")))
}
