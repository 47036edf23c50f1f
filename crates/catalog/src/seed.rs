//! Demo catalog used by the in-memory store and for seeding Postgres.
//!
//! Release dates are relative to `now` so the secondary media rule gives the
//! same answers whenever the binary runs. Ids are fixed (`…0001` to `…0006`).

use chrono::{DateTime, Months, Utc};
use uuid::Uuid;

use cinema_core::{DomainError, DomainResult};
use cinema_movies::{Movie, MovieId, MpaaRating};

/// Deterministic id of the `n`-th demo movie.
pub fn demo_id(n: u128) -> MovieId {
    MovieId::from_uuid(Uuid::from_u128(n))
}

pub fn demo_movies(now: DateTime<Utc>) -> DomainResult<Vec<Movie>> {
    let catalog: [(&str, u32, MpaaRating, &str, f64); 6] = [
        ("Toy Story", 30, MpaaRating::G, "Animation", 8.3),
        ("Paddington 2", 8, MpaaRating::Pg, "Family", 7.8),
        ("Inside Out 2", 1, MpaaRating::Pg, "Animation", 7.6),
        ("Dune: Part Two", 7, MpaaRating::Pg13, "Sci-Fi", 8.5),
        ("Oppenheimer", 14, MpaaRating::R, "Drama", 8.3),
        ("Civil War", 2, MpaaRating::R, "Action", 7.0),
    ];

    catalog
        .into_iter()
        .zip(1u128..)
        .map(|((name, months_ago, rating, genre, score), n)| {
            let released = now
                .checked_sub_months(Months::new(months_ago))
                .ok_or_else(|| DomainError::validation(format!("release date of {name} is out of range")))?;
            Movie::new(demo_id(n), name, released, rating, genre, score)
        })
        .collect()
}
