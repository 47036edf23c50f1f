use cinema_core::{DomainError, DomainResult, Expr, Specification};

use crate::{Movie, MovieField};

/// Movies of exactly one genre (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreIs {
    genre: String,
}

impl GenreIs {
    pub fn new(genre: impl Into<String>) -> DomainResult<Self> {
        let genre = genre.into();
        if genre.trim().is_empty() {
            return Err(DomainError::validation("genre cannot be empty"));
        }
        Ok(Self { genre })
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }
}

impl Specification<Movie> for GenreIs {
    fn to_expression(&self) -> Expr<MovieField> {
        Expr::field(MovieField::Genre).eq(self.genre.as_str())
    }

    fn name(&self) -> &str {
        "GenreIs"
    }
}
