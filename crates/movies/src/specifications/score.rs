use cinema_core::{DomainError, DomainResult, Expr, Specification};

use crate::{Movie, MovieField};

/// Movies scored at least `minimum` on the 0–10 quality scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MinimumScore {
    minimum: f64,
}

impl MinimumScore {
    pub const LOWEST: f64 = 0.0;
    pub const HIGHEST: f64 = 10.0;

    pub fn new(minimum: f64) -> DomainResult<Self> {
        if !minimum.is_finite() || !(Self::LOWEST..=Self::HIGHEST).contains(&minimum) {
            return Err(DomainError::validation(format!(
                "minimum score must be within {}..={}, got {minimum}",
                Self::LOWEST,
                Self::HIGHEST
            )));
        }
        Ok(Self { minimum })
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }
}

impl Specification<Movie> for MinimumScore {
    fn to_expression(&self) -> Expr<MovieField> {
        Expr::field(MovieField::Score).ge(self.minimum)
    }

    fn name(&self) -> &str {
        "MinimumScore"
    }
}
