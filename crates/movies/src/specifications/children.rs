use cinema_core::{Expr, Specification};

use crate::{Movie, MovieField, MpaaRating};

/// Movies children may watch: rated [`SuitableForChildren::MAX_RATING`] or lower.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SuitableForChildren;

impl SuitableForChildren {
    /// Most restrictive rating still considered suitable.
    pub const MAX_RATING: MpaaRating = MpaaRating::Pg;
}

impl Specification<Movie> for SuitableForChildren {
    fn to_expression(&self) -> Expr<MovieField> {
        Expr::field(MovieField::MpaaRating).le(Self::MAX_RATING)
    }

    fn name(&self) -> &str {
        "SuitableForChildren"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specifications::test_support::movie;
    use chrono::Utc;
    use cinema_core::SpecificationExt;

    #[test]
    fn g_and_pg_are_suitable() {
        assert!(SuitableForChildren.is_satisfied_by(&movie(MpaaRating::G, Utc::now())));
        assert!(SuitableForChildren.is_satisfied_by(&movie(MpaaRating::Pg, Utc::now())));
    }

    #[test]
    fn pg13_and_r_are_not_suitable() {
        assert!(!SuitableForChildren.is_satisfied_by(&movie(MpaaRating::Pg13, Utc::now())));
        assert!(!SuitableForChildren.is_satisfied_by(&movie(MpaaRating::R, Utc::now())));
    }

    #[test]
    fn expression_reads_as_rating_ceiling() {
        assert_eq!(SuitableForChildren.to_expression().to_string(), "mpaa_rating <= 2");
    }
}
