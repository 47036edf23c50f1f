//! Search options → specification.
//!
//! Replaces the old `get_list(for_kids_only, minimum_rating, available_on_cd)`
//! style of repository call: each enabled option selects a named rule and the
//! rules are combined with `and`.

use serde::{Deserialize, Serialize};

use cinema_core::{AnySpecification, DomainResult, Specification, SpecificationExt};
use cinema_movies::{AvailableOnSecondaryMedia, GenreIs, MinimumScore, Movie, SuitableForChildren};

/// What the user asked to see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub for_kids_only: bool,
    pub minimum_score: Option<f64>,
    pub on_secondary_media: bool,
    pub genre: Option<String>,
}

impl SearchCriteria {
    /// Combine the selected rules.
    ///
    /// `secondary_media` is the configured rule instance (grace period, clock).
    /// Invalid options (e.g. a minimum score of 11) fail here, before any query.
    /// With nothing selected the result matches every movie.
    pub fn to_specification(
        &self,
        secondary_media: &AvailableOnSecondaryMedia,
    ) -> DomainResult<Box<dyn Specification<Movie>>> {
        let mut rules: Vec<Box<dyn Specification<Movie>>> = Vec::new();

        if self.for_kids_only {
            rules.push(Box::new(SuitableForChildren));
        }
        if let Some(minimum) = self.minimum_score {
            rules.push(Box::new(MinimumScore::new(minimum)?));
        }
        if self.on_secondary_media {
            rules.push(Box::new(secondary_media.clone()));
        }
        if let Some(genre) = &self.genre {
            rules.push(Box::new(GenreIs::new(genre.clone())?));
        }

        Ok(rules
            .into_iter()
            .reduce(|acc, next| Box::new(acc.and(next)) as Box<dyn Specification<Movie>>)
            .unwrap_or_else(|| Box::new(AnySpecification)))
    }
}
