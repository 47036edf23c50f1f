//! Catalog service: search and purchase checks.
//!
//! The service only selects specifications and hands them to the repository
//! (search) or evaluates them against one fetched movie (purchases). It never
//! inspects movie attributes to make a decision itself.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use cinema_core::{DomainError, Repository, RepositoryError, Specification, SpecificationExt};
use cinema_movies::{AvailableOnSecondaryMedia, Movie, MovieId, SuitableForChildren};

use crate::criteria::SearchCriteria;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The search options could not be turned into a specification.
    #[error(transparent)]
    InvalidCriteria(#[from] DomainError),

    /// The repository failed; the source error is untouched.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What is being bought.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseKind {
    AdultTicket,
    ChildTicket,
    SecondaryMedia,
}

/// A completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub movie_id: MovieId,
    pub movie_name: String,
    pub kind: PurchaseKind,
}

/// Result of a purchase attempt.
///
/// Refusals are ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased(Purchase),
    MovieNotFound(MovieId),
    NotSuitableForChildren,
    NoSecondaryMediaVersion,
}

impl PurchaseOutcome {
    pub fn is_purchased(&self) -> bool {
        matches!(self, PurchaseOutcome::Purchased(_))
    }

    /// User-facing message.
    pub fn message(&self) -> String {
        match self {
            PurchaseOutcome::Purchased(p) => match p.kind {
                PurchaseKind::AdultTicket | PurchaseKind::ChildTicket => {
                    format!("You've bought a ticket for {}", p.movie_name)
                }
                PurchaseKind::SecondaryMedia => format!("You've bought a copy of {}", p.movie_name),
            },
            PurchaseOutcome::MovieNotFound(id) => format!("Movie {id} was not found"),
            PurchaseOutcome::NotSuitableForChildren => "The movie is not suitable for children".to_string(),
            PurchaseOutcome::NoSecondaryMediaVersion => {
                "The movie doesn't have a secondary media version".to_string()
            }
        }
    }
}

/// Movie search and purchase checks over any movie repository.
#[derive(Debug)]
pub struct MovieCatalog<R> {
    repository: R,
    secondary_media: AvailableOnSecondaryMedia,
}

impl<R> MovieCatalog<R>
where
    R: Repository<Movie>,
{
    /// `secondary_media` is the configured rule instance used for both
    /// searching and secondary media purchases.
    pub fn new(repository: R, secondary_media: AvailableOnSecondaryMedia) -> Self {
        Self {
            repository,
            secondary_media,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn secondary_media(&self) -> &AvailableOnSecondaryMedia {
        &self.secondary_media
    }

    /// Movies matching `criteria`, in unspecified order.
    #[instrument(skip(self), err)]
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Movie>, CatalogError> {
        let spec = criteria.to_specification(&self.secondary_media)?;
        let movies = self.repository.get_many(spec.as_ref()).await?;
        tracing::info!(matched = movies.len(), "catalog search");
        Ok(movies)
    }

    /// One movie by id. Absence is `Ok(None)`.
    pub async fn movie(&self, id: MovieId) -> Result<Option<Movie>, CatalogError> {
        Ok(self.repository.get_one(&id).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn buy(&self, kind: PurchaseKind, id: MovieId) -> Result<PurchaseOutcome, CatalogError> {
        let Some(movie) = self.repository.get_one(&id).await? else {
            tracing::info!(movie_id = %id, "purchase refused: movie not found");
            return Ok(PurchaseOutcome::MovieNotFound(id));
        };

        let requirement: Option<(&dyn Specification<Movie>, PurchaseOutcome)> = match kind {
            PurchaseKind::AdultTicket => None,
            PurchaseKind::ChildTicket => Some((
                &SuitableForChildren as &dyn Specification<Movie>,
                PurchaseOutcome::NotSuitableForChildren,
            )),
            PurchaseKind::SecondaryMedia => Some((
                &self.secondary_media as &dyn Specification<Movie>,
                PurchaseOutcome::NoSecondaryMediaVersion,
            )),
        };

        let outcome = match requirement {
            Some((rule, refusal)) if !rule.is_satisfied_by(&movie) => {
                tracing::info!(movie_id = %id, rule = rule.name(), "purchase refused");
                refusal
            }
            _ => PurchaseOutcome::Purchased(Purchase {
                movie_id: id,
                movie_name: movie.name().to_string(),
                kind,
            }),
        };
        tracing::info!(movie_id = %id, ?kind, purchased = outcome.is_purchased(), "purchase checked");
        Ok(outcome)
    }

    pub async fn buy_adult_ticket(&self, id: MovieId) -> Result<PurchaseOutcome, CatalogError> {
        self.buy(PurchaseKind::AdultTicket, id).await
    }

    pub async fn buy_child_ticket(&self, id: MovieId) -> Result<PurchaseOutcome, CatalogError> {
        self.buy(PurchaseKind::ChildTicket, id).await
    }

    pub async fn buy_secondary_media(&self, id: MovieId) -> Result<PurchaseOutcome, CatalogError> {
        self.buy(PurchaseKind::SecondaryMedia, id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use cinema_core::{Expr, FixedClock};
    use cinema_infra::InMemoryRepository;
    use cinema_movies::MovieField;

    use super::*;
    use crate::seed::{demo_id, demo_movies};

    const TOY_STORY: u128 = 1;
    const INSIDE_OUT_2: u128 = 3;
    const DUNE: u128 = 4;
    const CIVIL_WAR: u128 = 6;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn catalog() -> MovieCatalog<InMemoryRepository<Movie>> {
        let repo = InMemoryRepository::with_entities(demo_movies(now()).unwrap());
        let secondary = AvailableOnSecondaryMedia::new().with_clock(Arc::new(FixedClock::new(now())));
        MovieCatalog::new(repo, secondary)
    }

    fn names(movies: &[Movie]) -> HashSet<&str> {
        movies.iter().map(|m| m.name()).collect()
    }

    #[tokio::test]
    async fn search_without_options_lists_everything() {
        let found = catalog().search(&SearchCriteria::default()).await.unwrap();
        assert_eq!(found.len(), 6);
    }

    #[tokio::test]
    async fn search_for_kids_on_secondary_media() {
        let criteria = SearchCriteria {
            for_kids_only: true,
            on_secondary_media: true,
            ..SearchCriteria::default()
        };
        let found = catalog().search(&criteria).await.unwrap();
        assert_eq!(names(&found), HashSet::from(["Toy Story", "Paddington 2"]));
    }

    #[tokio::test]
    async fn search_by_score_and_genre() {
        let criteria = SearchCriteria {
            minimum_score: Some(8.0),
            genre: Some("Drama".to_string()),
            ..SearchCriteria::default()
        };
        let found = catalog().search(&criteria).await.unwrap();
        assert_eq!(names(&found), HashSet::from(["Oppenheimer"]));
    }

    #[tokio::test]
    async fn search_with_invalid_option_is_rejected() {
        let criteria = SearchCriteria {
            minimum_score: Some(-1.0),
            ..SearchCriteria::default()
        };
        let err = catalog().search(&criteria).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidCriteria(_)));
    }

    #[tokio::test]
    async fn movie_lookup_distinguishes_absence() {
        let catalog = catalog();
        let found = catalog.movie(demo_id(TOY_STORY)).await.unwrap();
        assert_eq!(found.map(|m| m.name().to_string()), Some("Toy Story".to_string()));
        assert_eq!(catalog.movie(MovieId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn adult_ticket_is_always_sold() {
        let outcome = catalog().buy_adult_ticket(demo_id(CIVIL_WAR)).await.unwrap();
        assert_eq!(
            outcome,
            PurchaseOutcome::Purchased(Purchase {
                movie_id: demo_id(CIVIL_WAR),
                movie_name: "Civil War".to_string(),
                kind: PurchaseKind::AdultTicket,
            })
        );
        assert_eq!(outcome.message(), "You've bought a ticket for Civil War");
    }

    #[tokio::test]
    async fn child_ticket_requires_suitable_rating() {
        let catalog = catalog();

        let sold = catalog.buy_child_ticket(demo_id(INSIDE_OUT_2)).await.unwrap();
        assert!(sold.is_purchased());

        let refused = catalog.buy_child_ticket(demo_id(DUNE)).await.unwrap();
        assert_eq!(refused, PurchaseOutcome::NotSuitableForChildren);
        assert_eq!(refused.message(), "The movie is not suitable for children");
    }

    #[tokio::test]
    async fn secondary_media_requires_grace_period_elapsed() {
        let catalog = catalog();

        let sold = catalog.buy_secondary_media(demo_id(DUNE)).await.unwrap();
        assert!(sold.is_purchased());
        assert_eq!(sold.message(), "You've bought a copy of Dune: Part Two");

        let refused = catalog.buy_secondary_media(demo_id(INSIDE_OUT_2)).await.unwrap();
        assert_eq!(refused, PurchaseOutcome::NoSecondaryMediaVersion);
    }

    #[tokio::test]
    async fn purchase_of_missing_movie_is_an_outcome() {
        let missing = MovieId::new();
        let outcome = catalog().buy_child_ticket(missing).await.unwrap();

        assert_eq!(outcome, PurchaseOutcome::MovieNotFound(missing));
        assert_eq!(outcome.message(), format!("Movie {missing} was not found"));
    }

    #[tokio::test]
    async fn purchase_and_search_agree() {
        let catalog = catalog();
        let criteria = SearchCriteria {
            on_secondary_media: true,
            ..SearchCriteria::default()
        };
        let available: HashSet<MovieId> = catalog
            .search(&criteria)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id())
            .collect();

        for n in 1..=6 {
            let outcome = catalog.buy_secondary_media(demo_id(n)).await.unwrap();
            assert_eq!(outcome.is_purchased(), available.contains(&demo_id(n)), "movie {n}");
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Offline;

    struct OfflineRepository;

    #[async_trait::async_trait]
    impl Repository<Movie> for OfflineRepository {
        async fn get_one(&self, _id: &MovieId) -> Result<Option<Movie>, RepositoryError> {
            Err(RepositoryError::data_access(Offline))
        }

        async fn find(&self, _filter: &Expr<MovieField>) -> Result<Vec<Movie>, RepositoryError> {
            Err(RepositoryError::data_access(Offline))
        }
    }

    #[tokio::test]
    async fn data_access_failures_propagate_unchanged() {
        let catalog = MovieCatalog::new(OfflineRepository, AvailableOnSecondaryMedia::new());

        let err = catalog.buy_adult_ticket(demo_id(TOY_STORY)).await.unwrap_err();
        match err {
            CatalogError::Repository(RepositoryError::DataAccess(source)) => {
                assert!(source.downcast_ref::<Offline>().is_some());
            }
            other => panic!("Expected DataAccess, got {other:?}"),
        }

        let err = catalog.search(&SearchCriteria::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }
}
