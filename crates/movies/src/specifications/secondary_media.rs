use std::sync::Arc;

use chrono::{DateTime, Months, SubsecRound, Utc};
use cinema_core::{Clock, DomainError, DomainResult, Expr, Specification, SystemClock};

use crate::{Movie, MovieField, TIMESTAMP_SUBSEC_DIGITS};

/// Movies already out on secondary media (CD/DVD/download).
///
/// A movie qualifies once its release date is at least the grace period before
/// "now". The comparison is inclusive and months are calendar months, clamped
/// to the end of shorter months (Aug 31 minus 6 months is Feb 28/29).
///
/// "Now" comes from the injected [`Clock`] and is read on every
/// `to_expression` call. Inject a [`FixedClock`](cinema_core::FixedClock) to
/// pin it for the lifetime of the specification.
#[derive(Debug, Clone)]
pub struct AvailableOnSecondaryMedia {
    grace_months: u32,
    clock: Arc<dyn Clock>,
}

impl AvailableOnSecondaryMedia {
    /// Grace period used by [`AvailableOnSecondaryMedia::new`].
    pub const DEFAULT_GRACE_MONTHS: u32 = 6;

    /// Default grace period, system clock.
    pub fn new() -> Self {
        Self {
            grace_months: Self::DEFAULT_GRACE_MONTHS,
            clock: Arc::new(SystemClock),
        }
    }

    /// Override the grace period. Negative values are rejected.
    pub fn with_grace_months(mut self, months: i32) -> DomainResult<Self> {
        self.grace_months = u32::try_from(months).map_err(|_| {
            DomainError::validation(format!("grace period cannot be negative, got {months} months"))
        })?;
        Ok(self)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn grace_months(&self) -> u32 {
        self.grace_months
    }

    /// Latest release date that still qualifies, as of the clock's "now".
    ///
    /// Truncated to the stored timestamp precision. `None` when the
    /// subtraction leaves chrono's supported range.
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.clock
            .now()
            .checked_sub_months(Months::new(self.grace_months))
            .map(|cutoff| cutoff.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS))
    }
}

impl Default for AvailableOnSecondaryMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl Specification<Movie> for AvailableOnSecondaryMedia {
    fn to_expression(&self) -> Expr<MovieField> {
        match self.cutoff() {
            Some(cutoff) => Expr::field(MovieField::ReleaseDate).le(cutoff),
            None => Expr::never(),
        }
    }

    fn name(&self) -> &str {
        "AvailableOnSecondaryMedia"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MpaaRating;
    use crate::specifications::test_support::movie;
    use chrono::{Duration, TimeZone};
    use cinema_core::{FixedClock, SpecificationExt};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn at_now() -> AvailableOnSecondaryMedia {
        AvailableOnSecondaryMedia::new().with_clock(Arc::new(FixedClock::new(now())))
    }

    #[test]
    fn default_grace_period_is_six_months() {
        assert_eq!(AvailableOnSecondaryMedia::new().grace_months(), 6);
        assert_eq!(
            at_now().cutoff(),
            Some(Utc.with_ymd_and_hms(2026, 4, 16, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn release_exactly_at_cutoff_qualifies() {
        let released = Utc.with_ymd_and_hms(2026, 4, 16, 12, 0, 0).unwrap();
        assert!(at_now().is_satisfied_by(&movie(MpaaRating::R, released)));
    }

    #[test]
    fn release_one_second_after_cutoff_does_not_qualify() {
        let released = Utc.with_ymd_and_hms(2026, 4, 16, 12, 0, 1).unwrap();
        assert!(!at_now().is_satisfied_by(&movie(MpaaRating::R, released)));
    }

    #[test]
    fn sub_microsecond_precision_never_decides_the_boundary() {
        let base = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let clock = FixedClock::new(base + Duration::nanoseconds(1_900));
        let spec = AvailableOnSecondaryMedia::new().with_clock(Arc::new(clock));

        let cutoff = Utc.with_ymd_and_hms(2026, 4, 16, 12, 0, 0).unwrap() + Duration::microseconds(1);
        assert_eq!(spec.cutoff(), Some(cutoff));

        // Stored with microsecond precision, this release lands on the cutoff.
        let released = movie(MpaaRating::G, cutoff + Duration::nanoseconds(500));
        assert_eq!(released.release_date(), cutoff);
        assert!(spec.is_satisfied_by(&released));
    }

    #[test]
    fn old_release_qualifies_and_recent_release_does_not() {
        assert!(at_now().is_satisfied_by(&movie(MpaaRating::G, now() - Duration::days(240))));
        assert!(!at_now().is_satisfied_by(&movie(MpaaRating::G, now() - Duration::days(30))));
    }

    #[test]
    fn custom_grace_period_moves_cutoff() {
        let spec = at_now().with_grace_months(1).unwrap();
        let released = now() - Duration::days(40);

        assert!(spec.is_satisfied_by(&movie(MpaaRating::G, released)));
        assert!(!at_now().is_satisfied_by(&movie(MpaaRating::G, released)));
    }

    #[test]
    fn zero_grace_period_admits_anything_already_released() {
        let spec = at_now().with_grace_months(0).unwrap();

        assert!(spec.is_satisfied_by(&movie(MpaaRating::G, now())));
        assert!(!spec.is_satisfied_by(&movie(MpaaRating::G, now() + Duration::seconds(1))));
    }

    #[test]
    fn negative_grace_period_fails_at_construction() {
        match AvailableOnSecondaryMedia::new().with_grace_months(-1) {
            Err(DomainError::Validation(_)) => {}
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn end_of_month_is_clamped() {
        let end_of_august = Utc.with_ymd_and_hms(2026, 8, 31, 0, 0, 0).unwrap();
        let spec = AvailableOnSecondaryMedia::new().with_clock(Arc::new(FixedClock::new(end_of_august)));

        assert_eq!(spec.cutoff(), Some(Utc.with_ymd_and_hms(2026, 2, 28, 0, 0, 0).unwrap()));
    }

    #[test]
    fn unrepresentable_cutoff_matches_nothing() {
        let spec = AvailableOnSecondaryMedia::new()
            .with_clock(Arc::new(FixedClock::new(DateTime::<Utc>::MIN_UTC)));

        assert_eq!(spec.to_expression(), Expr::never());
        assert!(!spec.is_satisfied_by(&movie(MpaaRating::G, DateTime::<Utc>::MIN_UTC)));
    }

    #[test]
    fn each_expression_reads_the_clock_again() {
        #[derive(Debug)]
        struct Ticking(std::sync::atomic::AtomicI64);

        impl Clock for Ticking {
            fn now(&self) -> DateTime<Utc> {
                let day = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap() + Duration::days(day)
            }
        }

        let spec = AvailableOnSecondaryMedia::new().with_clock(Arc::new(Ticking(0.into())));
        assert_ne!(spec.to_expression(), spec.to_expression());
    }
}
