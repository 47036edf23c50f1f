//! Movies domain module.
//!
//! The `Movie` entity and the named business rules that judge it. Rules are
//! pure: no IO, no storage, no UI state.

pub mod movie;
pub mod specifications;

pub use movie::{Movie, MovieField, MovieId, MpaaRating, TIMESTAMP_SUBSEC_DIGITS};
pub use specifications::{AvailableOnSecondaryMedia, GenreIs, MinimumScore, SuitableForChildren};
