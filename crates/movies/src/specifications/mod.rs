//! Named business rules over [`Movie`](crate::Movie).
//!
//! Each rule implements only `to_expression`; evaluation and composition come
//! from [`SpecificationExt`](cinema_core::SpecificationExt).

mod children;
mod genre;
mod score;
mod secondary_media;

pub use children::SuitableForChildren;
pub use genre::GenreIs;
pub use score::MinimumScore;
pub use secondary_media::AvailableOnSecondaryMedia;
