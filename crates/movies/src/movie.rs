use core::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use cinema_core::{DomainError, DomainResult, Entity, FieldName, Record, Value, ValueKind};

cinema_core::uuid_id! {
    /// Movie identifier.
    pub struct MovieId;
}

/// MPAA classification, ordered from least to most restrictive.
///
/// The ordinal (`G = 1` .. `R = 4`) is the stored and compared form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MpaaRating {
    #[serde(rename = "G")]
    G,
    #[serde(rename = "PG")]
    Pg,
    #[serde(rename = "PG-13")]
    Pg13,
    #[serde(rename = "R")]
    R,
}

impl MpaaRating {
    pub const ALL: [MpaaRating; 4] = [MpaaRating::G, MpaaRating::Pg, MpaaRating::Pg13, MpaaRating::R];

    pub fn ordinal(self) -> i16 {
        match self {
            MpaaRating::G => 1,
            MpaaRating::Pg => 2,
            MpaaRating::Pg13 => 3,
            MpaaRating::R => 4,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|r| i64::from(r.ordinal()) == ordinal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MpaaRating::G => "G",
            MpaaRating::Pg => "PG",
            MpaaRating::Pg13 => "PG-13",
            MpaaRating::R => "R",
        }
    }
}

impl core::fmt::Display for MpaaRating {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MpaaRating {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "G" => Ok(MpaaRating::G),
            "PG" => Ok(MpaaRating::Pg),
            "PG-13" | "PG13" => Ok(MpaaRating::Pg13),
            "R" => Ok(MpaaRating::R),
            other => Err(DomainError::validation(format!("unknown MPAA rating: {other}"))),
        }
    }
}

impl From<MpaaRating> for Value {
    fn from(value: MpaaRating) -> Self {
        Value::Int(i64::from(value.ordinal()))
    }
}

/// Attributes of a [`Movie`] that rules may reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieField {
    Name,
    ReleaseDate,
    MpaaRating,
    Genre,
    Score,
}

impl MovieField {
    pub const ALL: [MovieField; 5] = [
        MovieField::Name,
        MovieField::ReleaseDate,
        MovieField::MpaaRating,
        MovieField::Genre,
        MovieField::Score,
    ];
}

impl FieldName for MovieField {
    fn name(&self) -> &'static str {
        match self {
            MovieField::Name => "name",
            MovieField::ReleaseDate => "release_date",
            MovieField::MpaaRating => "mpaa_rating",
            MovieField::Genre => "genre",
            MovieField::Score => "score",
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            MovieField::Name | MovieField::Genre => ValueKind::Text,
            MovieField::ReleaseDate => ValueKind::Timestamp,
            MovieField::MpaaRating => ValueKind::Int,
            MovieField::Score => ValueKind::Float,
        }
    }
}

/// Precision of stored timestamps (`TIMESTAMPTZ` keeps microseconds).
pub const TIMESTAMP_SUBSEC_DIGITS: u16 = 6;

/// Entity: Movie.
///
/// Attributes are read-only outside the construction boundary; the domain never
/// mutates a movie in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    id: MovieId,
    name: String,
    release_date: DateTime<Utc>,
    mpaa_rating: MpaaRating,
    genre: String,
    score: f64,
}

impl Movie {
    /// Build a movie at the persistence/factory boundary.
    ///
    /// Rejects a blank name and a non-finite score. The release date is
    /// truncated to microseconds so a stored movie equals the one in memory.
    pub fn new(
        id: MovieId,
        name: impl Into<String>,
        release_date: DateTime<Utc>,
        mpaa_rating: MpaaRating,
        genre: impl Into<String>,
        score: f64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !score.is_finite() {
            return Err(DomainError::validation(format!("score must be finite, got {score}")));
        }

        Ok(Self {
            id,
            name,
            release_date: release_date.trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS),
            mpaa_rating,
            genre: genre.into(),
            score,
        })
    }

    pub fn id(&self) -> MovieId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn release_date(&self) -> DateTime<Utc> {
        self.release_date
    }

    pub fn mpaa_rating(&self) -> MpaaRating {
        self.mpaa_rating
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

impl Entity for Movie {
    type Id = MovieId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Movie {
    type Field = MovieField;

    fn value_of(&self, field: MovieField) -> Value {
        match field {
            MovieField::Name => Value::Text(self.name.clone()),
            MovieField::ReleaseDate => Value::Timestamp(self.release_date),
            MovieField::MpaaRating => self.mpaa_rating.into(),
            MovieField::Genre => Value::Text(self.genre.clone()),
            MovieField::Score => Value::Float(self.score),
        }
    }
}
