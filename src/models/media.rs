//! Media model and category-specific attribute types.
//!
//! Each physical item is one media record carrying a closed category tag
//! plus an optional bundle of category-specific attributes, stored as flat
//! nullable columns on the same row. Only the columns matching the tag are
//! ever populated.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Media category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Book,
    Dvd,
    Cd,
    Board,
}

impl MediaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Book => "book",
            MediaCategory::Dvd => "dvd",
            MediaCategory::Cd => "cd",
            MediaCategory::Board => "board",
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MediaCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "book" => Ok(MediaCategory::Book),
            "dvd" => Ok(MediaCategory::Dvd),
            "cd" => Ok(MediaCategory::Cd),
            "board" => Ok(MediaCategory::Board),
            _ => Err(format!("Invalid media category: {}", s)),
        }
    }
}

// SQLx conversion for MediaCategory (stored as text)
impl sqlx::Type<Postgres> for MediaCategory {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for MediaCategory {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for MediaCategory {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Category-specific attribute bundle (tagged union, one variant per category)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryDetails {
    Book {
        nb_pages: Option<i32>,
    },
    Dvd {
        genre: Option<String>,
    },
    Cd {
        release_date: Option<NaiveDate>,
    },
    Board {
        players_min: Option<i32>,
        players_max: Option<i32>,
    },
}

impl CategoryDetails {
    /// The category this bundle belongs to
    pub fn category(&self) -> MediaCategory {
        match self {
            CategoryDetails::Book { .. } => MediaCategory::Book,
            CategoryDetails::Dvd { .. } => MediaCategory::Dvd,
            CategoryDetails::Cd { .. } => MediaCategory::Cd,
            CategoryDetails::Board { .. } => MediaCategory::Board,
        }
    }

    /// An empty bundle for the given category
    pub fn empty(category: MediaCategory) -> Self {
        match category {
            MediaCategory::Book => CategoryDetails::Book { nb_pages: None },
            MediaCategory::Dvd => CategoryDetails::Dvd { genre: None },
            MediaCategory::Cd => CategoryDetails::Cd { release_date: None },
            MediaCategory::Board => CategoryDetails::Board {
                players_min: None,
                players_max: None,
            },
        }
    }

    /// Rebuild the bundle from the flat column representation
    pub fn from_columns(category: MediaCategory, columns: MediaAttributeColumns) -> Self {
        match category {
            MediaCategory::Book => CategoryDetails::Book {
                nb_pages: columns.nb_pages,
            },
            MediaCategory::Dvd => CategoryDetails::Dvd {
                genre: columns.genre,
            },
            MediaCategory::Cd => CategoryDetails::Cd {
                release_date: columns.release_date,
            },
            MediaCategory::Board => CategoryDetails::Board {
                players_min: columns.players_min,
                players_max: columns.players_max,
            },
        }
    }

    /// Explode the bundle into the flat column representation
    pub fn into_columns(self) -> MediaAttributeColumns {
        let mut columns = MediaAttributeColumns::default();
        match self {
            CategoryDetails::Book { nb_pages } => columns.nb_pages = nb_pages,
            CategoryDetails::Dvd { genre } => columns.genre = genre,
            CategoryDetails::Cd { release_date } => columns.release_date = release_date,
            CategoryDetails::Board {
                players_min,
                players_max,
            } => {
                columns.players_min = players_min;
                columns.players_max = players_max;
            }
        }
        columns
    }
}

/// Flat nullable columns backing [`CategoryDetails`] in the media table
#[derive(Debug, Clone, Default)]
pub struct MediaAttributeColumns {
    pub nb_pages: Option<i32>,
    pub genre: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub players_min: Option<i32>,
    pub players_max: Option<i32>,
}

/// Internal row structure for media queries (flat columns)
#[derive(Debug, Clone, FromRow)]
pub struct MediaRow {
    id: i32,
    name: String,
    author: String,
    category: MediaCategory,
    available: bool,
    borrower_id: Option<i32>,
    loan_start_date: Option<NaiveDate>,
    nb_pages: Option<i32>,
    genre: Option<String>,
    release_date: Option<NaiveDate>,
    players_min: Option<i32>,
    players_max: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<MediaRow> for Media {
    fn from(row: MediaRow) -> Self {
        let details = CategoryDetails::from_columns(
            row.category,
            MediaAttributeColumns {
                nb_pages: row.nb_pages,
                genre: row.genre,
                release_date: row.release_date,
                players_min: row.players_min,
                players_max: row.players_max,
            },
        );
        Media {
            id: row.id,
            name: row.name,
            author: row.author,
            category: row.category,
            available: row.available,
            borrower_id: row.borrower_id,
            loan_start_date: row.loan_start_date,
            details,
            created_at: row.created_at,
        }
    }
}

/// Full media model (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Media {
    pub id: i32,
    /// Title (or game name)
    pub name: String,
    /// Author, director, artist or game designer depending on category
    pub author: String,
    pub category: MediaCategory,
    /// True iff the item has no open loan. Mutated only by the loan ledger.
    pub available: bool,
    /// Current borrower while on loan
    pub borrower_id: Option<i32>,
    pub loan_start_date: Option<NaiveDate>,
    pub details: CategoryDetails,
    pub created_at: DateTime<Utc>,
}

/// Media query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct MediaQuery {
    pub category: Option<MediaCategory>,
    /// When true, restrict to items without an open loan
    pub available: Option<bool>,
    /// Matches title or author, case-insensitive
    pub name: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create media request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMedia {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 250, message = "Author must be 1-250 characters"))]
    pub author: String,
    pub category: MediaCategory,
    /// Must match `category` when present
    pub details: Option<CategoryDetails>,
}

/// Update media request. The category is immutable; availability and the
/// borrower back-reference are owned by the loan ledger and cannot be edited.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMedia {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 250, message = "Author must be 1-250 characters"))]
    pub author: Option<String>,
    /// Must match the stored category when present
    pub details: Option<CategoryDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("book".parse::<MediaCategory>(), Ok(MediaCategory::Book));
        assert_eq!("DVD".parse::<MediaCategory>(), Ok(MediaCategory::Dvd));
        assert!("vinyl".parse::<MediaCategory>().is_err());
    }

    #[test]
    fn test_details_tag_matches_category() {
        let details = CategoryDetails::Board {
            players_min: Some(2),
            players_max: Some(6),
        };
        assert_eq!(details.category(), MediaCategory::Board);
        assert_eq!(
            CategoryDetails::empty(MediaCategory::Cd).category(),
            MediaCategory::Cd
        );
    }

    #[test]
    fn test_details_column_round_trip() {
        let details = CategoryDetails::Book { nb_pages: Some(320) };
        let columns = details.clone().into_columns();
        assert_eq!(columns.nb_pages, Some(320));
        assert!(columns.genre.is_none());
        assert_eq!(
            CategoryDetails::from_columns(MediaCategory::Book, columns),
            details
        );
    }

    #[test]
    fn test_details_json_shape() {
        let details = CategoryDetails::Dvd {
            genre: Some("science-fiction".to_string()),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["dvd"]["genre"], "science-fiction");
    }
}
