//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookShort;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Author detail page: the author and the books they wrote
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    /// "last_name, first_name"
    pub display_name: String,
    pub books: Vec<BookShort>,
}

impl AuthorDetails {
    pub fn new(author: Author, books: Vec<BookShort>) -> Self {
        Self {
            display_name: author.to_string(),
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
            books,
        }
    }
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request.
///
/// Dates use a double option: an absent key leaves the column untouched,
/// an explicit `null` clears it.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_death: Option<Option<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn darth() -> Author {
        Author {
            id: 1,
            first_name: "Darth".to_string(),
            last_name: "Vader".to_string(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[test]
    fn test_display_is_last_name_comma_first_name() {
        assert_eq!(darth().to_string(), "Vader, Darth");
    }

    #[test]
    fn test_details_carry_display_name() {
        let details = AuthorDetails::new(darth(), Vec::new());
        assert_eq!(details.display_name, "Vader, Darth");
        assert!(details.books.is_empty());
    }

    #[test]
    fn test_name_length_limits() {
        let ok = CreateAuthor {
            first_name: "a".repeat(100),
            last_name: "Vader".to_string(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateAuthor {
            first_name: "a".repeat(101),
            ..ok
        };
        let errors = too_long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let cleared: UpdateAuthor = serde_json::from_str(r#"{"date_of_death": null}"#).unwrap();
        assert_eq!(cleared.date_of_death, Some(None));
        assert_eq!(cleared.date_of_birth, None);

        let set: UpdateAuthor =
            serde_json::from_str(r#"{"date_of_birth": "1920-01-02"}"#).unwrap();
        assert_eq!(
            set.date_of_birth,
            Some(NaiveDate::from_ymd_opt(1920, 1, 2))
        );
    }
}
