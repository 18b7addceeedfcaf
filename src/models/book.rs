//! Book (catalog title) model and related types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{author::Author, book_copy::BookCopy, genre::Genre, language::Language};

/// Plain ISBN-10 (X check digit allowed), plain ISBN-13 (978/979 prefix), or
/// ISBN-10 hyphenated as group-publisher-title-check holding ten characters
static ISBN_RE: Lazy<Regex> = Lazy::new(|| {
    let mut shapes = vec![r"[0-9]{9}[0-9X]".to_string(), r"97[89][0-9]{10}".to_string()];
    // group, publisher and title share nine digits
    for group in 1..=5 {
        for publisher in 1..=(8 - group) {
            let title = 9 - group - publisher;
            shapes.push(format!(
                r"[0-9]{{{group}}}-[0-9]{{{publisher}}}-[0-9]{{{title}}}-[0-9X]"
            ));
        }
    }
    Regex::new(&format!("^(?:{})$", shapes.join("|"))).expect("valid ISBN pattern")
});

/// Number of genres shown in `display_genre`
const DISPLAY_GENRE_LIMIT: usize = 3;

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub language_id: Option<i32>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "last_name, first_name" of the author, if any
    pub author_name: Option<String>,
}

/// Book with its author, language, genres and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<Author>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    /// First three genre names, comma separated
    pub display_genre: String,
    pub copies: Vec<BookCopy>,
}

impl BookDetails {
    pub fn new(
        book: Book,
        author: Option<Author>,
        language: Option<Language>,
        genres: Vec<Genre>,
        copies: Vec<BookCopy>,
    ) -> Self {
        Self {
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            display_genre: display_genre(&genres),
            author,
            language,
            genres,
            copies,
        }
    }
}

/// Join the first three genre names
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(DISPLAY_GENRE_LIMIT)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    pub author_id: i32,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1-1000 characters"))]
    pub summary: String,
    #[validate(
        length(max = 13, message = "ISBN must be at most 13 characters"),
        regex(path = *ISBN_RE, message = "Enter a valid ISBN")
    )]
    pub isbn: String,
    #[validate(length(min = 1, message = "Select at least one genre"))]
    pub genre_ids: Vec<i32>,
    pub language_id: i32,
}

/// Update book request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub author_id: Option<i32>,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1-1000 characters"))]
    pub summary: Option<String>,
    #[validate(
        length(max = 13, message = "ISBN must be at most 13 characters"),
        regex(path = *ISBN_RE, message = "Enter a valid ISBN")
    )]
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "Select at least one genre"))]
    pub genre_ids: Option<Vec<i32>>,
    pub language_id: Option<i32>,
}
