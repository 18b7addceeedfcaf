//! Catalog management service

use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, CreateAuthor, UpdateAuthor},
        book::{Book, BookDetails, BookShort, CreateBook, UpdateBook},
        book_copy::{BookCopy, BookCopyDetails, CreateBookCopy, LoanStatus, UpdateBookCopy},
        genre::{CreateGenre, Genre},
        language::{CreateLanguage, Language},
        summary::IndexSummary,
    },
    repository::Repository,
};

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Record counts for the home page
    pub async fn summary(&self, num_visits: i64) -> AppResult<IndexSummary> {
        Ok(IndexSummary {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.copies.count().await?,
            num_instances_available: self
                .repository
                .copies
                .count_by_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.genres.count().await?,
            num_visits,
        })
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    /// Author with the books they wrote
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetails::new(author, books))
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.create(&data).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, data: UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.update(id, &data).await?;
        tracing::info!(author_id = id, "Author updated");
        Ok(author)
    }

    /// Delete an author; their books stay in the catalog without one
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self) -> AppResult<Vec<BookShort>> {
        self.repository.books.list().await
    }

    /// Book with author, language, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?),
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => Some(self.repository.languages.get_by_id(language_id).await?),
            None => None,
        };
        let genres = self.repository.genres.list_for_book(id).await?;
        let copies = self.repository.copies.list_for_book(id).await?;

        Ok(BookDetails::new(book, author, language, genres, copies))
    }

    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        self.check_book_references(Some(data.author_id), Some(data.language_id), Some(&data.genre_ids))
            .await?;

        let book = self.repository.books.create(&data).await?;
        tracing::info!(book_id = book.id, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        self.check_book_references(data.author_id, data.language_id, data.genre_ids.as_deref())
            .await?;

        let book = self.repository.books.update(id, &data).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(book)
    }

    /// Delete a book; its copies stay on the shelf without one
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    async fn check_book_references(
        &self,
        author_id: Option<i32>,
        language_id: Option<i32>,
        genre_ids: Option<&[i32]>,
    ) -> AppResult<()> {
        let mut errors = ValidationErrors::new();

        if let Some(author_id) = author_id {
            if !self.repository.authors.exists(author_id).await? {
                errors.add("author_id", invalid_choice(INVALID_CHOICE.to_string()));
            }
        }
        if let Some(language_id) = language_id {
            if !self.repository.languages.exists(language_id).await? {
                errors.add("language_id", invalid_choice(INVALID_CHOICE.to_string()));
            }
        }
        if let Some(genre_ids) = genre_ids {
            for missing in self.repository.genres.missing_ids(genre_ids).await? {
                errors.add(
                    "genre_ids",
                    invalid_choice(format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        missing
                    )),
                );
            }
        }

        into_result(errors)
    }

    // =========================================================================
    // GENRES & LANGUAGES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn create_genre(&self, data: CreateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.repository.genres.create(&data).await?;
        tracing::info!(genre_id = genre.id, "Genre created");
        Ok(genre)
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await?;
        tracing::info!(genre_id = id, "Genre deleted");
        Ok(())
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn create_language(&self, data: CreateLanguage) -> AppResult<Language> {
        data.validate()?;
        let language = self.repository.languages.create(&data).await?;
        tracing::info!(language_id = language.id, "Language created");
        Ok(language)
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.languages.delete(id).await?;
        tracing::info!(language_id = id, "Language deleted");
        Ok(())
    }

    // =========================================================================
    // COPIES
    // =========================================================================

    pub async fn get_copy(&self, id: Uuid) -> AppResult<BookCopyDetails> {
        let copy = self.repository.copies.get_details(id).await?;
        Ok(copy.with_overdue(crate::models::book_copy::today()))
    }

    pub async fn create_copy(&self, data: CreateBookCopy) -> AppResult<BookCopy> {
        data.validate()?;
        self.check_copy_references(Some(data.book_id), data.borrower_id)
            .await?;

        let copy = self.repository.copies.create(&data).await?;
        tracing::info!(copy_id = %copy.id, status = %copy.status, "Book copy created");
        Ok(copy)
    }

    /// Apply the given fields only; a status change leaves borrower and due date alone
    pub async fn update_copy(&self, id: Uuid, data: UpdateBookCopy) -> AppResult<BookCopy> {
        data.validate()?;
        self.check_copy_references(data.book_id.flatten(), data.borrower_id.flatten())
            .await?;

        let copy = self.repository.copies.update(id, &data).await?;
        tracing::info!(copy_id = %id, status = %copy.status, "Book copy updated");
        Ok(copy)
    }

    pub async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        self.repository.copies.delete(id).await?;
        tracing::info!(copy_id = %id, "Book copy deleted");
        Ok(())
    }

    async fn check_copy_references(
        &self,
        book_id: Option<i32>,
        borrower_id: Option<i32>,
    ) -> AppResult<()> {
        let mut errors = ValidationErrors::new();

        if let Some(book_id) = book_id {
            if !self.repository.books.exists(book_id).await? {
                errors.add("book_id", invalid_choice(INVALID_CHOICE.to_string()));
            }
        }
        if let Some(borrower_id) = borrower_id {
            if !self.repository.users.exists(borrower_id).await? {
                errors.add("borrower_id", invalid_choice(INVALID_CHOICE.to_string()));
            }
        }

        into_result(errors)
    }
}

fn invalid_choice(message: String) -> ValidationError {
    let mut error = ValidationError::new("invalid_choice");
    error.message = Some(message.into());
    error
}

fn into_result(errors: ValidationErrors) -> AppResult<()> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidForm(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::field_messages;

    #[test]
    fn test_no_errors_is_ok() {
        assert!(into_result(ValidationErrors::new()).is_ok());
    }

    #[test]
    fn test_invalid_choice_reported_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("author_id", invalid_choice(INVALID_CHOICE.to_string()));
        errors.add("genre_ids", invalid_choice("Select a valid choice. 9 is not one of the available choices.".to_string()));
        errors.add("genre_ids", invalid_choice("Select a valid choice. 12 is not one of the available choices.".to_string()));

        let err = into_result(errors).unwrap_err();
        let AppError::InvalidForm(errors) = err else {
            panic!("expected a form error");
        };

        let fields = field_messages(&errors);
        assert_eq!(fields["author_id"], vec![INVALID_CHOICE.to_string()]);
        assert_eq!(fields["genre_ids"].len(), 2);
        assert!(fields["genre_ids"][1].contains("12"));
    }
}
