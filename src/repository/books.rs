//! Books repository for database operations

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookShort, CreateBook, UpdateBook},
};

/// Book columns plus the author's display name
const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.title, b.author_id,
           CASE WHEN a.id IS NULL THEN NULL
                ELSE a.last_name || ', ' || a.first_name
           END AS author_name
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books ordered by title, then author
    pub async fn list(&self) -> AppResult<Vec<BookShort>> {
        let query = format!(
            "{} ORDER BY b.title, a.last_name, a.first_name, b.id",
            BOOK_SHORT_SELECT
        );
        let rows = sqlx::query_as::<_, BookShort>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Books written by an author
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let query = format!(
            "{} WHERE b.author_id = $1 ORDER BY b.title, b.id",
            BOOK_SHORT_SELECT
        );
        let rows = sqlx::query_as::<_, BookShort>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a book and its genre links in one transaction
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(data.language_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_genres(&mut tx, book.id, &data.genre_ids).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Update the fields present in `data`; a given genre list replaces the old one
    pub async fn update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.title, "title");
        add_field!(data.author_id, "author_id");
        add_field!(data.summary, "summary");
        add_field!(data.isbn, "isbn");
        add_field!(data.language_id, "language_id");

        let book: Option<Book> = if sets.is_empty() {
            sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            let query = format!(
                "UPDATE books SET {} WHERE id = ${} RETURNING *",
                sets.join(", "),
                idx
            );

            let mut builder = sqlx::query_as::<_, Book>(&query);

            macro_rules! bind_field {
                ($field:expr) => {
                    if let Some(ref val) = $field {
                        builder = builder.bind(val);
                    }
                };
            }

            bind_field!(data.title);
            bind_field!(data.author_id);
            bind_field!(data.summary);
            bind_field!(data.isbn);
            bind_field!(data.language_id);

            builder.bind(id).fetch_optional(&mut *tx).await?
        };
        let book =
            book.ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if let Some(ref genre_ids) = data.genre_ids {
            Self::replace_genres(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        Ok(book)
    }

    async fn replace_genres(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO book_genres (book_id, genre_id)
            SELECT $1, g FROM UNNEST($2::int[]) AS g
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Delete a book; its copies keep existing with no book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
