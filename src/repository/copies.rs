//! Book copies repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_copy::{BookCopy, BookCopyDetails, CreateBookCopy, LoanStatus, UpdateBookCopy},
};

/// Copy columns with book title and borrower username
const COPY_DETAILS_SELECT: &str = r#"
    SELECT c.id, c.book_id, b.title AS book_title, c.imprint, c.due_back,
           c.borrower_id, u.username AS borrower_username, c.status
    FROM book_copies c
    LEFT JOIN books b ON b.id = c.book_id
    LEFT JOIN authors a ON a.id = b.author_id
    LEFT JOIN users u ON u.id = c.borrower_id
"#;

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get copy by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>("SELECT * FROM book_copies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    /// Get copy by ID with book title and borrower
    pub async fn get_details(&self, id: Uuid) -> AppResult<BookCopyDetails> {
        let query = format!("{} WHERE c.id = $1", COPY_DETAILS_SELECT);
        sqlx::query_as::<_, BookCopyDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    /// Copies of one book, earliest due date first
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookCopy>> {
        let rows = sqlx::query_as::<_, BookCopy>(
            "SELECT * FROM book_copies WHERE book_id = $1 ORDER BY due_back, id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Copies on loan to a borrower, oldest due date first
    pub async fn list_on_loan_by_borrower(&self, borrower_id: i32) -> AppResult<Vec<BookCopyDetails>> {
        let query = format!(
            "{} WHERE c.borrower_id = $1 AND c.status = $2 ORDER BY c.due_back, c.id",
            COPY_DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, BookCopyDetails>(&query)
            .bind(borrower_id)
            .bind(LoanStatus::OnLoan)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Every copy on loan, oldest due date first
    pub async fn list_on_loan(&self) -> AppResult<Vec<BookCopyDetails>> {
        let query = format!(
            "{} WHERE c.status = $1 ORDER BY c.due_back, c.id",
            COPY_DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, BookCopyDetails>(&query)
            .bind(LoanStatus::OnLoan)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Every copy, ordered the way books are (title, then author)
    pub async fn list_all(&self) -> AppResult<Vec<BookCopyDetails>> {
        let query = format!(
            "{} ORDER BY b.title, a.last_name, a.first_name, c.due_back, c.id",
            COPY_DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, BookCopyDetails>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Create a new copy with a fresh UUID
    pub async fn create(&self, data: &CreateBookCopy) -> AppResult<BookCopy> {
        let row = sqlx::query_as::<_, BookCopy>(
            r#"
            INSERT INTO book_copies (id, book_id, imprint, due_back, borrower_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.borrower_id)
        .bind(data.status)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the fields present in `data`
    pub async fn update(&self, id: Uuid, data: &UpdateBookCopy) -> AppResult<BookCopy> {
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

        add_field!(data.book_id, "book_id");
        add_field!(data.imprint, "imprint");
        add_field!(data.status, "status");
        add_field!(data.due_back, "due_back");
        add_field!(data.borrower_id, "borrower_id");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE book_copies SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, BookCopy>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.book_id);
        bind_field!(data.imprint);
        bind_field!(data.status);
        bind_field!(data.due_back);
        bind_field!(data.borrower_id);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    /// Set the due date only; status and borrower are left as they are
    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>(
            "UPDATE book_copies SET due_back = $1 WHERE id = $2 RETURNING *",
        )
        .bind(due_back)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    /// Delete a copy
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book copy {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_copies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_copies WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
