//! Loan management service

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_copy::{BookCopy, BookCopyDetails},
        renewal::{help_text, proposed_renewal_date, RenewBookForm, RenewBookFormView},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copies the user currently has on loan, soonest due first
    pub async fn get_user_loans(&self, user_id: i32, today: NaiveDate) -> AppResult<Vec<BookCopyDetails>> {
        let copies = self.repository.copies.list_on_loan_by_borrower(user_id).await?;
        Ok(copies.into_iter().map(|c| c.with_overdue(today)).collect())
    }

    /// Every copy on loan, soonest due first
    pub async fn get_all_loans(&self, today: NaiveDate) -> AppResult<Vec<BookCopyDetails>> {
        let copies = self.repository.copies.list_on_loan().await?;
        Ok(copies.into_iter().map(|c| c.with_overdue(today)).collect())
    }

    /// Every copy in any status, grouped by book
    pub async fn get_all_copies(&self, today: NaiveDate) -> AppResult<Vec<BookCopyDetails>> {
        let copies = self.repository.copies.list_all().await?;
        Ok(copies.into_iter().map(|c| c.with_overdue(today)).collect())
    }

    /// The renewal form pre-filled with the default due date
    pub async fn renewal_form(&self, copy_id: Uuid, today: NaiveDate) -> AppResult<RenewBookFormView> {
        let book_copy = self.repository.copies.get_details(copy_id).await?;
        Ok(RenewBookFormView {
            book_copy: book_copy.with_overdue(today),
            proposed_renewal_date: proposed_renewal_date(today),
            help_text: help_text(),
        })
    }

    /// Set a new due date on a copy once the submitted date passes validation
    pub async fn renew(&self, copy_id: Uuid, form: &RenewBookForm, today: NaiveDate) -> AppResult<BookCopy> {
        // Unknown copy wins over a bad date
        let details = self.repository.copies.get_details(copy_id).await?;

        let due_back = form.clean(today)?;
        let copy = self.repository.copies.set_due_back(copy_id, due_back).await?;

        tracing::info!(copy = %details.display_name(), due_back = %due_back, "Loan renewed");
        Ok(copy)
    }
}
