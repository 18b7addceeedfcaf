//! Librarian loan renewal form

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use super::book_copy::BookCopyDetails;

/// Latest accepted due date, in days from today
pub const MAX_RENEWAL_DAYS: i64 = 28;

/// Due date proposed when the renewal form is opened, in days from today
pub const DEFAULT_RENEWAL_DAYS: i64 = 21;

/// Renewal form submission
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// New due-back date (YYYY-MM-DD)
    #[schema(value_type = Option<NaiveDate>)]
    pub renewal_date: Option<String>,
}

/// Renewal form as offered to the librarian
#[derive(Debug, Serialize, ToSchema)]
pub struct RenewBookFormView {
    pub book_copy: BookCopyDetails,
    pub proposed_renewal_date: NaiveDate,
    pub help_text: String,
}

/// Why a renewal date was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalRejection {
    Missing,
    Unparsable,
    InPast,
    TooFarAhead,
}

impl RenewalRejection {
    fn code(&self) -> &'static str {
        match self {
            RenewalRejection::Missing => "required",
            RenewalRejection::Unparsable => "invalid",
            RenewalRejection::InPast => "renewal_in_past",
            RenewalRejection::TooFarAhead => "renewal_too_far_ahead",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RenewalRejection::Missing => "This field is required.",
            RenewalRejection::Unparsable => "Enter a valid date.",
            RenewalRejection::InPast => "Invalid date - renewal in past",
            RenewalRejection::TooFarAhead => "Invalid date - renewal more than 4 weeks ahead",
        }
    }

    /// Field-level error keyed `renewal_date`
    pub fn into_errors(self) -> ValidationErrors {
        let mut error = ValidationError::new(self.code());
        error.message = Some(self.message().into());
        let mut errors = ValidationErrors::new();
        errors.add("renewal_date", error);
        errors
    }
}

/// Date offered by default when the form is opened
pub fn proposed_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(DEFAULT_RENEWAL_DAYS)
}

/// Accept `date` when `today <= date <= today + 28 days`, unchanged
pub fn validate_renewal_date(
    date: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, RenewalRejection> {
    if date < today {
        return Err(RenewalRejection::InPast);
    }
    if date > today + Duration::days(MAX_RENEWAL_DAYS) {
        return Err(RenewalRejection::TooFarAhead);
    }
    Ok(date)
}

impl RenewBookForm {
    /// Coerce and validate the submitted date
    pub fn clean(&self, today: NaiveDate) -> Result<NaiveDate, ValidationErrors> {
        let raw = self
            .renewal_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RenewalRejection::Missing.into_errors())?;

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| RenewalRejection::Unparsable.into_errors())?;

        validate_renewal_date(date, today).map_err(RenewalRejection::into_errors)
    }
}

pub fn help_text() -> String {
    format!(
        "Enter a date between now and {} weeks (default {}).",
        MAX_RENEWAL_DAYS / 7,
        DEFAULT_RENEWAL_DAYS / 7
    )
}
