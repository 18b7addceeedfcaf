//! Book copy and loan endpoints

use axum::{
    async_trait,
    body::{to_bytes, Body},
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Redirect,
    Form, Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_copy::{today, BookCopy, BookCopyDetails, CreateBookCopy, UpdateBookCopy},
        renewal::{RenewBookForm, RenewBookFormView, RenewalRejection},
    },
};

use super::AuthenticatedUser;

/// Where a successful renewal sends the librarian
pub const RENEWAL_REDIRECT: &str = "/api/v1/borrowed";

/// Largest renewal body read before giving up
const RENEWAL_BODY_LIMIT: usize = 16 * 1024;

fn unreadable_renewal() -> AppError {
    AppError::InvalidForm(RenewalRejection::Unparsable.into_errors())
}

/// Reads a renewal from a JSON or urlencoded body. A body that does not decode
/// into the form becomes a `renewal_date` field error; an empty body leaves the
/// date missing.
#[async_trait]
impl<S> FromRequest<S> for RenewBookForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let urlencoded = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, RENEWAL_BODY_LIMIT)
            .await
            .map_err(|_| unreadable_renewal())?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(RenewBookForm { renewal_date: None });
        }

        if urlencoded {
            let req = Request::from_parts(parts, Body::from(bytes));
            Form::<RenewBookForm>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .map_err(|_| unreadable_renewal())
        } else {
            Json::<RenewBookForm>::from_bytes(&bytes)
                .map(|Json(form)| form)
                .map_err(|_| unreadable_renewal())
        }
    }
}

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's loans, soonest due first", body = Vec<BookCopyDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookCopyDetails>>> {
    let copies = state
        .services
        .loans
        .get_user_loans(claims.user_id, today())
        .await?;
    Ok(Json(copies))
}

/// All copies on loan
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All loans, soonest due first", body = Vec<BookCopyDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookCopyDetails>>> {
    claims.require_can_mark_returned()?;

    let copies = state.services.loans.get_all_loans(today()).await?;
    Ok(Json(copies))
}

/// Every copy regardless of status
#[utoipa::path(
    get,
    path = "/allbooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All copies", body = Vec<BookCopyDetails>),
        (status = 403, description = "Missing permission")
    )
)]
pub async fn all_copies(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookCopyDetails>>> {
    claims.require_can_mark_returned()?;

    let copies = state.services.loans.get_all_copies(today()).await?;
    Ok(Json(copies))
}

/// Renewal form with the proposed due date
#[utoipa::path(
    get,
    path = "/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy and proposed renewal date", body = RenewBookFormView),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewBookFormView>> {
    claims.require_can_mark_returned()?;

    let form = state.services.loans.renewal_form(id, today()).await?;
    Ok(Json(form))
}

/// Set a new due date, then go back to the loan list
#[utoipa::path(
    post,
    path = "/book/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body(
        content = RenewBookForm,
        content_type = "application/json",
        description = "JSON or urlencoded `renewal_date`"
    ),
    responses(
        (status = 303, description = "Renewed; redirect to all borrowed books"),
        (status = 400, description = "Date missing, unreadable or rejected", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    form: Result<RenewBookForm, AppError>,
) -> AppResult<Redirect> {
    claims.require_can_mark_returned()?;
    let form = form?;

    state.services.loans.renew(id, &form, today()).await?;
    Ok(Redirect::to(RENEWAL_REDIRECT))
}

/// Copy details
#[utoipa::path(
    get,
    path = "/copies/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = BookCopyDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookCopyDetails>> {
    claims.require_can_mark_returned()?;

    let copy = state.services.catalog.get_copy(id).await?;
    Ok(Json(copy))
}

/// Add a copy of a book
#[utoipa::path(
    post,
    path = "/copies",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateBookCopy,
    responses(
        (status = 201, description = "Copy created", body = BookCopy),
        (status = 400, description = "Invalid input or unknown book or borrower", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBookCopy>,
) -> AppResult<(StatusCode, Json<BookCopy>)> {
    claims.require_can_mark_returned()?;

    let copy = state.services.catalog.create_copy(data).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Update a copy (status, borrower, due date, ...)
#[utoipa::path(
    put,
    path = "/copies/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = UpdateBookCopy,
    responses(
        (status = 200, description = "Copy updated", body = BookCopy),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBookCopy>,
) -> AppResult<Json<BookCopy>> {
    claims.require_can_mark_returned()?;

    let copy = state.services.catalog.update_copy(id, data).await?;
    Ok(Json(copy))
}

#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_can_mark_returned()?;

    state.services.catalog.delete_copy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
