//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, copies, genres, health, index, languages, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.3.0",
        description = "Local library catalog: books, authors, copies and loans"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        users::create_user,
        // Catalog
        index::index,
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        genres::list_genres,
        genres::create_genre,
        genres::delete_genre,
        languages::list_languages,
        languages::create_language,
        languages::delete_language,
        // Loans
        copies::my_borrowed,
        copies::all_borrowed,
        copies::all_copies,
        copies::renewal_form,
        copies::renew_book,
        copies::get_copy,
        copies::create_copy,
        copies::update_copy,
        copies::delete_copy,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::Permission,
            // Catalog
            crate::models::summary::IndexSummary,
            crate::models::author::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::genre::Genre,
            crate::models::genre::CreateGenre,
            crate::models::language::Language,
            crate::models::language::CreateLanguage,
            // Loans
            crate::models::book_copy::LoanStatus,
            crate::models::book_copy::BookCopy,
            crate::models::book_copy::BookCopyDetails,
            crate::models::book_copy::CreateBookCopy,
            crate::models::book_copy::UpdateBookCopy,
            crate::models::renewal::RenewBookForm,
            crate::models::renewal::RenewBookFormView,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Books, authors, genres and languages"),
        (name = "loans", description = "Copies, loans and renewals")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
