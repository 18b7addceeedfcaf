//! Home page

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{
    error::AppResult, models::summary::IndexSummary, services::sessions::resolve_session_id,
};

/// Catalog counts and the visit counter of the caller's session
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog summary; sets the session cookie on first visit", body = IndexSummary)
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<IndexSummary>)> {
    let sessions = &state.services.sessions;

    let (session_id, created) =
        resolve_session_id(jar.get(sessions.cookie_name()).map(|c| c.value()));
    let num_visits = sessions.record_visit(session_id).await?;
    let summary = state.services.catalog.summary(num_visits).await?;

    let jar = if created {
        jar.add(
            Cookie::build((sessions.cookie_name().to_string(), session_id.to_string()))
                .path("/")
                .http_only(true),
        )
    } else {
        jar
    };

    Ok((jar, Json(summary)))
}
