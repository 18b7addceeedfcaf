//! Home page counters

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndexSummary {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status `available`
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Visits in this session before the current one
    pub num_visits: i64,
}
