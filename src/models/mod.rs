//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_copy;
pub mod genre;
pub mod language;
pub mod renewal;
pub mod summary;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookDetails, BookShort};
pub use book_copy::{BookCopy, BookCopyDetails, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use summary::IndexSummary;
pub use user::{User, UserClaims};
