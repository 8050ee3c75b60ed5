pub mod api_key;
pub mod book;
pub mod error;
pub mod pagination;
pub mod parse;
pub mod preferences;

pub use book::{Book, BookFilter, BookSummary, CreateBook, UpdateBook, Visibility};
pub use error::CoreError;
pub use pagination::Page;
pub use parse::{parse_generated_book, GeneratedBook, ParseError};
pub use preferences::{FontFamily, ReaderPreferences, Theme, UpdatePreferences};
