pub mod book;
pub mod cover;

pub use book::book_prompt;
pub use cover::cover_prompt;
