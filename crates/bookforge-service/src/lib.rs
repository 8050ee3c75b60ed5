mod http;
mod local;
mod traits;

pub use http::HttpService;
pub use local::LocalService;
pub use traits::{
    BookService, ForgeRequest, Gallery, ReadRequest, ReaderView, ServiceError,
    DEFAULT_GALLERY_LIMIT, MAX_GALLERY_LIMIT, MAX_IDEA_CHARS,
};
